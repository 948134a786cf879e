//! Connected components over the connection graph.

use std::collections::{BTreeSet, HashMap};

use crate::model::{AnnotationId, Connection};

/// A set of annotations joined by connections, ignoring direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub annotations: BTreeSet<AnnotationId>,
    pub connections: Vec<Connection>,
}

impl Component {
    /// A component with a cycle has at least as many edges as nodes.
    pub fn has_cycle(&self) -> bool {
        self.connections.len() >= self.annotations.len()
    }
}

/// Disjoint-set forest with path compression and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new() -> Self {
        Self {
            parent: Vec::new(),
            size: Vec::new(),
        }
    }

    fn push(&mut self) -> usize {
        let index = self.parent.len();
        self.parent.push(index);
        self.size.push(1);
        index
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }
}

/// Group connections into connected components.
///
/// Components are ordered by the first connection that touches them.
pub fn components(connections: &[Connection]) -> Vec<Component> {
    let mut sets = DisjointSet::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ids: Vec<&str> = Vec::new();

    for connection in connections {
        for id in [connection.parent_id.as_str(), connection.child_id.as_str()] {
            if !index.contains_key(id) {
                index.insert(id, sets.push());
                ids.push(id);
            }
        }
        sets.union(index[connection.parent_id.as_str()], index[connection.child_id.as_str()]);
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut result: Vec<Component> = Vec::new();

    for connection in connections {
        let root = sets.find(index[connection.parent_id.as_str()]);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            result.push(Component {
                annotations: BTreeSet::new(),
                connections: Vec::new(),
            });
            result.len() - 1
        });
        result[slot].connections.push(connection.clone());
    }

    for id in ids {
        let root = sets.find(index[id]);
        if let Some(&slot) = slot_of_root.get(&root) {
            result[slot].annotations.insert(id.to_string());
        }
    }

    result
}
