//! Fixtures shared by the integration tests.
//!
//! Recording collaborators live in `annolayer::test_support`.

use annolayer::{Annotation, AnnotationShape, Point};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn square(id: &str, x: f64, y: f64, size: f64) -> Annotation {
    Annotation::new(
        id,
        AnnotationShape::Polygon,
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ],
    )
}
