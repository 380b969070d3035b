use super::*;
use crate::foundation::core::{Point, Vec2};

fn square(size: f64) -> BezierPath {
    BezierPath::rect(Point::new(0.0, 0.0), Vec2::new(size, size))
}

fn keyed(a: BezierPath, b: BezierPath) -> AnimatedValue<BezierPath> {
    AnimatedValue::Keyframed(vec![
        Keyframe {
            time: 0.0,
            value: a,
            hold: false,
            ease: None,
        },
        Keyframe {
            time: 10.0,
            value: b,
            hold: false,
            ease: None,
        },
    ])
}

#[test]
fn generation_ids_are_unique() {
    let a = PathRegistry::new();
    let b = PathRegistry::new();
    assert_ne!(a.generation_id(), b.generation_id());
}

#[test]
fn identical_content_registers_once() {
    let mut reg = PathRegistry::new();
    let a = reg.register(&AnimatedValue::Static(square(10.0))).unwrap();
    let b = reg.register(&AnimatedValue::Static(square(10.0 + 1e-12))).unwrap();
    let c = reg.register(&AnimatedValue::Static(square(20.0))).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(reg.len(), 2);
}

#[test]
fn animated_paths_sample_between_keyframes() {
    let mut reg = PathRegistry::new();
    let id = reg.register(&keyed(square(10.0), square(20.0))).unwrap();
    let res = reg.get(id).unwrap();
    assert!(res.is_animated());
    assert_eq!(res.indices.len(), (res.vertex_count - 2) * 3);

    let mid = reg.sample(id, 5.0).unwrap();
    assert_eq!(mid.vertices[0], Point::new(7.5, -7.5));
    assert_eq!(reg.sample(id, 99.0).unwrap(), square(20.0));

    let buf = res.sample_vertices(5.0).unwrap();
    assert_eq!(buf.len(), res.vertex_count * 2);
    assert_eq!(buf[0], 7.5);
}

#[test]
fn topology_mismatch_is_rejected() {
    let mut reg = PathRegistry::new();
    let tri = BezierPath::polygon(
        &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
        true,
    );
    assert!(reg.register(&keyed(square(10.0), tri)).is_none());
    assert!(reg.is_empty());
}

#[test]
fn unknown_ids_do_not_sample() {
    let reg = PathRegistry::new();
    assert!(reg.sample(PathId(3), 0.0).is_none());
}
