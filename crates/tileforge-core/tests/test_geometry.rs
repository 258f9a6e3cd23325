use approx::assert_relative_eq;
use tempfile::tempdir;

use tileforge_core::geometry::{Rect, SpatialTransform};

#[test]
fn transform_applies_scale_then_shift() {
    let tf = SpatialTransform::new(2.0, 10.0, -4.0);
    assert_eq!(tf.apply(3.0, 5.0), (16.0, 6.0));
}

#[test]
fn rescale_multiplies_scale_and_both_shifts() {
    let tf = SpatialTransform::new(1.0, 100.0, 50.0).rescaled(0.1);
    assert_relative_eq!(tf.scale, 0.1);
    assert_relative_eq!(tf.shift_x, 10.0);
    assert_relative_eq!(tf.shift_y, 5.0);
}

#[test]
fn rect_to_transform_round_trip_is_exact() {
    let rect = Rect::new(2000.0, 3024.0, 1000.0, 2024.0);
    let tf = SpatialTransform::from_rect(&rect);
    assert_eq!(tf.scale, 1.0);
    let back = tf.to_rect(rect.width(), rect.height());
    assert_eq!(back, rect);
}

#[test]
fn expand_always_yields_superset() {
    let original = Rect::new(-3.0, 7.5, 12.0, 20.0);
    for (dx, dy) in [(0.0, 0.0), (1.0, 1.0), (0.5, 2.0), (-1.0, -1.0)] {
        let mut expanded = original;
        expanded.expand(dx, dy);
        assert!(expanded.min_x <= original.min_x);
        assert!(expanded.max_x >= original.max_x);
        assert!(expanded.min_y <= original.min_y);
        assert!(expanded.max_y >= original.max_y);
    }
}

#[test]
fn overlap_requires_shared_area() {
    let a = Rect::new(0.0, 10.0, 0.0, 10.0);
    assert!(a.overlaps(&Rect::new(5.0, 15.0, 5.0, 15.0)));
    assert!(!a.overlaps(&Rect::new(10.0, 20.0, 0.0, 10.0))); // touching edge
    assert!(!a.overlaps(&Rect::new(20.0, 30.0, 20.0, 30.0)));
}

#[test]
fn shifted_translates_both_axes() {
    let rect = Rect::new(0.0, 4.0, 1.0, 3.0).shifted(10.0, -1.0);
    assert_eq!(rect, Rect::new(10.0, 14.0, 0.0, 2.0));
}

#[test]
fn transform_record_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transform.csv");
    let tf = SpatialTransform::new(0.1, 200.0, 100.0);
    tf.write(&path).unwrap();

    let read = SpatialTransform::read(&path).unwrap();
    assert_relative_eq!(read.scale, tf.scale);
    assert_relative_eq!(read.shift_x, tf.shift_x);
    assert_relative_eq!(read.shift_y, tf.shift_y);
}

#[test]
fn malformed_transform_records_are_rejected() {
    let dir = tempdir().unwrap();

    let two_fields = dir.path().join("two.csv");
    std::fs::write(&two_fields, "1.0, 2.0\n").unwrap();
    assert!(SpatialTransform::read(&two_fields).is_err());

    let not_numeric = dir.path().join("bad.csv");
    std::fs::write(&not_numeric, "1.0, x, 3.0\n").unwrap();
    assert!(SpatialTransform::read(&not_numeric).is_err());

    let negative_scale = dir.path().join("neg.csv");
    std::fs::write(&negative_scale, "-1.0, 0.0, 0.0\n").unwrap();
    assert!(SpatialTransform::read(&negative_scale).is_err());
}
