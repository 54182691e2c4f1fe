//! Conformance tests for every crossing pattern of the Point boundary.

use insta::assert_snapshot;
use pointbridge::{Boundary, BoundaryConfig, ClassificationError, MutableByteBuffer, Point};
use proptest::prelude::*;

fn boundary() -> Boundary {
    Boundary::new(BoundaryConfig::default()).expect("linked native layer binds")
}

#[test]
fn test_show_by_value_and_by_reference_display_the_same() {
    let boundary = boundary();
    let point = Point::new(4, -7);

    boundary.show(point);
    boundary.show_ref(&point);

    let lines = boundary.transcript();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);
    assert_eq!(point, Point::new(4, -7));
}

#[test]
fn test_move_by_value_leaves_caller_untouched() {
    let boundary = boundary();
    let point = Point::new(1, 2);

    boundary.move_point(point);

    assert_eq!(point, Point::new(1, 2));
    assert_eq!(
        boundary.transcript(),
        vec!["Point in native is (1, 2)", "Point in native is (2, 3)"]
    );
}

#[test]
fn test_move_by_reference_increments_caller() {
    let boundary = boundary();
    let mut point = Point::new(1, 2);

    boundary.move_ref(&mut point);

    assert_eq!(point, Point::new(2, 3));
}

#[test]
fn test_get_point_consumes_two_ticks() {
    let boundary = boundary();
    assert_eq!(boundary.get_point().unwrap(), Point::new(0, 1));
    assert_eq!(boundary.get_point().unwrap(), Point::new(2, 3));
}

#[test]
fn test_value_and_pointer_returns_share_one_counter() {
    let boundary = boundary();
    let first = boundary.get_point().unwrap();
    let owned = boundary.with_point_pointer(|owned| owned.get()).unwrap().unwrap();
    let third = boundary.get_point().unwrap();

    assert_eq!(first, Point::new(0, 1));
    assert_eq!(owned, Point::new(2, 3));
    assert_eq!(third, Point::new(4, 5));
}

#[test]
fn test_counters_are_per_boundary() {
    let a = boundary();
    let b = boundary();
    a.get_point().unwrap();
    a.get_point().unwrap();
    assert_eq!(b.get_point().unwrap(), Point::new(0, 1));
}

#[test]
fn test_counter_start_is_configurable() {
    let boundary = Boundary::new(BoundaryConfig::default().with_counter_start(100)).unwrap();
    assert_eq!(boundary.get_point().unwrap(), Point::new(100, 101));
}

#[test]
fn test_buffer_mutation_leaves_source_unchanged() {
    let boundary = boundary();
    let source = String::from("staring string");
    let mut buffer = MutableByteBuffer::from_text(&source).unwrap();

    boundary.add_one_to_string(&mut buffer).unwrap();

    assert_eq!(buffer.as_bytes(), b"tubsjoh!tusjoh");
    assert_eq!(buffer.spare(), &[0]);
    assert_eq!(source, "staring string");
}

#[test]
fn test_buffer_bytes_each_advance_by_one() {
    let boundary = boundary();
    let source = "Hello, 123 ~";
    let mutated = boundary.mutated_copy(source).unwrap();

    let expected: Vec<u8> = source.bytes().map(|b| b + 1).collect();
    assert_eq!(mutated.as_bytes(), expected.as_slice());
}

#[test]
fn test_spare_capacity_is_not_touched() {
    let boundary = boundary();
    let mut buffer = MutableByteBuffer::with_capacity(b"az", 8).unwrap();

    boundary.add_one_to_string(&mut buffer).unwrap();

    assert_eq!(buffer.as_bytes(), b"b{");
    assert!(buffer.spare().iter().all(|&b| b == 0));
}

#[test]
fn test_immutable_text_is_rejected_before_the_native_call() {
    let boundary = boundary();
    let source = "staring string";

    let err = boundary.add_one_to_string(source).unwrap_err();

    assert_eq!(
        err.as_classification(),
        Some(&ClassificationError::ImmutableText)
    );
    assert_eq!(source, "staring string");
}

#[test]
fn test_owned_string_is_still_immutable_text() {
    let boundary = boundary();
    let source = String::from("abc");
    assert!(boundary.add_one_to_string(&source).is_err());
}

#[test]
fn test_text_with_nul_cannot_be_materialized() {
    let boundary = boundary();
    let err = boundary.mutated_copy("a\0b").unwrap_err();
    assert_eq!(
        err.as_classification(),
        Some(&ClassificationError::InteriorNul { offset: 1 })
    );
    assert!(boundary.transcript().is_empty());
}

#[test]
fn test_full_walk_transcript() {
    let boundary = boundary();
    let mut point = Point::new(1, 2);

    boundary.show(point);
    boundary.show_ref(&point);
    boundary.move_point(point);
    boundary.move_ref(&mut point);
    boundary.get_point().unwrap();
    let owned = boundary.acquire_point().unwrap();
    owned.move_ref().unwrap();
    drop(owned);

    assert_snapshot!(boundary.transcript().join("\n"), @r"
    Point in native is (1, 2)
    Point in native is (1, 2)
    Point in native is (1, 2)
    Point in native is (2, 3)
    Point in native is (1, 2)
    New point in native is (2, 3)
    Returning Point (0, 1)
    Returning Point (2, 3)
    Point in native is (2, 3)
    New point in native is (3, 4)
    Freeing Point (3, 4)
    ");
}

#[test]
fn test_concurrent_callers_never_share_ticks() {
    let boundary = &boundary();
    let mut points: Vec<Point> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    (0..50)
                        .map(|_| boundary.get_point().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect()
    });

    points.sort_by_key(|p| p.x);
    for (i, point) in points.iter().enumerate() {
        let x = 2 * i as i32;
        assert_eq!(*point, Point::new(x, x + 1));
    }
}

proptest! {
    #[test]
    fn prop_show_never_mutates(x in any::<i32>(), y in any::<i32>()) {
        let boundary = boundary();
        let point = Point::new(x, y);
        boundary.show(point);
        boundary.show_ref(&point);
        let lines = boundary.transcript();
        prop_assert_eq!(&lines[0], &lines[1]);
        prop_assert_eq!(point, Point::new(x, y));
    }

    #[test]
    fn prop_move_ref_adds_exactly_one(x in -1_000_000i32..1_000_000, y in -1_000_000i32..1_000_000) {
        let boundary = boundary();
        let original = Point::new(x, y);
        let mut point = original;

        boundary.move_point(point);
        prop_assert_eq!(point, original);

        boundary.move_ref(&mut point);
        prop_assert_eq!(point, Point::new(x + 1, y + 1));
    }
}
