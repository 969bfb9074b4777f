use marblemaze_core::geometry::{
    direction_or, euclidean_distance, is_same_location, manhattan_distance, midpoint,
};
use marblemaze_core::{frange, pitch_multiples, quantize, snap, GridKey};
use nalgebra::Vector3;
use proptest::prelude::*;

#[test]
fn test_frange_includes_endpoint() {
    let values = frange(0.0, 1.0, 0.1);
    assert_eq!(values.len(), 11);
    assert_eq!(values[0], 0.0);
    assert_eq!(values[10], 1.0);
    assert_eq!(values[3], 0.3);
}

#[test]
fn test_frange_never_passes_stop() {
    assert_eq!(frange(0.0, 1.0, 0.6), vec![0.0, 0.6]);
    assert_eq!(frange(-1.0, 0.5, 1.0), vec![-1.0, 0.0]);
    assert_eq!(frange(2.0, 2.0, 0.5), vec![2.0]);
}

#[test]
fn test_frange_rejects_bad_step() {
    assert!(frange(0.0, 1.0, 0.0).is_empty());
    assert!(frange(0.0, 1.0, -1.0).is_empty());
}

#[test]
fn test_pitch_multiples_symmetric() {
    assert_eq!(pitch_multiples(2.5, 1.0), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    assert_eq!(pitch_multiples(20.0, 10.0), vec![-20.0, -10.0, 0.0, 10.0, 20.0]);
    assert_eq!(pitch_multiples(0.5, 1.0), vec![0.0]);
    assert!(pitch_multiples(-1.0, 1.0).is_empty());
}

#[test]
fn test_snap_clears_negative_zero() {
    let value = snap(-1e-12);
    assert_eq!(value, 0.0);
    assert!(value.is_sign_positive());
}

#[test]
fn test_quantize_to_pitch() {
    assert_eq!(quantize(14.9, 10.0), 10.0);
    assert_eq!(quantize(15.1, 10.0), 20.0);
    assert_eq!(quantize(-4.0, 10.0), 0.0);
}

#[test]
fn test_grid_key_absorbs_float_noise() {
    let a = GridKey::new(0.1 + 0.2, 1.0, -2.0);
    let b = GridKey::new(0.3, 1.0, -2.0);
    assert_eq!(a, b);
    assert_ne!(GridKey::new(0.3, 1.0, -2.0), GridKey::new(0.3001, 1.0, -2.0));
    assert_eq!(GridKey::from_vector(&Vector3::new(0.3, 1.0, -2.0)), b);
}

#[test]
fn test_distances() {
    let a = (0.0, 0.0, 0.0);
    let b = (3.0, 4.0, 0.0);
    assert_eq!(euclidean_distance(a, b), 5.0);
    assert_eq!(manhattan_distance(a, b), 7.0);
}

#[test]
fn test_vector_helpers() {
    let a = Vector3::new(0.0, 0.0, 0.0);
    let b = Vector3::new(2.0, 4.0, 6.0);
    assert_eq!(midpoint(&a, &b), Vector3::new(1.0, 2.0, 3.0));
    assert!(is_same_location(&a, &Vector3::new(1e-9, 0.0, 0.0), 1e-7));
    assert!(!is_same_location(&a, &b, 1e-7));
    assert_eq!(direction_or(Vector3::zeros(), Vector3::y()), Vector3::y());
    assert_eq!(direction_or(Vector3::new(0.0, 0.0, 5.0), Vector3::y()), Vector3::z());
}

proptest! {
    #[test]
    fn prop_frange_stays_within_bounds(start in -100.0..100.0f64, span in 0.0..50.0f64, step in 0.01..10.0f64) {
        let stop = start + span;
        let values = frange(start, stop, step);
        prop_assert!(!values.is_empty());
        for pair in values.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for v in &values {
            prop_assert!(*v <= stop);
            prop_assert!(*v >= start - 1e-9);
        }
        prop_assert!(stop - values[values.len() - 1] < step + 1e-9);
    }

    #[test]
    fn prop_pitch_multiples_stay_in_extent(extent in 0.0..200.0f64, pitch in 0.5..20.0f64) {
        let values = pitch_multiples(extent, pitch);
        prop_assert!(!values.is_empty());
        prop_assert_eq!(values.len() % 2, 1);
        for v in values {
            prop_assert!(v.abs() <= extent + 1e-6);
        }
    }

    #[test]
    fn prop_quantize_is_idempotent(value in -500.0..500.0f64, pitch in 0.5..20.0f64) {
        let once = quantize(value, pitch);
        prop_assert_eq!(quantize(once, pitch), once);
        prop_assert!((once - value).abs() <= pitch / 2.0 + 1e-6);
    }
}
