use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn canvas() -> Canvas {
    Canvas {
        width: 1280,
        height: 720,
    }
}

#[test]
fn every_field_respects_its_range() {
    let mut rng = StdRng::seed_from_u64(7);
    let c = canvas();
    let w = c.width_f64();
    let h = c.height_f64();
    let ravens = generate(DEFAULT_RAVEN_COUNT, c, &mut rng);
    assert_eq!(ravens.len(), DEFAULT_RAVEN_COUNT);
    for r in &ravens {
        assert!((0.35..=1.25).contains(&r.size), "size {}", r.size);
        assert!((0.6..=1.5).contains(&r.speed), "speed {}", r.speed);
        assert!((-0.3..=0.3).contains(&r.rotation), "rotation {}", r.rotation);
        assert!((0.0..TAU).contains(&r.wobble_phase));
        assert!((0.0..=0.25).contains(&r.delay));
        assert!((-0.45 * w..=-0.20 * w).contains(&r.start_x));
        assert!((0.90 * w..=1.40 * w).contains(&r.end_x));
        assert!((0.10 * h..=0.90 * h).contains(&r.y));
        assert!(r.start_x < r.end_x);
    }
}

#[test]
fn flock_is_sorted_by_size() {
    let mut rng = StdRng::seed_from_u64(99);
    let ravens = generate(500, canvas(), &mut rng);
    assert!(ravens.windows(2).all(|w| w[0].size <= w[1].size));
}

#[test]
fn same_seed_same_flock() {
    let a = generate(64, canvas(), &mut StdRng::seed_from_u64(3));
    let b = generate(64, canvas(), &mut StdRng::seed_from_u64(3));
    let c = generate(64, canvas(), &mut StdRng::seed_from_u64(4));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn zero_count_is_an_empty_flock() {
    let ravens = generate(0, canvas(), &mut StdRng::seed_from_u64(1));
    assert!(ravens.is_empty());
    assert!(Flock::from_ravens(ravens, 0).is_empty());
}

#[test]
fn from_ravens_restores_paint_order() {
    let mut ravens = generate(16, canvas(), &mut StdRng::seed_from_u64(5));
    ravens.reverse();
    let flock = Flock::from_ravens(ravens, 2);
    assert_eq!(flock.len(), 16);
    assert_eq!(flock.generation(), 2);
    assert!(flock.ravens().windows(2).all(|w| w[0].size <= w[1].size));
}

#[test]
fn flock_size_is_bounded() {
    assert!(validate_raven_count(0).is_ok());
    assert!(validate_raven_count(MAX_RAVEN_COUNT).is_ok());
    assert!(validate_raven_count(MAX_RAVEN_COUNT + 1).is_err());
}
