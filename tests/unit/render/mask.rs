use super::*;

fn raven() -> Raven {
    Raven {
        start_x: -300.0,
        end_x: 1400.0,
        y: 360.0,
        size: 1.0,
        speed: 1.2,
        rotation: 0.1,
        wobble_phase: 0.0,
        delay: 0.2,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn raven_waits_for_its_delay() {
    let r = raven();
    let p = RavenPose::at(&r, 0.1);
    assert_eq!(p.local_t, 0.0);
    assert!(close(p.x, r.start_x));
    assert!(close(p.y, r.y));
    assert!(close(p.scale, 0.5 * 0.85));
    assert!(close(p.rotation, 0.1));
}

#[test]
fn delayed_raven_compresses_remaining_travel() {
    let r = raven();
    let p = RavenPose::at(&r, 0.6);
    assert!(close(p.local_t, 0.5));
    assert!(close(p.x, -300.0 + 1700.0 * 0.5 * 1.2));
}

#[test]
fn speed_can_overshoot_end_x() {
    let p = RavenPose::at(&raven(), 1.0);
    assert_eq!(p.local_t, 1.0);
    assert!(p.x > raven().end_x);
    assert!(close(p.scale, 0.5));
}

#[test]
fn smaller_ravens_wobble_more() {
    let mut small = raven();
    small.size = 0.35;
    small.wobble_phase = std::f64::consts::FRAC_PI_2;
    small.delay = 0.0;
    let mut large = small;
    large.size = 1.25;

    let ps = RavenPose::at(&small, 0.0);
    let pl = RavenPose::at(&large, 0.0);
    assert!(close(ps.y - small.y, 8.0 + 18.0 * 0.65));
    assert!(close(pl.y - large.y, 8.0 + 18.0 * -0.25));
    assert!(ps.y - small.y > pl.y - large.y);
}

#[test]
fn stamp_transform_centers_silhouette_on_pose() {
    let pose = RavenPose::at(&raven(), 0.7);
    let center = pose.stamp_transform() * SILHOUETTE_CENTER;
    assert!(close(center.x, pose.x));
    assert!(close(center.y, pose.y));

    let edge = pose.stamp_transform() * (SILHOUETTE_CENTER + Vec2::new(100.0, 0.0));
    let dist = ((edge.x - pose.x).powi(2) + (edge.y - pose.y).powi(2)).sqrt();
    assert!(close(dist, 100.0 * pose.scale));
}

#[test]
fn poses_follow_flock_order_and_easing() {
    let mut a = raven();
    a.size = 0.4;
    a.delay = 0.0;
    let mut b = raven();
    b.size = 0.9;
    b.delay = 0.0;
    let poses: Vec<_> = flock_poses(&[a, b], 0.25, Ease::InOutCubic).collect();
    assert_eq!(poses.len(), 2);
    assert!(close(poses[0].local_t, 0.0625));
    let linear: Vec<_> = flock_poses(&[a, b], 0.25, Ease::Linear).collect();
    assert!(close(linear[1].local_t, 0.25));
}
