use super::*;
use crate::flock::generator::generate;
use crate::foundation::core::Rgba8Premul;
use rand::SeedableRng;
use rand::rngs::StdRng;

const W: u32 = 640;
const H: u32 = 360;

fn canvas() -> Canvas {
    Canvas {
        width: W,
        height: H,
    }
}

fn solid(r: u8, g: u8, b: u8) -> RasterImage {
    RasterImage::solid(W, H, Rgba8Premul::from_straight_rgba(r, g, b, 255)).unwrap()
}

fn near(px: [u8; 4], want: [u8; 4], tol: u8) -> bool {
    px.iter().zip(want.iter()).all(|(a, b)| a.abs_diff(*b) <= tol)
}

fn interior_all(frame: &FrameRGBA, want: [u8; 4], tol: u8) -> bool {
    (2..frame.height - 2).all(|y| {
        (2..frame.width - 2).all(|x| near(frame.pixel(x, y).unwrap(), want, tol))
    })
}

fn seeded_flock(count: usize) -> Flock {
    let mut rng = StdRng::seed_from_u64(42);
    Flock::from_ravens(generate(count, canvas(), &mut rng), 1)
}

#[test]
fn fade_starts_after_085_and_caps_at_09() {
    assert_eq!(fade_opacity(0.0), 0.0);
    assert_eq!(fade_opacity(FADE_START), 0.0);
    assert!((fade_opacity(0.925) - 0.45).abs() < 1e-9);
    assert!((fade_opacity(1.0) - FADE_MAX_OPACITY).abs() < 1e-12);
}

#[test]
fn rest_frame_with_only_image_a_is_image_a() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let red = solid(255, 0, 0);
    let flock = seeded_flock(40);
    r.render_frame(
        0.0,
        &FrameScene {
            image_a: Some(&red),
            image_b: None,
            flock: &flock,
        },
    )
    .unwrap();
    assert_eq!(r.mask_coverage(), 0.0);
    assert!(interior_all(&r.frame(), [255, 0, 0, 255], 2));
    assert_eq!(r.last_t(), Some(0.0));
}

#[test]
fn empty_flock_at_end_is_darkened_image_a() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let red = solid(255, 0, 0);
    let blue = solid(0, 0, 255);
    let flock = Flock::default();
    r.render_frame(
        1.0,
        &FrameScene {
            image_a: Some(&red),
            image_b: Some(&blue),
            flock: &flock,
        },
    )
    .unwrap();
    assert_eq!(r.mask_coverage(), 0.0);
    assert!(interior_all(&r.frame(), [25, 0, 0, 255], 2));
}

#[test]
fn midpoint_mixes_both_images() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let red = solid(255, 0, 0);
    let blue = solid(0, 0, 255);
    let flock = seeded_flock(24);
    r.render_frame(
        0.5,
        &FrameScene {
            image_a: Some(&red),
            image_b: Some(&blue),
            flock: &flock,
        },
    )
    .unwrap();
    let coverage = r.mask_coverage();
    assert!(coverage > 0.0 && coverage < 1.0, "coverage {coverage}");

    let frame = r.frame();
    let px: Vec<[u8; 4]> = frame
        .data
        .chunks_exact(4)
        .map(|p| [p[0], p[1], p[2], p[3]])
        .collect();
    let blue_px = px.iter().filter(|p| near(**p, [0, 0, 255, 255], 2)).count();
    let red_px = px.iter().filter(|p| near(**p, [255, 0, 0, 255], 2)).count();
    assert!(blue_px > 0 && red_px > 0);
    assert!(px.iter().all(|p| p[3] == 255 && p[1] == 0));

    let blue_fraction =
        px.iter().map(|p| f64::from(p[2]) / 255.0).sum::<f64>() / px.len() as f64;
    assert!((blue_fraction - coverage).abs() < 0.02);
}

#[test]
fn mask_is_rebuilt_not_accumulated() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let flock = seeded_flock(60);
    r.build_mask(0.5, &flock).unwrap();
    let mid = r.mask_coverage();
    assert!(mid > 0.0);
    r.build_mask(0.0, &flock).unwrap();
    assert_eq!(r.mask_coverage(), 0.0);
    r.build_mask(0.5, &flock).unwrap();
    assert_eq!(r.mask_coverage(), mid);
}

#[test]
fn without_images_only_the_fade_is_drawn() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let flock = seeded_flock(10);
    let scene = FrameScene {
        image_a: None,
        image_b: None,
        flock: &flock,
    };
    r.render_frame(0.3, &scene).unwrap();
    assert!(r.frame().data.iter().all(|&b| b == 0));
    r.render_frame(1.0, &scene).unwrap();
    assert_eq!(r.frame().pixel(5, 5), Some([0, 0, 0, unit_to_u8(0.9)]));
}

#[test]
fn non_finite_time_is_rejected() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let flock = Flock::default();
    let scene = FrameScene {
        image_a: None,
        image_b: None,
        flock: &flock,
    };
    assert!(r.render_frame(f64::NAN, &scene).is_err());
    assert!(r.render_frame(2.0, &scene).is_ok());
    assert_eq!(r.last_t(), Some(1.0));
}

#[test]
fn resize_reallocates_surfaces() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    r.resize(Canvas {
        width: 64,
        height: 32,
    })
    .unwrap();
    let f = r.frame();
    assert_eq!((f.width, f.height), (64, 32));
    assert_eq!(f.data.len(), 64 * 32 * 4);
    assert!(
        r.resize(Canvas {
            width: 0,
            height: 32
        })
        .is_err()
    );
}

#[test]
fn wide_image_is_cropped_not_letterboxed() {
    let mut r = FrameRenderer::new(canvas(), RendererOpts::default()).unwrap();
    let wide =
        RasterImage::solid(W * 3, H, Rgba8Premul::from_straight_rgba(0, 255, 0, 255)).unwrap();
    let flock = Flock::default();
    r.render_frame(
        0.0,
        &FrameScene {
            image_a: Some(&wide),
            image_b: None,
            flock: &flock,
        },
    )
    .unwrap();
    assert!(interior_all(&r.frame(), [0, 255, 0, 255], 2));
}
