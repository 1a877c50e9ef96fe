use super::*;

#[test]
fn zero_sized_images_are_rejected() {
    assert!(RasterImage::solid(0, 4, Rgba8Premul::transparent()).is_err());
    assert!(RasterImage::solid(4, 0, Rgba8Premul::transparent()).is_err());
    assert!(RasterImage::from_premul_rgba8(0, 0, &[]).is_err());
}

#[test]
fn byte_length_must_match_dimensions() {
    let err = RasterImage::from_premul_rgba8(2, 2, &[0u8; 12]).unwrap_err();
    assert!(matches!(err, RavenError::Validation(_)));
}

#[test]
fn solid_fills_every_pixel() {
    let red = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    let img = RasterImage::solid(3, 2, red).unwrap();
    assert_eq!(img.width(), 3);
    assert_eq!(img.height(), 2);
    assert!(img.premul_bytes().chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test]
fn straight_input_is_premultiplied() {
    let img = RasterImage::from_straight_rgba8(1, 1, vec![200, 100, 50, 0]).unwrap();
    assert_eq!(img.premul_bytes(), &[0, 0, 0, 0]);

    let img = RasterImage::from_straight_rgba8(1, 1, vec![255, 255, 255, 51]).unwrap();
    assert_eq!(img.premul_bytes(), &[51, 51, 51, 51]);
}

#[test]
fn clones_share_pixels() {
    let a = RasterImage::solid(2, 2, Rgba8Premul::transparent()).unwrap();
    let b = a.clone();
    let c = RasterImage::solid(2, 2, Rgba8Premul::transparent()).unwrap();
    assert!(a.same_pixels(&b));
    assert!(!a.same_pixels(&c));
}
