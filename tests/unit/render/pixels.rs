use super::*;

#[test]
fn destination_in_keeps_only_covered_pixels() {
    let mut dst = vec![0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255];
    let mask = vec![255, 255, 255, 255, 0, 0, 0, 0, 128, 128, 128, 128];
    destination_in(&mut dst, &mask).unwrap();
    assert_eq!(&dst[0..4], &[0, 0, 255, 255]);
    assert_eq!(&dst[4..8], &[0, 0, 0, 0]);
    assert_eq!(&dst[8..12], &[0, 0, 128, 128]);
}

#[test]
fn destination_in_ignores_mask_color() {
    let mut dst = vec![10, 20, 30, 255];
    destination_in(&mut dst, &[0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn buffer_length_mismatch_is_an_error() {
    let mut dst = vec![0u8; 8];
    assert!(destination_in(&mut dst, &[0u8; 4]).is_err());
    assert!(premul_over_in_place(&mut dst, &[0u8; 12]).is_err());
}

#[test]
fn over_with_transparent_source_is_identity() {
    let mut dst = vec![255, 0, 0, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0]).unwrap();
    assert_eq!(dst, vec![255, 0, 0, 255]);
}

#[test]
fn over_with_opaque_source_replaces() {
    let mut dst = vec![255, 0, 0, 255];
    premul_over_in_place(&mut dst, &[0, 0, 255, 255]).unwrap();
    assert_eq!(dst, vec![0, 0, 255, 255]);
}

#[test]
fn over_with_half_alpha_blends() {
    let mut dst = vec![255, 0, 0, 255];
    premul_over_in_place(&mut dst, &[0, 0, 128, 128]).unwrap();
    assert_eq!(dst, vec![127, 0, 128, 255]);
}

#[test]
fn uniform_black_overlay_darkens() {
    let mut dst = vec![255, 0, 0, 255, 0, 0, 255, 255];
    overlay_uniform(&mut dst, [0, 0, 0, 230]);
    assert_eq!(dst, vec![25, 0, 0, 255, 0, 0, 25, 255]);

    let mut untouched = vec![1, 2, 3, 4];
    overlay_uniform(&mut untouched, [0, 0, 0, 0]);
    assert_eq!(untouched, vec![1, 2, 3, 4]);
}

#[test]
fn coverage_is_mean_alpha() {
    assert_eq!(alpha_coverage(&[]), 0.0);
    assert_eq!(alpha_coverage(&[255, 255, 255, 255, 0, 0, 0, 0]), 0.5);
}

#[test]
fn zero_sigma_disables_blur_and_bad_sigma_is_rejected() {
    assert!(AlphaBlur::new(0.0).unwrap().is_none());
    assert!(AlphaBlur::new(-1.0).is_err());
    assert!(AlphaBlur::new(f64::NAN).is_err());
    assert_eq!(AlphaBlur::new(0.8).unwrap().unwrap().radius(), 3);
}

#[test]
fn blur_preserves_uniform_masks_and_softens_edges() {
    let (w, h) = (8u32, 4u32);
    let mut full = vec![255u8; (w * h * 4) as usize];
    let mut blur = AlphaBlur::new(0.8).unwrap().unwrap();
    blur.apply(&mut full, w, h);
    assert!(full.iter().all(|&v| v == 255));

    // Left half covered, right half empty.
    let mut half = vec![0u8; (w * h * 4) as usize];
    for y in 0..h {
        for x in 0..w / 2 {
            let i = ((y * w + x) * 4) as usize;
            half[i..i + 4].fill(255);
        }
    }
    blur.apply(&mut half, w, h);
    let alpha_at = |x: u32| half[((w + x) * 4 + 3) as usize];
    assert_eq!(alpha_at(0), 255);
    assert!(alpha_at(3) < 255 && alpha_at(3) > 128);
    assert!(alpha_at(4) > 0 && alpha_at(4) < 128);
    assert_eq!(alpha_at(7), 0);
    let i = ((w + 3) * 4) as usize;
    assert!(half[i..i + 3].iter().all(|&c| c == half[i + 3]));
}
