use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8, 10u8, 20u8, 30u8, 255u8];
    let img = image::RgbaImage::from_raw(2, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width(), 2);
    assert_eq!(decoded.height(), 1);
    assert_eq!(
        decoded.premul_bytes(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8,
            10,
            20,
            30,
            255,
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn load_image_reports_missing_file() {
    let err = load_image("definitely/not/here.png").unwrap_err();
    assert!(err.to_string().contains("here.png"));
}
