use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use crate::errors::{CropError, CropResult};
use crate::models::CropForm;

/// Splits a `data:<mime>;base64,<payload>` URL (or bare base64) into its
/// mime type and decoded bytes.
pub fn decode_image_payload(encoded: &str) -> CropResult<(Option<String>, Vec<u8>)> {
    let (mime, payload) = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').unwrap_or(("", rest));
            let mime = header.trim_end_matches(";base64");
            ((!mime.is_empty()).then(|| mime.to_string()), payload)
        }
        None => (None, encoded),
    };
    Ok((mime, STANDARD.decode(payload.trim())?))
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Source-pixel rectangle after scaling and normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps the drawn rectangle into source pixels. A rectangle drawn right to
/// left or bottom to top is normalised first.
pub fn source_region(form: &CropForm, natural_width: u32) -> CropResult<SourceRegion> {
    let scale = match form.display_width {
        Some(display) if display > 0.0 && display.is_finite() => natural_width as f64 / display,
        Some(display) => return Err(CropError::InvalidScale(display)),
        None => 1.0,
    };

    let (x, width) = if form.width < 0.0 { (form.x + form.width, -form.width) } else { (form.x, form.width) };
    let (y, height) = if form.height < 0.0 { (form.y + form.height, -form.height) } else { (form.y, form.height) };

    Ok(SourceRegion {
        x: x * scale,
        y: y * scale,
        width: width * scale,
        height: height * scale,
    })
}

/// Crops an encoded image and returns the result as a JPEG data URL.
/// Selections under `min_size` source pixels on either side are refused.
pub fn crop_encoded_image(encoded: &str, form: &CropForm, min_size: u32) -> CropResult<String> {
    let (_, bytes) = decode_image_payload(encoded)?;
    let img = image::load_from_memory(&bytes)?;

    let region = source_region(form, img.width())?;
    if region.width < min_size as f64 || region.height < min_size as f64 {
        tracing::debug!(
            "Crop selection {:.1}x{:.1} below minimum {}",
            region.width,
            region.height,
            min_size
        );
        return Err(CropError::SelectionTooSmall {
            width: region.width,
            height: region.height,
            min: min_size,
        });
    }

    let x = region.x.max(0.0).floor() as u32;
    let y = region.y.max(0.0).floor() as u32;
    let width = region.width.round() as u32;
    let height = region.height.round() as u32;

    let fits = region.x >= 0.0
        && region.y >= 0.0
        && x.checked_add(width).is_some_and(|right| right <= img.width())
        && y.checked_add(height).is_some_and(|bottom| bottom <= img.height());
    if !fits {
        return Err(CropError::OutOfBounds {
            x,
            y,
            width,
            height,
            image_width: img.width(),
            image_height: img.height(),
        });
    }

    let cropped = DynamicImage::ImageRgb8(img.crop_imm(x, y, width, height).to_rgb8());
    let mut buffer = Vec::new();
    cropped.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)?;

    tracing::debug!("Cropped {}x{} at ({}, {}) from {}x{}", width, height, x, y, img.width(), img.height());
    Ok(encode_data_url("image/jpeg", &buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_data_url(width: u32, height: u32) -> String {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        encode_data_url("image/png", &bytes)
    }

    fn region(x: f64, y: f64, width: f64, height: f64) -> CropForm {
        CropForm { x, y, width, height, display_width: None }
    }

    #[test]
    fn test_crop_produces_region_sized_jpeg() {
        let source = png_data_url(200, 150);
        let cropped = crop_encoded_image(&source, &region(10.0, 20.0, 120.0, 80.0), 50).unwrap();

        let (mime, bytes) = decode_image_payload(&cropped).unwrap();
        assert_eq!(mime.as_deref(), Some("image/jpeg"));
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (120, 80));
    }

    #[test]
    fn test_narrow_selection_rejected_and_source_untouched() {
        let source = png_data_url(200, 150);
        let before = source.clone();

        let err = crop_encoded_image(&source, &region(0.0, 0.0, 30.0, 100.0), 50).unwrap_err();
        assert!(matches!(err, CropError::SelectionTooSmall { min: 50, .. }));
        assert_eq!(source, before);
    }

    #[test]
    fn test_minimum_applies_in_source_pixels() {
        // 40 display px on an image shown at half size is 80 source px
        let source = png_data_url(400, 400);
        let scaled = CropForm { display_width: Some(200.0), ..region(0.0, 0.0, 40.0, 40.0) };
        let cropped = crop_encoded_image(&source, &scaled, 50).unwrap();
        let (_, bytes) = decode_image_payload(&cropped).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (80, 80));

        // 60 display px on an image shown at double size is 30 source px
        let small = png_data_url(100, 100);
        let shrunk = CropForm { display_width: Some(200.0), ..region(0.0, 0.0, 60.0, 60.0) };
        assert!(matches!(
            crop_encoded_image(&small, &shrunk, 50),
            Err(CropError::SelectionTooSmall { .. })
        ));
    }

    #[test]
    fn test_reverse_drawn_selection_is_normalised() {
        let form = region(150.0, 120.0, -100.0, -60.0);
        assert_eq!(
            source_region(&form, 200).unwrap(),
            SourceRegion { x: 50.0, y: 60.0, width: 100.0, height: 60.0 }
        );
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let source = png_data_url(100, 100);
        let err = crop_encoded_image(&source, &region(60.0, 0.0, 60.0, 60.0), 50).unwrap_err();
        assert!(matches!(err, CropError::OutOfBounds { .. }));
    }

    #[test]
    fn test_bad_payloads() {
        assert!(matches!(
            crop_encoded_image("data:image/png;base64,@@@", &region(0.0, 0.0, 60.0, 60.0), 50),
            Err(CropError::Encoding(_))
        ));
        let not_an_image = encode_data_url("image/png", b"plain text");
        assert!(matches!(
            crop_encoded_image(&not_an_image, &region(0.0, 0.0, 60.0, 60.0), 50),
            Err(CropError::Image(_))
        ));
        let zero_width = CropForm { display_width: Some(0.0), ..region(0.0, 0.0, 60.0, 60.0) };
        assert!(matches!(source_region(&zero_width, 100), Err(CropError::InvalidScale(_))));
    }

    #[test]
    fn test_bare_base64_accepted() {
        let (mime, bytes) = decode_image_payload(&STANDARD.encode(b"abc")).unwrap();
        assert_eq!(mime, None);
        assert_eq!(bytes, b"abc");
    }
}
