//! Image-to-PDF conversion.
//!
//! Scanned exams often arrive as photos. Each image becomes one PDF page:
//! flattened onto white (PDF has no alpha), recompressed as JPEG and
//! embedded as a `DCTDecode` image XObject. Page size assumes 96 DPI
//! input, mapped to 72-point-per-inch PDF space.

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::writer::{assemble_document, ContentStreamBuilder, ObjectSerializer};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::collections::BTreeMap;
use std::path::Path;

/// JPEG quality used for embedded pages.
const JPEG_QUALITY: u8 = 95;

/// Points per input pixel (96 DPI source, 72 pt/inch output).
const PT_PER_PX: f32 = 72.0 / 96.0;

/// Convert a single image file to a one-page PDF.
pub fn image_to_pdf(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    combine_images_to_pdf(&[path.as_ref()])
}

/// Combine multiple images into a single PDF, one page per image, in
/// input order.
pub fn combine_images_to_pdf(paths: &[impl AsRef<Path>]) -> Result<Vec<u8>> {
    if paths.is_empty() {
        return Err(Error::Image("no image paths provided".to_string()));
    }

    let mut objects: BTreeMap<u32, (u16, Object)> = BTreeMap::new();
    let catalog_id = 1u32;
    let pages_id = 2u32;
    let mut next_id = 3u32;
    let mut alloc = || {
        let id = next_id;
        next_id += 1;
        id
    };

    let mut page_refs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
        let rgb = flatten_to_white(&image);
        let (px_w, px_h) = rgb.dimensions();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode(rgb.as_raw(), px_w, px_h, image::ColorType::Rgb8)
            .map_err(|e| Error::Image(format!("JPEG encoding failed: {}", e)))?;

        let pt_w = px_w as f32 * PT_PER_PX;
        let pt_h = px_h as f32 * PT_PER_PX;

        let image_id = alloc();
        let content_id = alloc();
        let page_id = alloc();

        let mut image_dict = std::collections::HashMap::new();
        image_dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
        image_dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
        image_dict.insert("Width".to_string(), Object::Integer(px_w as i64));
        image_dict.insert("Height".to_string(), Object::Integer(px_h as i64));
        image_dict.insert(
            "ColorSpace".to_string(),
            Object::Name("DeviceRGB".to_string()),
        );
        image_dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
        image_dict.insert("Filter".to_string(), Object::Name("DCTDecode".to_string()));
        objects.insert(
            image_id,
            (
                0,
                Object::Stream {
                    dict: image_dict,
                    data: bytes::Bytes::from(jpeg),
                },
            ),
        );

        let mut content = ContentStreamBuilder::new();
        content
            .save_state()
            .transform(pt_w, 0.0, 0.0, pt_h, 0.0, 0.0)
            .paint_xobject("Im0")
            .restore_state();
        objects.insert(
            content_id,
            (
                0,
                Object::Stream {
                    dict: std::collections::HashMap::new(),
                    data: bytes::Bytes::from(content.build()),
                },
            ),
        );

        objects.insert(
            page_id,
            (
                0,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Page")),
                    ("Parent", ObjectSerializer::reference(pages_id, 0)),
                    (
                        "MediaBox",
                        ObjectSerializer::rect(0.0, 0.0, pt_w as f64, pt_h as f64),
                    ),
                    ("Contents", ObjectSerializer::reference(content_id, 0)),
                    (
                        "Resources",
                        ObjectSerializer::dict(vec![(
                            "XObject",
                            ObjectSerializer::dict(vec![(
                                "Im0",
                                ObjectSerializer::reference(image_id, 0),
                            )]),
                        )]),
                    ),
                ]),
            ),
        );
        page_refs.push(ObjectSerializer::reference(page_id, 0));

        log::info!(
            "embedded {} as a {:.0}x{:.0}pt page",
            path.display(),
            pt_w,
            pt_h
        );
    }

    objects.insert(
        catalog_id,
        (
            0,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Catalog")),
                ("Pages", ObjectSerializer::reference(pages_id, 0)),
            ]),
        ),
    );
    objects.insert(
        pages_id,
        (
            0,
            ObjectSerializer::dict(vec![
                ("Type", ObjectSerializer::name("Pages")),
                ("Count", ObjectSerializer::integer(page_refs.len() as i64)),
                ("Kids", Object::Array(page_refs)),
            ]),
        ),
    );

    assemble_document((1, 7), &objects, ObjectRef::new(catalog_id, 0), None)
}

/// Flatten any image mode onto a white background as 8-bit RGB.
fn flatten_to_white(image: &image::DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        let blend = |c: u8| -> u8 {
            ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        out.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PdfDocument;

    fn checker_png(path: &Path) {
        let mut img = RgbImage::new(4, 4);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = if (x + y) % 2 == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            };
        }
        img.save(path).unwrap();
    }

    #[test]
    fn test_single_image_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("scan.png");
        checker_png(&png);

        let bytes = image_to_pdf(&png).unwrap();
        let mut doc = PdfDocument::from_bytes(bytes).unwrap();
        assert_eq!(doc.page_count().unwrap(), 1);
        // 4px at 96 DPI -> 3pt.
        assert_eq!(doc.page_media_box(0).unwrap(), [0.0, 0.0, 3.0, 3.0]);
    }

    #[test]
    fn test_multiple_images_one_page_each() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        checker_png(&a);
        checker_png(&b);

        let bytes = combine_images_to_pdf(&[&a, &b]).unwrap();
        let mut doc = PdfDocument::from_bytes(bytes).unwrap();
        assert_eq!(doc.page_count().unwrap(), 2);
    }

    #[test]
    fn test_empty_input_rejected() {
        let paths: [&Path; 0] = [];
        assert!(matches!(
            combine_images_to_pdf(&paths),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn test_missing_file_is_image_error() {
        assert!(matches!(
            image_to_pdf("/nonexistent/scan.png"),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn test_alpha_flattened_to_white() {
        let rgba = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        let flat = flatten_to_white(&image::DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
    }
}
