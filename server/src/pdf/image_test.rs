use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use super::*;

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn rgba_png(w: u32, h: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 128]))), ImageFormat::Png)
}

fn rgb_png(w: u32, h: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([0, 0, 255]))), ImageFormat::Png)
}

fn rgb_jpeg(w: u32, h: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 90, 90]))), ImageFormat::Jpeg)
}

fn gray_jpeg(w: u32, h: u32) -> Vec<u8> {
    encode(DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([90]))), ImageFormat::Jpeg)
}

/// SOI, optional Adobe APP14, then a baseline frame header with `components`.
fn jpeg_header(components: u8, adobe: bool) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    if adobe {
        bytes.extend([0xFF, 0xEE, 0x00, 0x0E]);
        bytes.extend(b"Adobe");
        bytes.extend([0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
    }
    let len = 8 + 3 * u16::from(components);
    bytes.extend([0xFF, 0xC0]);
    bytes.extend(len.to_be_bytes());
    bytes.extend([8, 0x00, 0x10, 0x00, 0x10, components]);
    for c in 1..=components {
        bytes.extend([c, 0x11, 0x00]);
    }
    bytes.extend([0xFF, 0xDA, 0x00, 0x02]);
    bytes
}

fn stream_dict(doc: &Document, id: ObjectId) -> lopdf::Dictionary {
    doc.get_object(id).unwrap().as_stream().unwrap().dict.clone()
}

// =============================================================================
// payloads
// =============================================================================

#[test]
fn data_urls_and_raw_base64_decode_alike() {
    let png = rgb_png(1, 1);
    let raw = STANDARD.encode(&png);
    assert_eq!(decode_payload(&raw).unwrap(), png);
    assert_eq!(decode_payload(&format!("data:image/png;base64,{raw}")).unwrap(), png);

    let wrapped: String = raw.chars().enumerate().flat_map(|(i, c)| if i % 10 == 9 { vec![c, '\n'] } else { vec![c] }).collect();
    assert_eq!(decode_payload(&wrapped).unwrap(), png);
}

#[test]
fn invalid_base64_is_rejected() {
    assert!(matches!(decode_payload("data:image/png;base64,@@@"), Err(ImageError::Base64(_))));
}

#[test]
fn sniffing_uses_magic_bytes() {
    assert_eq!(sniff(&rgb_png(1, 1)), Some(ImageKind::Png));
    assert_eq!(sniff(&rgb_jpeg(2, 2)), Some(ImageKind::Jpeg));
    assert_eq!(sniff(b"GIF89a......"), None);
    assert_eq!(sniff(&[]), None);
}

// =============================================================================
// embedding
// =============================================================================

#[test]
fn png_with_alpha_gets_soft_mask() {
    let mut doc = Document::with_version("1.5");
    let embedded = embed(&mut doc, &rgba_png(4, 2)).unwrap();
    assert_eq!((embedded.width, embedded.height), (4, 2));

    let dict = stream_dict(&doc, embedded.id);
    assert_eq!(dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
    let mask_id = dict.get(b"SMask").unwrap().as_reference().unwrap();
    let mask = doc.get_object(mask_id).unwrap().as_stream().unwrap();
    assert_eq!(mask.content.len(), 8);
    assert!(mask.content.iter().all(|a| *a == 128));

    let rgb = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
    assert_eq!(rgb.content.len(), 4 * 2 * 3);
}

#[test]
fn opaque_png_has_no_mask() {
    let mut doc = Document::with_version("1.5");
    let embedded = embed(&mut doc, &rgb_png(3, 3)).unwrap();
    assert!(stream_dict(&doc, embedded.id).get(b"SMask").is_err());
}

#[test]
fn jpeg_passes_through_untouched() {
    let jpeg = rgb_jpeg(5, 3);
    let mut doc = Document::with_version("1.5");
    let embedded = embed(&mut doc, &jpeg).unwrap();
    assert_eq!((embedded.width, embedded.height), (5, 3));

    let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
    assert_eq!(stream.content, jpeg);
    assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
    assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
    assert!(!stream.allows_compression);
}

#[test]
fn grayscale_jpeg_is_device_gray() {
    let mut doc = Document::with_version("1.5");
    let embedded = embed(&mut doc, &gray_jpeg(4, 4)).unwrap();
    let dict = stream_dict(&doc, embedded.id);
    assert_eq!(dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceGray");
    assert!(dict.get(b"Decode").is_err());
}

#[test]
fn frame_header_reports_components_and_adobe_marker() {
    assert_eq!(jpeg_frame(&rgb_jpeg(2, 2)).map(|f| f.components), Some(3));
    assert_eq!(jpeg_frame(&gray_jpeg(2, 2)).map(|f| f.components), Some(1));
    assert_eq!(jpeg_frame(&jpeg_header(4, true)), Some(JpegFrame { components: 4, adobe: true }));
    assert_eq!(jpeg_frame(&jpeg_header(4, false)), Some(JpegFrame { components: 4, adobe: false }));
    assert_eq!(jpeg_frame(&[0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02]), None);
    assert_eq!(jpeg_frame(&[0xFF, 0xD8]), None);
}

#[test]
fn cmyk_jpeg_maps_to_device_cmyk() {
    let (space, decode) = jpeg_color_space(jpeg_frame(&jpeg_header(4, false))).unwrap();
    assert_eq!(space, "DeviceCMYK");
    assert!(decode.is_none());

    let (space, decode) = jpeg_color_space(jpeg_frame(&jpeg_header(4, true))).unwrap();
    assert_eq!(space, "DeviceCMYK");
    let decode: Vec<i64> = decode.unwrap().as_array().unwrap().iter().map(|v| v.as_i64().unwrap()).collect();
    assert_eq!(decode, vec![1, 0, 1, 0, 1, 0, 1, 0]);
}

#[test]
fn odd_jpeg_layouts_are_rejected() {
    assert!(matches!(jpeg_color_space(jpeg_frame(&jpeg_header(2, false))), Err(ImageError::JpegComponents(2))));
    assert!(matches!(jpeg_color_space(None), Err(ImageError::Unsupported)));
}

#[test]
fn unsupported_and_corrupt_images_fail() {
    let mut doc = Document::with_version("1.5");
    assert!(matches!(embed(&mut doc, b"GIF89a"), Err(ImageError::Unsupported)));

    let mut truncated = rgb_png(2, 2);
    truncated.truncate(20);
    assert!(matches!(embed(&mut doc, &truncated), Err(ImageError::Decode(_))));
}
