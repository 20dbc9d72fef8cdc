//! Image payload decoding and embedding as PDF image `XObject`s.
//!
//! Payloads arrive as data URLs or bare base64. The format is sniffed from
//! magic bytes, never from the declared MIME type. PNG is decoded and
//! re-embedded as 8-bit RGB with an optional `SMask`; JPEG passes through
//! untouched under `DCTDecode`, its colour space read from the frame header
//! because the decoder reports CMYK data as RGB.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageDecoder, ImageReader};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported image encoding (expected PNG or JPEG)")]
    Unsupported,
    #[error("image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has zero size")]
    Empty,
    #[error("unsupported JPEG colour layout ({0} components)")]
    JpegComponents(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

/// An image `XObject` added to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Decode a data URL (`data:image/png;base64,...`) or raw base64 string.
///
/// # Errors
///
/// Returns [`ImageError::Base64`] when the payload is not valid base64.
pub fn decode_payload(raw: &str) -> Result<Vec<u8>, ImageError> {
    let body = match raw.trim().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => raw,
    };
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

#[must_use]
pub fn sniff(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(ImageKind::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageKind::Jpeg)
    } else {
        None
    }
}

/// Add `bytes` to `doc` as an image `XObject`.
///
/// # Errors
///
/// Returns [`ImageError::Unsupported`] for anything but PNG or JPEG and
/// [`ImageError::Decode`] when the image data is corrupt.
pub fn embed(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage, ImageError> {
    match sniff(bytes).ok_or(ImageError::Unsupported)? {
        ImageKind::Png => embed_png(doc, bytes),
        ImageKind::Jpeg => embed_jpeg(doc, bytes),
    }
}

fn embed_png(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage, ImageError> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(ImageError::Empty);
    }

    let smask = if decoded.color().has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        );
        Some(doc.add_object(mask))
    } else {
        None
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if let Some(mask_id) = smask {
        dict.set("SMask", Object::Reference(mask_id));
    }
    let id = doc.add_object(Stream::new(dict, decoded.to_rgb8().into_raw()));
    Ok(EmbeddedImage { id, width, height })
}

fn embed_jpeg(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage, ImageError> {
    let decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_decoder()?;
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageError::Empty);
    }
    let (color_space, decode) = jpeg_color_space(jpeg_frame(bytes))?;

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    if let Some(decode) = decode {
        dict.set("Decode", decode);
    }
    let stream = Stream::new(dict, bytes.to_vec()).with_compression(false);
    let id = doc.add_object(stream);
    Ok(EmbeddedImage { id, width, height })
}

/// Colour facts from a JPEG frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegFrame {
    pub components: u8,
    /// An Adobe `APP14` segment precedes the frame. Adobe CMYK data is
    /// stored inverted.
    pub adobe: bool,
}

/// Walk the marker segments up to the start of scan.
#[must_use]
pub fn jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    let mut adobe = false;
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        // Fill bytes and parameterless markers.
        if marker == 0xFF {
            i += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        let len = usize::from(u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]));
        let data = bytes.get(i + 4..i + 2 + len)?;
        match marker {
            0xEE if data.starts_with(b"Adobe") => adobe = true,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return data.get(5).map(|&components| JpegFrame { components, adobe });
            }
            0xDA => return None,
            _ => {}
        }
        i += 2 + len;
    }
    None
}

/// PDF colour space and optional `/Decode` array for a JPEG frame.
///
/// # Errors
///
/// [`ImageError::Unsupported`] without a frame header and
/// [`ImageError::JpegComponents`] for component counts other than 1, 3 or 4.
pub fn jpeg_color_space(frame: Option<JpegFrame>) -> Result<(&'static str, Option<Object>), ImageError> {
    match frame.ok_or(ImageError::Unsupported)? {
        JpegFrame { components: 1, .. } => Ok(("DeviceGray", None)),
        JpegFrame { components: 3, .. } => Ok(("DeviceRGB", None)),
        JpegFrame { components: 4, adobe } => {
            let inverted = adobe.then(|| Object::Array([1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer).to_vec()));
            Ok(("DeviceCMYK", inverted))
        }
        JpegFrame { components, .. } => Err(ImageError::JpegComponents(components)),
    }
}

#[cfg(test)]
#[path = "image_test.rs"]
mod tests;
