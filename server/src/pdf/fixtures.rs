//! In-memory source PDFs for renderer and route tests.

use lopdf::{Document, Object, Stream, dictionary};

/// A document with one page per `(width, height)`, each carrying a little
/// existing content and a `/F1` font so overlays can be checked against it.
#[must_use]
pub fn blank_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
    build(sizes, false)
}

/// Like [`blank_pdf`] but the media box lives on the page tree root.
#[must_use]
pub fn inherited_box_pdf(width: i64, height: i64) -> Vec<u8> {
    build(&[(width, height)], true)
}

fn media_box(width: i64, height: i64) -> Object {
    Object::Array(vec![Object::Integer(0), Object::Integer(0), Object::Integer(width), Object::Integer(height)])
}

fn build(sizes: &[(i64, i64)], inherit_box: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for (i, (w, h)) in sizes.iter().enumerate() {
        let content = format!("BT /F1 10 Tf 20 20 Td (pagina {}) Tj ET\n", i + 1).into_bytes();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        if !inherit_box {
            page.set("MediaBox", media_box(*w, *h));
        }
        kids.push(doc.add_object(page).into());
    }

    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => i64::try_from(kids.len()).unwrap_or(0),
        "Kids" => kids,
    };
    if inherit_box {
        if let Some((w, h)) = sizes.first() {
            pages.set("MediaBox", media_box(*w, *h));
        }
    }
    finish(doc, pages_id, pages)
}

/// One A4 page that already draws an image `/Im1` and a font registered as
/// `FM_OVL_R`, the names an overlay would otherwise pick. The background
/// image is 1×1.
#[must_use]
pub fn letterhead_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let background_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0x80],
    ));
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content = b"q 595 842 0 0 cm /Im1 Do Q BT /FM_OVL_R 9 Tf 20 20 Td (timbre) Tj ET\n".to_vec();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box(595, 842),
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im1" => background_id },
            "Font" => dictionary! { "FM_OVL_R" => font_id },
        },
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => 1,
        "Kids" => vec![Object::Reference(page_id)],
    };
    finish(doc, pages_id, pages)
}

/// One A4 page whose `/Contents` is a reference to an array of two streams.
#[must_use]
pub fn indirect_contents_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let first = doc.add_object(Stream::new(dictionary! {}, b"0 0 1 rg\n".to_vec()));
    let second = doc.add_object(Stream::new(dictionary! {}, b"10 10 50 50 re f\n".to_vec()));
    let array_id = doc.add_object(Object::Array(vec![Object::Reference(first), Object::Reference(second)]));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box(595, 842),
        "Contents" => array_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => 1,
        "Kids" => vec![Object::Reference(page_id)],
    };
    finish(doc, pages_id, pages)
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, pages: lopdf::Dictionary) -> Vec<u8> {
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
