//! Field-to-PDF renderer.
//!
//! DESIGN
//! ======
//! A render takes the template's source PDF, its field records, a data
//! context, and optional image payloads, and returns a new PDF with every
//! field drawn on its page. Positions are stored in canvas space and are
//! scaled to each page's real media box through `fields::geometry`, the same
//! transform the editor uses.
//!
//! Each touched page gets one appended content stream. The page's original
//! content is bracketed by `q`/`Q` so a graphics state it leaves behind
//! cannot shift or recolor the overlay. Text uses the standard Helvetica
//! pair (at most two font objects per document); images become `XObject`s.
//! Overlay resources are registered under `FM_OVL_` names and get a numeric
//! suffix when the page already defines the same name.
//!
//! ERROR HANDLING
//! ==============
//! An unreadable source, a field on a page that does not exist, and an image
//! that cannot be decoded abort the whole render. Unresolvable variables
//! render as empty text. Fields without a position are reported as warnings
//! alongside the output. Text taller than its rectangle is still drawn in
//! full and only produces a warning.

pub mod context;
pub mod image;
pub mod text;

#[cfg(test)]
pub mod fixtures;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fields::geometry::{PageSize, PdfRect, Transform};
use fields::{FieldKind, FieldRecord, Style};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, info, warn};

pub use context::DataContext;
use context::{format_value, substitute};
use text::{Face, aligned_x, encode_win_ansi, layout_lines, parse_color, text_width};

/// Vertical distance between consecutive baselines, beyond the font size.
const LINE_GAP: f64 = 2.0;

/// Prefix of every resource name the overlay adds to a page.
const OVERLAY_PREFIX: &str = "FM_OVL_";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("source PDF could not be read: {0}")]
    Load(String),
    #[error("field {field_id} targets page {page} but the document has {pages} page(s)")]
    PageOutOfRange { field_id: String, page: u32, pages: usize },
    #[error("field {field_id}: {reason}")]
    Image { field_id: String, reason: String },
    #[error("PDF could not be written: {0}")]
    Encode(String),
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub warnings: Vec<String>,
}

// =============================================================================
// RENDER
// =============================================================================

/// Draw `fields` onto a copy of `source`.
///
/// `images` maps a field id, a variable name, or the field type
/// (`assinatura` / `foto`) to a data URL or base64 payload.
///
/// # Errors
///
/// See the module-level error handling notes.
pub fn render(
    source: &[u8],
    fields: &[FieldRecord],
    data: &DataContext,
    images: &HashMap<String, String>,
) -> Result<Rendered, RenderError> {
    let mut doc = Document::load_mem(source).map_err(|e| RenderError::Load(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(RenderError::Load("document is encrypted".into()));
    }
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

    let mut ordered: Vec<&FieldRecord> = fields.iter().collect();
    ordered.sort_by_key(|f| f.order);

    let mut overlays: BTreeMap<ObjectId, PageOverlay> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut image_count = 0_usize;

    for field in ordered {
        let field_id = field.id.as_ref().map_or_else(|| "?".to_owned(), ToString::to_string);
        let Some(position) = field.position else {
            warn!(field_id = %field_id, "field has no position; skipped");
            warnings.push(format!("Campo \"{}\" ({field_id}) sem posição; ignorado", field.name));
            continue;
        };

        let page = position.page.max(1);
        let page_id = usize::try_from(page - 1)
            .ok()
            .and_then(|index| pages.get(index).copied())
            .ok_or_else(|| RenderError::PageOutOfRange { field_id: field_id.clone(), page, pages: pages.len() })?;
        let rect = Transform::new(page_size(&doc, page_id)).to_pdf_rect(&position);

        if field.kind().is_image() {
            let Some(payload) = image_payload(field, images) else {
                debug!(field_id = %field_id, "no image payload; skipped");
                continue;
            };
            let image_error = |reason: String| RenderError::Image { field_id: field_id.clone(), reason };
            let bytes = image::decode_payload(payload).map_err(|e| image_error(e.to_string()))?;
            let embedded = image::embed(&mut doc, &bytes).map_err(|e| image_error(e.to_string()))?;
            image_count += 1;
            let name = format!("{OVERLAY_PREFIX}Im{image_count}");
            overlays.entry(page_id).or_default().draw_image(name, embedded.id, rect);
            continue;
        }

        let value = field_text(field, data);
        if value.trim().is_empty() {
            continue;
        }
        let overflow = overlays.entry(page_id).or_default().draw_text(&field.effective_style(), &value, rect);
        if overflow > 0 {
            warn!(field_id = %field_id, overflow, "text overflows field rectangle");
            warnings.push(format!(
                "Campo \"{}\" ({field_id}): {overflow} linha(s) ultrapassam a área do campo",
                field.name
            ));
        }
    }

    let mut fonts = FontObjects::default();
    for (page_id, overlay) in overlays {
        apply_overlay(&mut doc, page_id, overlay, &mut fonts).map_err(|e| RenderError::Encode(e.to_string()))?;
    }

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| RenderError::Encode(e.to_string()))?;
    info!(pages = pages.len(), images = image_count, warnings = warnings.len(), "pdf rendered");
    Ok(Rendered { bytes, warnings })
}

/// Display text for a text or composite field, already formatted.
fn field_text(field: &FieldRecord, data: &DataContext) -> String {
    let resolved = match field.kind() {
        FieldKind::CompositeText => field
            .composite
            .as_ref()
            .map(|c| substitute(&c.template, |v| data.resolve(v)))
            .unwrap_or_default(),
        _ => field.variable.as_deref().map(|v| data.resolve(v)).unwrap_or_default(),
    };
    let value = if resolved.trim().is_empty() { field.default_value.clone().unwrap_or_default() } else { resolved };
    format_value(&field.field_type, &value)
}

fn image_payload<'a>(field: &FieldRecord, images: &'a HashMap<String, String>) -> Option<&'a str> {
    let by_id = field.id.as_ref().and_then(|id| images.get(id.as_str()));
    let by_variable = field.variable.as_ref().and_then(|v| images.get(v));
    by_id
        .or(by_variable)
        .or_else(|| images.get(field.field_type.as_str()))
        .map(String::as_str)
        .filter(|payload| !payload.trim().is_empty())
}

// =============================================================================
// PAGE OVERLAY
// =============================================================================

#[derive(Default)]
struct PageOverlay {
    operations: Vec<Operation>,
    faces: BTreeSet<Face>,
    xobjects: Vec<(String, ObjectId)>,
}

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

impl PageOverlay {
    /// Lay out and draw every line of `value`. Returns how many baselines fell
    /// below the rectangle.
    fn draw_text(&mut self, style: &Style, value: &str, rect: PdfRect) -> usize {
        let face = if style.bold { Face::Bold } else { Face::Regular };
        let size = style.font_size;
        let lines = layout_lines(face, value, size, rect.width);
        let (r, g, b) = parse_color(&style.color);

        self.faces.insert(face);
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));

        let mut overflow = 0;
        for (i, line) in lines.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let baseline = rect.top() - size - i as f64 * (size + LINE_GAP);
            if i > 0 && baseline < rect.y {
                overflow += 1;
            }
            let x = aligned_x(style.alignment, rect.x, rect.width, text_width(face, line, size));
            self.operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(face.resource_name().as_bytes().to_vec()), real(size)]),
                Operation::new("Td", vec![real(x), real(baseline)]),
                Operation::new("Tj", vec![Object::String(encode_win_ansi(line), StringFormat::Literal)]),
                Operation::new("ET", vec![]),
            ]);
        }
        self.operations.push(Operation::new("Q", vec![]));
        overflow
    }

    fn draw_image(&mut self, name: String, id: ObjectId, rect: PdfRect) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![real(rect.width), 0.into(), 0.into(), real(rect.height), real(rect.x), real(rect.y)],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
        self.xobjects.push((name, id));
    }
}

#[derive(Default)]
struct FontObjects {
    regular: Option<ObjectId>,
    bold: Option<ObjectId>,
}

impl FontObjects {
    fn get(&mut self, doc: &mut Document, face: Face) -> ObjectId {
        let slot = match face {
            Face::Regular => &mut self.regular,
            Face::Bold => &mut self.bold,
        };
        *slot.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            })
        })
    }
}

// =============================================================================
// DOCUMENT PLUMBING
// =============================================================================

/// Follow a reference (if any) to a dictionary.
fn resolve_dict(doc: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Dictionary(d) => Some(d.clone()),
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_dict).ok().cloned(),
        _ => None,
    }
}

/// Look up `key` on a page node, walking `/Parent` for inherited attributes.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_object(page_id).and_then(Object::as_dict).ok()?;
    // Page trees are shallow; the bound only guards against cycles.
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_object(parent).and_then(Object::as_dict).ok()?;
    }
    None
}

fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let media_box = inherited(doc, page_id, b"MediaBox").and_then(|obj| match obj {
        Object::Reference(id) => doc.get_object(id).ok().cloned(),
        other => Some(other),
    });
    let corners: Option<Vec<f64>> = media_box
        .as_ref()
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| arr.iter().map(|v| v.as_float().ok().map(f64::from)).collect());
    match corners.as_deref() {
        Some([x0, y0, x1, y1]) if (x1 - x0).abs() > 0.0 && (y1 - y0).abs() > 0.0 => {
            PageSize { width: (x1 - x0).abs(), height: (y1 - y0).abs() }
        }
        _ => {
            warn!(?page_id, "page has no usable media box; assuming A4");
            PageSize::A4
        }
    }
}

/// First free name in `dict` starting from `preferred`.
fn unique_name(dict: &Dictionary, preferred: &str) -> String {
    if !dict.has(preferred.as_bytes()) {
        return preferred.to_owned();
    }
    let mut n = 2_usize;
    loop {
        let candidate = format!("{preferred}_{n}");
        if !dict.has(candidate.as_bytes()) {
            return candidate;
        }
        n += 1;
    }
}

/// Point `Tf` and `Do` operands at the names actually registered.
fn rename_operands(operations: &mut [Operation], renames: &HashMap<String, String>) {
    for op in operations.iter_mut().filter(|op| op.operator == "Tf" || op.operator == "Do") {
        if let Some(Object::Name(name)) = op.operands.first_mut() {
            if let Some(registered) = std::str::from_utf8(name).ok().and_then(|n| renames.get(n)) {
                *name = registered.as_bytes().to_vec();
            }
        }
    }
}

/// Flatten a page's `/Contents` into stream references. Accepts a stream
/// reference, an array, or a reference to an array.
fn content_refs(doc: &Document, contents: &Object) -> Vec<Object> {
    match contents {
        Object::Array(items) => items.iter().filter(|item| is_stream_ref(doc, item)).cloned().collect(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.iter().filter(|item| is_stream_ref(doc, item)).cloned().collect(),
            Ok(Object::Stream(_)) => vec![contents.clone()],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn is_stream_ref(doc: &Document, object: &Object) -> bool {
    matches!(object, Object::Reference(id) if matches!(doc.get_object(*id), Ok(Object::Stream(_))))
}

fn apply_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: PageOverlay,
    fonts: &mut FontObjects,
) -> Result<(), lopdf::Error> {
    let mut resources =
        inherited(doc, page_id, b"Resources").and_then(|obj| resolve_dict(doc, &obj)).unwrap_or_default();
    let mut renames = HashMap::new();

    if !overlay.faces.is_empty() {
        let mut font_dict = resources.get(b"Font").ok().and_then(|obj| resolve_dict(doc, obj)).unwrap_or_default();
        for face in &overlay.faces {
            let name = unique_name(&font_dict, face.resource_name());
            font_dict.set(name.as_bytes().to_vec(), Object::Reference(fonts.get(doc, *face)));
            renames.insert(face.resource_name().to_owned(), name);
        }
        resources.set("Font", Object::Dictionary(font_dict));
    }
    if !overlay.xobjects.is_empty() {
        let mut xobject_dict =
            resources.get(b"XObject").ok().and_then(|obj| resolve_dict(doc, obj)).unwrap_or_default();
        for (preferred, id) in &overlay.xobjects {
            let name = unique_name(&xobject_dict, preferred);
            xobject_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
            renames.insert(preferred.clone(), name);
        }
        resources.set("XObject", Object::Dictionary(xobject_dict));
    }

    let existing = match doc.get_object(page_id).and_then(Object::as_dict)?.get(b"Contents") {
        Ok(contents) => content_refs(doc, contents),
        Err(_) => Vec::new(),
    };

    let mut operations = overlay.operations;
    rename_operands(&mut operations, &renames);
    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        operations.insert(0, Operation::new("Q", vec![]));
        contents.push(Object::Reference(doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()))));
        contents.extend(existing);
    }
    let mut encoded = b"\n".to_vec();
    encoded.extend(Content { operations }.encode()?);
    contents.push(Object::Reference(doc.add_object(Stream::new(dictionary! {}, encoded))));

    let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
