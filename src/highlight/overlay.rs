//! Overlay rendering and document rewriting.
//!
//! Marks are drawn as additional content streams appended to each page's
//! `/Contents` array; the original streams are never touched. A shared
//! one-operator `q` stream is prepended and the overlay begins with `Q`,
//! which neutralizes any graphics state the page's own content leaves
//! unrestored. Page resources gain the `/ExtGState` entries carrying the
//! fill alphas and a Helvetica font for badge labels.

use super::{HighlightConfig, HighlightSpec};
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::fonts::helvetica_string_width;
use crate::object::{Object, ObjectRef};
use crate::writer::{assemble_document, ContentStreamBuilder, ObjectSerializer};
use std::collections::{BTreeMap, HashMap};

/// Resource name of the badge label font.
const LABEL_FONT: &str = "RPhlF";

/// Vertical offset of the label baseline below the badge center, in em.
const LABEL_BASELINE_DROP: f32 = 0.35;

/// Apply all planned marks and re-serialize the document.
pub(crate) fn apply_overlays(
    doc: &mut PdfDocument,
    marks: &BTreeMap<usize, Vec<HighlightSpec>>,
    config: &HighlightConfig,
) -> Result<Vec<u8>> {
    let mut objects = doc.collect_objects()?;
    let mut next_id = objects.keys().max().copied().unwrap_or(0) + 1;
    let mut alloc = move || {
        let id = next_id;
        next_id += 1;
        id
    };

    let page_refs = doc.page_refs()?;

    // Shared objects are only created when something will be drawn; an
    // empty mark set still re-serializes the document unchanged.
    if !marks.is_empty() {
        let font_id = alloc();
        objects.insert(
            font_id,
            (
                0,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Font")),
                    ("Subtype", ObjectSerializer::name("Type1")),
                    ("BaseFont", ObjectSerializer::name("Helvetica")),
                    ("Encoding", ObjectSerializer::name("WinAnsiEncoding")),
                ]),
            ),
        );

        let wrap_id = alloc();
        objects.insert(
            wrap_id,
            (
                0,
                Object::Stream {
                    dict: HashMap::new(),
                    data: bytes::Bytes::from_static(b"q\n"),
                },
            ),
        );

        // One ExtGState per distinct fill alpha in use.
        let mut gstates: BTreeMap<u16, (u32, String)> = BTreeMap::new();
        for spec in marks.values().flatten() {
            let percent = (spec.style.fill_opacity * 100.0).round() as u16;
            gstates.entry(percent).or_insert_with(|| {
                let id = alloc();
                (id, format!("RPhlA{}", percent))
            });
        }
        for (percent, (id, _)) in &gstates {
            objects.insert(
                *id,
                (
                    0,
                    ObjectSerializer::dict(vec![
                        ("Type", ObjectSerializer::name("ExtGState")),
                        ("ca", ObjectSerializer::real(f64::from(*percent) / 100.0)),
                    ]),
                ),
            );
        }

        let shared = SharedResources {
            font_id,
            wrap_id,
            gstates,
        };

        for (&page_idx, specs) in marks {
            annotate_page(doc, &mut objects, &mut alloc, &page_refs, page_idx, specs, config, &shared)?;
        }
    }

    let trailer = doc.trailer();
    let root = trailer
        .get("Root")
        .and_then(|o| o.as_reference())
        .ok_or_else(|| Error::InvalidPdf("trailer has no /Root reference".to_string()))?;
    let info = trailer
        .get("Info")
        .and_then(|o| o.as_reference())
        .filter(|r| objects.contains_key(&r.id));

    assemble_document(doc.version(), &objects, root, info)
}

/// Rewrite one page: wrap its contents, append the overlay stream, and
/// extend its resources.
#[allow(clippy::too_many_arguments)]
fn annotate_page(
    doc: &mut PdfDocument,
    objects: &mut BTreeMap<u32, (u16, Object)>,
    alloc: &mut impl FnMut() -> u32,
    page_refs: &[ObjectRef],
    page_idx: usize,
    specs: &[HighlightSpec],
    config: &HighlightConfig,
    shared: &SharedResources,
) -> Result<()> {
    let page_ref = *page_refs.get(page_idx).ok_or(Error::PageOutOfBounds {
        page: page_idx,
        count: page_refs.len(),
    })?;

    let mut page_dict = doc.page_dict(page_idx)?;
    let media_box = doc.page_media_box(page_idx)?;

    // Normalize /Contents to an array of stream references.
    let mut elements = match page_dict.get("Contents").cloned() {
        None => Vec::new(),
        Some(Object::Reference(r)) => match doc.load_object(r)? {
            Object::Array(items) => items,
            _ => vec![Object::Reference(r)],
        },
        Some(Object::Array(items)) => items,
        Some(stream @ Object::Stream { .. }) => {
            let id = alloc();
            objects.insert(id, (0, stream));
            vec![Object::Reference(ObjectRef::new(id, 0))]
        },
        Some(_) => Vec::new(),
    };

    let overlay_id = alloc();
    objects.insert(
        overlay_id,
        (
            0,
            Object::Stream {
                dict: HashMap::new(),
                data: bytes::Bytes::from(paint_page_overlay(
                    specs,
                    media_box,
                    config,
                    &shared.gstates,
                )),
            },
        ),
    );

    let mut contents = Vec::with_capacity(elements.len() + 2);
    contents.push(Object::Reference(ObjectRef::new(shared.wrap_id, 0)));
    contents.append(&mut elements);
    contents.push(Object::Reference(ObjectRef::new(overlay_id, 0)));
    page_dict.insert("Contents".to_string(), Object::Array(contents));

    let resources = merged_resources(doc, page_idx, shared)?;
    page_dict.insert("Resources".to_string(), Object::Dictionary(resources));

    objects.insert(page_ref.id, (page_ref.gen, Object::Dictionary(page_dict)));
    Ok(())
}

struct SharedResources {
    font_id: u32,
    wrap_id: u32,
    /// fill-alpha percent -> (object id, resource name)
    gstates: BTreeMap<u16, (u32, String)>,
}

/// The page's effective resources plus our font and graphics states.
fn merged_resources(
    doc: &mut PdfDocument,
    page_idx: usize,
    shared: &SharedResources,
) -> Result<HashMap<String, Object>> {
    let mut resources = doc.page_resources(page_idx)?;

    let mut ext_gstate = match resources.get("ExtGState") {
        Some(obj) => match doc.resolve(obj)? {
            Object::Dictionary(d) => d,
            _ => HashMap::new(),
        },
        None => HashMap::new(),
    };
    for (id, name) in shared.gstates.values() {
        ext_gstate.insert(name.clone(), Object::Reference(ObjectRef::new(*id, 0)));
    }
    resources.insert("ExtGState".to_string(), Object::Dictionary(ext_gstate));

    let mut fonts = match resources.get("Font") {
        Some(obj) => match doc.resolve(obj)? {
            Object::Dictionary(d) => d,
            _ => HashMap::new(),
        },
        None => HashMap::new(),
    };
    fonts.insert(
        LABEL_FONT.to_string(),
        Object::Reference(ObjectRef::new(shared.font_id, 0)),
    );
    resources.insert("Font".to_string(), Object::Dictionary(fonts));

    Ok(resources)
}

/// Draw one page's marks. The stream opens with `Q` to close the shared
/// wrapper's `q`, so it always runs in the page's initial state.
fn paint_page_overlay(
    specs: &[HighlightSpec],
    media_box: [f32; 4],
    config: &HighlightConfig,
    gstates: &BTreeMap<u16, (u32, String)>,
) -> Vec<u8> {
    let page_top = media_box[3];
    let mut content = ContentStreamBuilder::new();
    content.restore_state();

    for spec in specs {
        let rect = spec.rect;
        let fill = spec.style.fill;
        let percent = (spec.style.fill_opacity * 100.0).round() as u16;

        content.save_state();
        if let Some((_, gs_name)) = gstates.get(&percent) {
            content.set_ext_gstate(gs_name);
        }
        content
            .set_stroke_rgb(fill.r, fill.g, fill.b)
            .set_fill_rgb(fill.r, fill.g, fill.b)
            .set_line_width(config.stroke_width)
            .rect(
                rect.x,
                page_top - rect.bottom(),
                rect.width,
                rect.height,
            )
            .fill_stroke()
            .restore_state();

        if !spec.label.is_empty() {
            let badge = spec.style.badge;
            let cx = rect.x - config.badge_offset;
            let cy = page_top - rect.y;
            let size = config.label_font_size;
            let label_width = helvetica_string_width(&spec.label) / 1000.0 * size;

            content
                .save_state()
                .set_fill_rgb(badge.r, badge.g, badge.b)
                .circle(cx, cy, config.badge_radius)
                .fill()
                .begin_text()
                .set_font(LABEL_FONT, size)
                .set_fill_rgb(1.0, 1.0, 1.0)
                .move_text(cx - label_width / 2.0, cy - LABEL_BASELINE_DROP * size)
                .show_text(&spec.label)
                .end_text()
                .restore_state();
        }
    }

    content.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{Color, MarkStyle};
    use crate::geometry::Rect;

    fn spec(rect: Rect, opacity: f32, label: &str) -> HighlightSpec {
        HighlightSpec {
            rect,
            style: MarkStyle {
                fill: Color::new(1.0, 0.0, 0.0),
                fill_opacity: opacity,
                badge: Color::new(0.9, 0.0, 0.0),
            },
            label: label.to_string(),
        }
    }

    fn gstates() -> BTreeMap<u16, (u32, String)> {
        let mut map = BTreeMap::new();
        map.insert(30, (90, "RPhlA30".to_string()));
        map
    }

    #[test]
    fn test_overlay_opens_with_restore() {
        let specs = vec![spec(Rect::new(10.0, 20.0, 30.0, 15.0), 0.3, "")];
        let bytes =
            paint_page_overlay(&specs, [0.0, 0.0, 612.0, 792.0], &HighlightConfig::default(), &gstates());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Q\n"));
    }

    #[test]
    fn test_rect_converted_to_pdf_space() {
        // Top-down rect at y=20, height 15 on a 792pt page: PDF y = 757.
        let specs = vec![spec(Rect::new(10.0, 20.0, 30.0, 15.0), 0.3, "")];
        let bytes =
            paint_page_overlay(&specs, [0.0, 0.0, 612.0, 792.0], &HighlightConfig::default(), &gstates());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("10 757 30 15 re"), "got: {}", text);
        assert!(text.contains("/RPhlA30 gs"));
        assert!(text.contains("B\n"));
    }

    #[test]
    fn test_badge_drawn_only_with_label() {
        let config = HighlightConfig::default();
        let without = paint_page_overlay(
            &[spec(Rect::new(50.0, 50.0, 20.0, 10.0), 0.3, "")],
            [0.0, 0.0, 612.0, 792.0],
            &config,
            &gstates(),
        );
        let with = paint_page_overlay(
            &[spec(Rect::new(50.0, 50.0, 20.0, 10.0), 0.3, "Q7")],
            [0.0, 0.0, 612.0, 792.0],
            &config,
            &gstates(),
        );
        let without = String::from_utf8(without).unwrap();
        let with = String::from_utf8(with).unwrap();
        assert!(!without.contains("BT"));
        assert!(with.contains("BT"));
        assert!(with.contains("(Q7) Tj"));
        // Badge center sits 10pt left of the rect at its top edge.
        assert!(with.contains("48 742 m"), "got: {}", with);
    }
}
