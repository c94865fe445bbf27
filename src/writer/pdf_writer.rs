//! Whole-document assembly.
//!
//! Takes a complete object map and writes header, body, cross-reference
//! table and trailer. Used both by [`DocumentBuilder`] for new documents
//! and by the highlighter when re-serializing a modified document.
//!
//! [`DocumentBuilder`]: crate::writer::DocumentBuilder

use super::object_serializer::ObjectSerializer;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use std::collections::BTreeMap;
use std::io::Write;

/// Assemble a complete PDF file from its objects.
///
/// `objects` maps object number to `(generation, object)`; `root` must
/// name the document catalog. Missing object numbers below the maximum
/// are written as free xref entries.
pub fn assemble_document(
    version: (u8, u8),
    objects: &BTreeMap<u32, (u16, Object)>,
    root: ObjectRef,
    info: Option<ObjectRef>,
) -> Result<Vec<u8>> {
    if !objects.contains_key(&root.id) {
        return Err(Error::Render(format!(
            "catalog object {} missing from object map",
            root.id
        )));
    }

    let serializer = ObjectSerializer::new();
    let mut output = Vec::new();

    writeln!(output, "%PDF-{}.{}", version.0, version.1)?;
    // Binary marker so transports treat the file as binary.
    output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    let mut offsets: BTreeMap<u32, (u16, usize)> = BTreeMap::new();
    for (&id, (gen, obj)) in objects {
        offsets.insert(id, (*gen, output.len()));
        output.extend_from_slice(&serializer.serialize_indirect(id, *gen, obj));
    }

    let size = objects.keys().max().map(|&m| m + 1).unwrap_or(1);

    let xref_start = output.len();
    writeln!(output, "xref")?;
    writeln!(output, "0 {}", size)?;
    writeln!(output, "0000000000 65535 f ")?;
    for id in 1..size {
        match offsets.get(&id) {
            Some((gen, offset)) => writeln!(output, "{:010} {:05} n ", offset, gen)?,
            None => writeln!(output, "0000000000 65535 f ")?,
        }
    }

    let mut trailer_entries = vec![
        ("Size", ObjectSerializer::integer(size as i64)),
        ("Root", Object::Reference(root)),
        ("ID", file_id()),
    ];
    if let Some(info_ref) = info {
        trailer_entries.push(("Info", Object::Reference(info_ref)));
    }
    let trailer = ObjectSerializer::dict(trailer_entries);

    writeln!(output, "trailer")?;
    output.extend_from_slice(&serializer.serialize(&trailer));
    writeln!(output)?;
    writeln!(output, "startxref")?;
    writeln!(output, "{}", xref_start)?;
    write!(output, "%%EOF")?;

    Ok(output)
}

/// Fresh `/ID` pair for the trailer.
fn file_id() -> Object {
    let id = uuid::Uuid::new_v4();
    let bytes = id.as_bytes().to_vec();
    Object::Array(vec![
        Object::String(bytes.clone()),
        Object::String(bytes),
    ])
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHMMSSZ`).
pub fn pdf_date(dt: &chrono::DateTime<chrono::Utc>) -> String {
    format!("D:{}", dt.format("%Y%m%d%H%M%SZ"))
}
