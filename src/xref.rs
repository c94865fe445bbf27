//! Cross-reference table parsing.
//!
//! Supports classic `xref` tables (ISO 32000-1:2008 Section 7.5.4),
//! cross-reference streams (Section 7.5.8) and hybrid-reference files
//! (`/XRefStm`). `/Prev` chains are walked newest-first; entries already
//! seen win, so updated objects shadow their older revisions.

use crate::error::{Error, Result};
use crate::lexer::{token, Token};
use crate::object::Object;
use crate::parser::{find_keyword, parse_indirect_object_at, parse_object_at};
use byteorder::{BigEndian, ByteOrder};
use std::collections::{HashMap, HashSet};

/// One cross-reference entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    /// Regular object at a byte offset
    Offset {
        /// Byte offset from the start of the file
        offset: u64,
        /// Generation number
        gen: u16,
    },
    /// Object stored inside an object stream
    InStream {
        /// Object number of the containing `/ObjStm`
        stream_id: u32,
        /// Index within the stream
        index: u32,
    },
    /// Free entry
    Free,
}

/// The merged cross-reference table for a document.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XrefEntry>,
    trailer: HashMap<String, Object>,
}

impl CrossRefTable {
    /// Look up the entry for an object number.
    pub fn get(&self, id: u32) -> Option<&XrefEntry> {
        self.entries.get(&id)
    }

    /// Number of entries (including free ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries were parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The trailer dictionary of the newest xref section.
    pub fn trailer(&self) -> &HashMap<String, Object> {
        &self.trailer
    }

    /// Iterate over `(object number, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &XrefEntry)> {
        self.entries.iter()
    }

    /// Highest known object number.
    pub fn max_id(&self) -> u32 {
        self.entries.keys().copied().max().unwrap_or(0)
    }

    fn insert_if_absent(&mut self, id: u32, entry: XrefEntry) {
        self.entries.entry(id).or_insert(entry);
    }
}

/// Locate the `startxref` offset near the end of the file.
pub fn find_startxref(data: &[u8]) -> Result<u64> {
    let window_start = data.len().saturating_sub(2048);
    let tail = &data[window_start..];
    let pos = find_last_keyword(tail, b"startxref").ok_or(Error::InvalidXref)?;

    let after = &tail[pos + b"startxref".len()..];
    match token(after) {
        Ok((_, Token::Integer(offset))) if offset >= 0 => Ok(offset as u64),
        _ => Err(Error::InvalidXref),
    }
}

fn find_last_keyword(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Parse the complete cross-reference information for `data`.
pub fn parse_xref(data: &[u8]) -> Result<CrossRefTable> {
    let start = find_startxref(data)?;
    let mut table = CrossRefTable::default();
    let mut next = Some(start);
    let mut visited = HashSet::new();

    while let Some(offset) = next {
        if !visited.insert(offset) {
            log::warn!("circular /Prev chain at offset {}", offset);
            break;
        }
        next = parse_section(data, offset, &mut table)?;
    }

    if table.is_empty() {
        return Err(Error::InvalidXref);
    }
    Ok(table)
}

/// Parse one xref section (classic or stream); returns the `/Prev` offset.
fn parse_section(data: &[u8], offset: u64, table: &mut CrossRefTable) -> Result<Option<u64>> {
    let offset = usize::try_from(offset).map_err(|_| Error::InvalidXref)?;
    if offset >= data.len() {
        return Err(Error::InvalidXref);
    }

    let at = crate::lexer::skip_whitespace(&data[offset..]);
    if at.starts_with(b"xref") {
        parse_classic_section(data, offset, table)
    } else {
        parse_stream_section(data, offset, table)
    }
}

/// Classic `xref` table: subsections of 20-byte entries, then `trailer`.
fn parse_classic_section(
    data: &[u8],
    offset: usize,
    table: &mut CrossRefTable,
) -> Result<Option<u64>> {
    let section = &data[offset..];
    let mut input = crate::lexer::skip_whitespace(&section[b"xref".len()..]);

    loop {
        match token(input) {
            Ok((rest, Token::Keyword(b"trailer"))) => {
                input = rest;
                break;
            },
            Ok((rest, Token::Integer(start))) => {
                let (rest, count) = match token(rest) {
                    Ok((r, Token::Integer(c))) if c >= 0 => (r, c as u64),
                    _ => return Err(Error::InvalidXref),
                };
                if start < 0 {
                    return Err(Error::InvalidXref);
                }
                input = rest;
                for i in 0..count {
                    let (rest, field1) = expect_integer(input)?;
                    let (rest, field2) = expect_integer(rest)?;
                    let (rest, kind) = match token(rest) {
                        Ok((r, Token::Keyword(k))) => (r, k),
                        _ => return Err(Error::InvalidXref),
                    };
                    input = rest;

                    let id = start as u32 + i as u32;
                    let entry = match kind {
                        b"n" => XrefEntry::Offset {
                            offset: field1 as u64,
                            gen: field2 as u16,
                        },
                        b"f" => XrefEntry::Free,
                        _ => return Err(Error::InvalidXref),
                    };
                    table.insert_if_absent(id, entry);
                }
            },
            _ => return Err(Error::InvalidXref),
        }
    }

    // Trailer dictionary follows the keyword.
    let trailer_offset = data.len() - input.len();
    let (_, trailer_obj) = parse_object_at(data, trailer_offset)?;
    let trailer = match trailer_obj {
        Object::Dictionary(d) => d,
        _ => return Err(Error::InvalidXref),
    };

    // Hybrid-reference file: a parallel xref stream holds more entries.
    if let Some(xrefstm) = trailer.get("XRefStm").and_then(|o| o.as_integer()) {
        if xrefstm >= 0 {
            if let Err(e) = parse_stream_section(data, xrefstm as usize, table) {
                log::warn!("ignoring unreadable /XRefStm section: {}", e);
            }
        }
    }

    let prev = trailer.get("Prev").and_then(|o| o.as_integer());
    if table.trailer.is_empty() {
        table.trailer = trailer;
    }
    Ok(prev.and_then(|p| u64::try_from(p).ok()))
}

fn expect_integer(input: &[u8]) -> Result<(&[u8], i64)> {
    match token(input) {
        Ok((rest, Token::Integer(i))) if i >= 0 => Ok((rest, i)),
        _ => Err(Error::InvalidXref),
    }
}

/// Cross-reference stream: binary entries described by `/W`, `/Index`.
fn parse_stream_section(
    data: &[u8],
    offset: usize,
    table: &mut CrossRefTable,
) -> Result<Option<u64>> {
    let (_, obj) = parse_indirect_object_at(data, offset)?;
    let dict = match obj.as_dict() {
        Some(d) => d.clone(),
        None => return Err(Error::InvalidXref),
    };
    let decoded = obj.decode_stream_data()?;

    let widths: Vec<usize> = dict
        .get("W")
        .and_then(|o| o.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|o| o.as_integer())
                .map(|i| i.max(0) as usize)
                .collect()
        })
        .ok_or(Error::InvalidXref)?;
    if widths.len() < 3 || widths.iter().any(|&w| w > 8) {
        return Err(Error::InvalidXref);
    }
    let row_len: usize = widths.iter().sum();
    if row_len == 0 {
        return Err(Error::InvalidXref);
    }

    let size = dict
        .get("Size")
        .and_then(|o| o.as_integer())
        .ok_or(Error::InvalidXref)?;

    // /Index defaults to [0 Size].
    let index: Vec<i64> = dict
        .get("Index")
        .and_then(|o| o.as_array())
        .map(|arr| arr.iter().filter_map(|o| o.as_integer()).collect())
        .unwrap_or_else(|| vec![0, size]);

    let mut row = 0usize;
    for pair in index.chunks(2) {
        let [start, count] = pair else {
            return Err(Error::InvalidXref);
        };
        for i in 0..*count {
            let begin = row * row_len;
            if begin + row_len > decoded.len() {
                return Err(Error::InvalidXref);
            }
            let mut fields = [1u64, 0, 0]; // field 1 defaults to type 1
            let mut cursor = begin;
            for (slot, &w) in fields.iter_mut().zip(widths.iter()) {
                if w > 0 {
                    *slot = BigEndian::read_uint(&decoded[cursor..cursor + w], w);
                    cursor += w;
                }
            }
            row += 1;

            let id = (*start + i) as u32;
            let entry = match fields[0] {
                0 => XrefEntry::Free,
                1 => XrefEntry::Offset {
                    offset: fields[1],
                    gen: fields[2] as u16,
                },
                2 => XrefEntry::InStream {
                    stream_id: fields[1] as u32,
                    index: fields[2] as u32,
                },
                other => {
                    log::debug!("unknown xref entry type {} for object {}", other, id);
                    continue;
                },
            };
            table.insert_if_absent(id, entry);
        }
    }

    let prev = dict.get("Prev").and_then(|o| o.as_integer());
    if table.trailer.is_empty() {
        table.trailer = dict;
    }
    Ok(prev.and_then(|p| u64::try_from(p).ok()))
}

/// Scan the whole file for `n g obj` headers when the xref is unusable.
///
/// Last definition of each object number wins, approximating the effect
/// of incremental updates.
pub fn reconstruct_xref(data: &[u8]) -> Result<CrossRefTable> {
    let mut table = CrossRefTable::default();
    let mut pos = 0usize;

    while let Some(found) = find_keyword(&data[pos..], b" obj") {
        let obj_kw = pos + found + 1; // points at "obj"
        // Walk back over "gen" and "id" numbers.
        if let Some((id, gen, start)) = backtrack_object_header(data, obj_kw) {
            table.entries.insert(
                id,
                XrefEntry::Offset {
                    offset: start as u64,
                    gen,
                },
            );
        }
        pos = obj_kw + 3;
    }

    // Find a trailer dictionary for /Root.
    if let Some(tpos) = find_last_keyword(data, b"trailer") {
        if let Ok((_, Object::Dictionary(d))) = parse_object_at(data, tpos + b"trailer".len()) {
            table.trailer = d;
        }
    }

    if table.is_empty() {
        return Err(Error::InvalidXref);
    }
    log::info!("reconstructed xref with {} entries", table.len());
    Ok(table)
}

/// Given the position of `obj`, walk backwards over `id gen`.
fn backtrack_object_header(data: &[u8], obj_pos: usize) -> Option<(u32, u16, usize)> {
    let mut i = obj_pos;
    // Skip whitespace before "obj".
    while i > 0 && data[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    let gen_end = i;
    while i > 0 && data[i - 1].is_ascii_digit() {
        i -= 1;
    }
    let gen: u16 = std::str::from_utf8(&data[i..gen_end]).ok()?.parse().ok()?;
    while i > 0 && data[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    let id_end = i;
    while i > 0 && data[i - 1].is_ascii_digit() {
        i -= 1;
    }
    if i == id_end {
        return None;
    }
    let id: u32 = std::str::from_utf8(&data[i..id_end]).ok()?.parse().ok()?;
    Some((id, gen, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &[u8] = b"xref\n0 3\n0000000000 65535 f \n0000000015 00000 n \n0000000100 00000 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\nstartxref\n0\n%%EOF";

    #[test]
    fn test_parse_classic_table() {
        let mut table = CrossRefTable::default();
        let prev = parse_classic_section(CLASSIC, 0, &mut table).unwrap();
        assert!(prev.is_none());
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some(&XrefEntry::Free));
        assert_eq!(
            table.get(1),
            Some(&XrefEntry::Offset { offset: 15, gen: 0 })
        );
        assert_eq!(table.trailer().get("Size").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn test_find_startxref() {
        assert_eq!(find_startxref(CLASSIC).unwrap(), 0);
    }

    #[test]
    fn test_parse_xref_via_startxref() {
        let table = parse_xref(CLASSIC).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_newest_entry_wins() {
        let mut table = CrossRefTable::default();
        table.insert_if_absent(4, XrefEntry::Offset { offset: 10, gen: 0 });
        table.insert_if_absent(4, XrefEntry::Offset { offset: 99, gen: 0 });
        assert_eq!(
            table.get(4),
            Some(&XrefEntry::Offset { offset: 10, gen: 0 })
        );
    }

    #[test]
    fn test_reconstruct_from_object_headers() {
        let data = b"%PDF-1.4\n1 0 obj << >> endobj\n2 0 obj << >> endobj\ntrailer << /Size 3 >>";
        let table = reconstruct_xref(data).unwrap();
        assert!(matches!(table.get(1), Some(XrefEntry::Offset { .. })));
        assert!(matches!(table.get(2), Some(XrefEntry::Offset { .. })));
    }

    #[test]
    fn test_missing_startxref_fails() {
        assert!(find_startxref(b"no marker here").is_err());
    }
}
