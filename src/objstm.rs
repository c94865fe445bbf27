//! Object stream (`/ObjStm`) extraction.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.5.7. An object stream packs `N`
//! non-stream objects into one compressed stream: a header of
//! `obj-number offset` pairs, then the object bodies starting at `/First`.

use crate::error::{Error, Result};
use crate::lexer::{token, Token};
use crate::object::Object;
use crate::parser::parse_object;

/// Extract the object at `index` from decoded object-stream data.
pub fn extract_object(decoded: &[u8], first: usize, n: usize, index: u32) -> Result<(u32, Object)> {
    let index = index as usize;
    if index >= n {
        return Err(Error::InvalidPdf(format!(
            "object stream index {} out of range (N = {})",
            index, n
        )));
    }

    // Walk the header pairs up to the one we need.
    let mut input = decoded;
    let mut pair = (0u32, 0usize);
    for _ in 0..=index {
        let (rest, id) = expect_integer(input)?;
        let (rest, offset) = expect_integer(rest)?;
        input = rest;
        pair = (id as u32, offset as usize);
    }

    let (id, offset) = pair;
    let start = first.checked_add(offset).ok_or(Error::UnexpectedEof)?;
    if start >= decoded.len() {
        return Err(Error::UnexpectedEof);
    }

    let (_, obj) = parse_object(&decoded[start..]).map_err(|_| Error::InvalidPdf(format!(
        "malformed object {} in object stream",
        id
    )))?;
    Ok((id, obj))
}

fn expect_integer(input: &[u8]) -> Result<(&[u8], i64)> {
    match token(input) {
        Ok((rest, Token::Integer(i))) if i >= 0 => Ok((rest, i)),
        _ => Err(Error::InvalidPdf("bad object stream header".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two objects: "1 0" -> 42, "2 3" -> /Name, First = 8.
    const DATA: &[u8] = b"1 0 2 3 42 /Name";

    #[test]
    fn test_extract_first_object() {
        let (id, obj) = extract_object(DATA, 8, 2, 0).unwrap();
        assert_eq!(id, 1);
        assert_eq!(obj, Object::Integer(42));
    }

    #[test]
    fn test_extract_second_object() {
        let (id, obj) = extract_object(DATA, 8, 2, 1).unwrap();
        assert_eq!(id, 2);
        assert_eq!(obj, Object::Name("Name".to_string()));
    }

    #[test]
    fn test_index_out_of_range() {
        assert!(extract_object(DATA, 8, 2, 2).is_err());
    }
}
