//! PDF object serialization.
//!
//! Converts [`Object`] values to their byte representation per
//! ISO 32000-1:2008 Section 7.3. Dictionary keys are written in sorted
//! order so output is deterministic.

use crate::object::{Object, ObjectRef};
use std::collections::HashMap;
use std::io::Write;

/// Serializer for PDF objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a new object serializer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        self.write_object(&mut buf, obj).unwrap();
        buf
    }

    /// Serialize an indirect object definition.
    ///
    /// Format: `{id} {gen} obj\n{object}\nendobj\n`
    pub fn serialize_indirect(&self, id: u32, gen: u16, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        writeln!(buf, "{} {} obj", id, gen).unwrap();
        self.write_object(&mut buf, obj).unwrap();
        write!(buf, "\nendobj\n").unwrap();
        buf
    }

    fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" }),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => write!(w, "{}", format_real(*r)),
            Object::String(s) => self.write_string(w, s),
            Object::Name(n) => self.write_name(w, n),
            Object::Array(arr) => {
                write!(w, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    self.write_object(w, item)?;
                }
                write!(w, "]")
            },
            Object::Dictionary(dict) => self.write_dictionary(w, dict),
            Object::Stream { dict, data } => {
                // /Length always reflects the payload actually written.
                let mut dict = dict.clone();
                dict.insert("Length".to_string(), Object::Integer(data.len() as i64));
                self.write_dictionary(w, &dict)?;
                write!(w, "\nstream\n")?;
                w.write_all(data)?;
                write!(w, "\nendstream")
            },
            Object::Reference(r) => write!(w, "{} {} R", r.id, r.gen),
        }
    }

    fn write_dictionary<W: Write>(
        &self,
        w: &mut W,
        dict: &HashMap<String, Object>,
    ) -> std::io::Result<()> {
        let mut keys: Vec<&String> = dict.keys().collect();
        keys.sort();

        write!(w, "<<")?;
        for key in keys {
            write!(w, " ")?;
            self.write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, &dict[key])?;
        }
        write!(w, " >>")
    }

    /// Literal string with `\`, parens and non-printable bytes escaped.
    fn write_string<W: Write>(&self, w: &mut W, s: &[u8]) -> std::io::Result<()> {
        write!(w, "(")?;
        for &b in s {
            match b {
                b'\\' => write!(w, r"\\")?,
                b'(' => write!(w, r"\(")?,
                b')' => write!(w, r"\)")?,
                b'\n' => write!(w, r"\n")?,
                b'\r' => write!(w, r"\r")?,
                b'\t' => write!(w, r"\t")?,
                0x20..=0x7E => w.write_all(&[b])?,
                other => write!(w, "\\{:03o}", other)?,
            }
        }
        write!(w, ")")
    }

    /// Name with irregular characters escaped as `#xx`.
    fn write_name<W: Write>(&self, w: &mut W, name: &str) -> std::io::Result<()> {
        write!(w, "/")?;
        for &b in name.as_bytes() {
            let irregular = b == b'#'
                || b <= 0x20
                || b >= 0x7F
                || matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%');
            if irregular {
                write!(w, "#{:02X}", b)?;
            } else {
                w.write_all(&[b])?;
            }
        }
        Ok(())
    }

    // Convenience constructors for building object graphs.

    /// Build a dictionary from key/value pairs.
    pub fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// A name object.
    pub fn name(n: &str) -> Object {
        Object::Name(n.to_string())
    }

    /// An integer object.
    pub fn integer(i: i64) -> Object {
        Object::Integer(i)
    }

    /// A real object.
    pub fn real(r: f64) -> Object {
        Object::Real(r)
    }

    /// A string object from text.
    pub fn string(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec())
    }

    /// An indirect reference.
    pub fn reference(id: u32, gen: u16) -> Object {
        Object::Reference(ObjectRef::new(id, gen))
    }

    /// A `[x0 y0 x1 y1]` rectangle array.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Object {
        Object::Array(vec![
            Object::Real(x0),
            Object::Real(y0),
            Object::Real(x1),
            Object::Real(y1),
        ])
    }
}

/// Format a real number without trailing zeros (`72.5`, not `72.500000`).
fn format_real(r: f64) -> String {
    if r == r.trunc() && r.abs() < 1e15 {
        format!("{}", r as i64)
    } else {
        let s = format!("{:.6}", r);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
