//! PDF document loading and page access.
//!
//! [`PdfDocument`] owns the raw file bytes plus the parsed cross-reference
//! table, loads objects on demand (with a cache), and exposes the page
//! tree with inherited attributes resolved. It is strictly one document
//! per handle; handles are not meant to be shared across threads while a
//! highlight pass runs.

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::parser::parse_indirect_object_at;
use crate::xref::{self, CrossRefTable, XrefEntry};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Fallback page size (US Letter) when no `/MediaBox` is present.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum reference-chain / page-tree depth before giving up.
const MAX_DEPTH: usize = 32;

/// A parsed PDF document.
pub struct PdfDocument {
    data: Vec<u8>,
    version: (u8, u8),
    xref: CrossRefTable,
    trailer: HashMap<String, Object>,
    cache: HashMap<u32, Object>,
    page_refs: Option<Vec<ObjectRef>>,
}

impl PdfDocument {
    /// Parse a document from an in-memory byte stream.
    ///
    /// Falls back to scanning for object headers when the xref table is
    /// missing or damaged. Encrypted documents are rejected.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let version = parse_header(&data)?;

        let xref = match xref::parse_xref(&data) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("xref parsing failed ({}), attempting reconstruction", e);
                xref::reconstruct_xref(&data)?
            },
        };

        let trailer = xref.trailer().clone();
        if trailer.contains_key("Encrypt") {
            return Err(Error::Unsupported("encrypted document".to_string()));
        }

        Ok(Self {
            data,
            version,
            xref,
            trailer,
            cache: HashMap::new(),
            page_refs: None,
        })
    }

    /// Open a document from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// The PDF version from the header.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// The trailer dictionary.
    pub fn trailer(&self) -> &HashMap<String, Object> {
        &self.trailer
    }

    /// The raw file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Load an indirect object, consulting the cache first.
    pub fn load_object(&mut self, obj_ref: ObjectRef) -> Result<Object> {
        if let Some(cached) = self.cache.get(&obj_ref.id) {
            return Ok(cached.clone());
        }

        let entry = *self
            .xref
            .get(obj_ref.id)
            .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))?;

        let obj = match entry {
            XrefEntry::Offset { offset, .. } => {
                let (parsed_ref, obj) = parse_indirect_object_at(&self.data, offset as usize)?;
                if parsed_ref.id != obj_ref.id {
                    log::debug!(
                        "xref points object {} at an object labelled {}",
                        obj_ref.id,
                        parsed_ref.id
                    );
                }
                obj
            },
            XrefEntry::InStream { stream_id, index } => {
                self.load_from_object_stream(stream_id, index)?
            },
            XrefEntry::Free => Object::Null,
        };

        self.cache.insert(obj_ref.id, obj.clone());
        Ok(obj)
    }

    fn load_from_object_stream(&mut self, stream_id: u32, index: u32) -> Result<Object> {
        // The container itself must be a regular object, or lookup recurses.
        match self.xref.get(stream_id) {
            Some(XrefEntry::Offset { .. }) => {},
            _ => {
                return Err(Error::InvalidPdf(format!(
                    "object stream {} has no direct offset",
                    stream_id
                )));
            },
        }
        let container = self.load_object(ObjectRef::new(stream_id, 0))?;
        let dict = container
            .as_dict()
            .ok_or_else(|| Error::InvalidPdf("object stream is not a stream".to_string()))?;

        let first = dict
            .get("First")
            .and_then(|o| o.as_integer())
            .ok_or_else(|| Error::InvalidPdf("object stream missing /First".to_string()))?;
        let n = dict
            .get("N")
            .and_then(|o| o.as_integer())
            .ok_or_else(|| Error::InvalidPdf("object stream missing /N".to_string()))?;

        let decoded = container.decode_stream_data()?;
        let (_, obj) = crate::objstm::extract_object(&decoded, first as usize, n as usize, index)?;
        Ok(obj)
    }

    /// Resolve reference chains down to a direct object.
    pub fn resolve(&mut self, obj: &Object) -> Result<Object> {
        let mut current = obj.clone();
        for _ in 0..MAX_DEPTH {
            match current {
                Object::Reference(r) => current = self.load_object(r)?,
                other => return Ok(other),
            }
        }
        Err(Error::InvalidPdf("reference chain too deep".to_string()))
    }

    /// Fetch `key` from a dictionary and resolve it.
    fn dict_get(&mut self, dict: &HashMap<String, Object>, key: &str) -> Result<Option<Object>> {
        match dict.get(key) {
            Some(value) => Ok(Some(self.resolve(value)?)),
            None => Ok(None),
        }
    }

    /// The document catalog.
    pub fn catalog(&mut self) -> Result<HashMap<String, Object>> {
        let root = self
            .trailer
            .get("Root")
            .cloned()
            .ok_or_else(|| Error::InvalidPdf("trailer has no /Root".to_string()))?;
        match self.resolve(&root)? {
            Object::Dictionary(d) => Ok(d),
            other => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Object references of all pages, in document order.
    pub fn page_refs(&mut self) -> Result<Vec<ObjectRef>> {
        if let Some(refs) = &self.page_refs {
            return Ok(refs.clone());
        }

        let catalog = self.catalog()?;
        let pages_ref = catalog
            .get("Pages")
            .and_then(|o| o.as_reference())
            .ok_or_else(|| Error::InvalidPdf("catalog has no /Pages".to_string()))?;

        let mut refs = Vec::new();
        let mut visited = HashSet::new();
        self.walk_page_tree(pages_ref, &mut refs, &mut visited, 0)?;

        self.page_refs = Some(refs.clone());
        Ok(refs)
    }

    fn walk_page_tree(
        &mut self,
        node_ref: ObjectRef,
        out: &mut Vec<ObjectRef>,
        visited: &mut HashSet<u32>,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::InvalidPdf("page tree too deep".to_string()));
        }
        if !visited.insert(node_ref.id) {
            return Err(Error::InvalidPdf("cycle in page tree".to_string()));
        }

        let node = self.load_object(node_ref)?;
        let dict = node
            .as_dict()
            .ok_or_else(|| Error::InvalidPdf("page tree node is not a dictionary".to_string()))?
            .clone();

        let node_type = dict.get("Type").and_then(|o| o.as_name());
        match node_type {
            Some("Page") => out.push(node_ref),
            _ => {
                // /Pages node (or missing /Type: infer from /Kids).
                let kids = match self.dict_get(&dict, "Kids")? {
                    Some(Object::Array(kids)) => kids,
                    _ if node_type.is_none() => {
                        // Leaf without /Type: treat as a page.
                        out.push(node_ref);
                        return Ok(());
                    },
                    _ => Vec::new(),
                };
                for kid in kids {
                    if let Some(kid_ref) = kid.as_reference() {
                        self.walk_page_tree(kid_ref, out, visited, depth + 1)?;
                    }
                }
            },
        }
        Ok(())
    }

    /// Number of pages in the document.
    pub fn page_count(&mut self) -> Result<usize> {
        Ok(self.page_refs()?.len())
    }

    /// The dictionary of the page at `index` (0-indexed).
    pub fn page_dict(&mut self, index: usize) -> Result<HashMap<String, Object>> {
        let refs = self.page_refs()?;
        let page_ref = *refs.get(index).ok_or(Error::PageOutOfBounds {
            page: index,
            count: refs.len(),
        })?;
        match self.load_object(page_ref)? {
            Object::Dictionary(d) => Ok(d),
            other => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Look up a page attribute, walking `/Parent` links for inherited
    /// values (ISO 32000-1:2008, Section 7.7.3.4).
    fn inherited_attr(&mut self, index: usize, key: &str) -> Result<Option<Object>> {
        let mut dict = self.page_dict(index)?;
        for _ in 0..MAX_DEPTH {
            if let Some(value) = self.dict_get(&dict, key)? {
                return Ok(Some(value));
            }
            match dict.get("Parent").and_then(|o| o.as_reference()) {
                Some(parent) => {
                    dict = match self.load_object(parent)? {
                        Object::Dictionary(d) => d,
                        _ => return Ok(None),
                    };
                },
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    /// The page's media box as `[x0, y0, x1, y1]`, defaulting to US Letter.
    pub fn page_media_box(&mut self, index: usize) -> Result<[f32; 4]> {
        let media_box = match self.inherited_attr(index, "MediaBox")? {
            Some(Object::Array(arr)) => {
                let values: Vec<f32> = arr
                    .iter()
                    .filter_map(|o| o.as_number())
                    .map(|n| n as f32)
                    .collect();
                if values.len() == 4 {
                    [values[0], values[1], values[2], values[3]]
                } else {
                    DEFAULT_MEDIA_BOX
                }
            },
            _ => DEFAULT_MEDIA_BOX,
        };
        Ok(media_box)
    }

    /// The page's effective `/Resources` dictionary (inherited, resolved;
    /// empty when absent).
    pub fn page_resources(&mut self, index: usize) -> Result<HashMap<String, Object>> {
        match self.inherited_attr(index, "Resources")? {
            Some(Object::Dictionary(d)) => Ok(d),
            _ => Ok(HashMap::new()),
        }
    }

    /// Decoded content of the page at `index`, with multiple streams
    /// concatenated in order.
    pub fn page_content(&mut self, index: usize) -> Result<Vec<u8>> {
        let dict = self.page_dict(index)?;
        let contents = match self.dict_get(&dict, "Contents")? {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };

        let mut out = Vec::new();
        match contents {
            Object::Stream { .. } => {
                out = contents.decode_stream_data()?;
            },
            Object::Array(parts) => {
                for part in parts {
                    let stream = self.resolve(&part)?;
                    if let Object::Stream { .. } = stream {
                        if !out.is_empty() {
                            out.push(b'\n');
                        }
                        out.extend_from_slice(&stream.decode_stream_data()?);
                    }
                }
            },
            _ => {},
        }
        Ok(out)
    }

    /// Highest object number known to the xref table.
    pub fn max_object_id(&self) -> u32 {
        self.xref.max_id()
    }

    /// Load every regular object for a full rewrite.
    ///
    /// Objects that only exist as packaging (`/ObjStm` containers and
    /// `/XRef` streams) are skipped; their contents are re-emitted as
    /// regular objects by the writer.
    pub fn collect_objects(&mut self) -> Result<BTreeMap<u32, (u16, Object)>> {
        let entries: Vec<(u32, XrefEntry)> =
            self.xref.iter().map(|(id, e)| (*id, *e)).collect();

        let mut objects = BTreeMap::new();
        for (id, entry) in entries {
            let gen = match entry {
                XrefEntry::Free => continue,
                XrefEntry::Offset { gen, .. } => gen,
                XrefEntry::InStream { .. } => 0,
            };

            let obj = match self.load_object(ObjectRef::new(id, gen)) {
                Ok(obj) => obj,
                Err(e) => {
                    log::warn!("skipping unreadable object {}: {}", id, e);
                    continue;
                },
            };

            if let Some(type_name) = obj.as_dict().and_then(|d| d.get("Type")).and_then(|o| o.as_name())
            {
                if type_name == "ObjStm" || type_name == "XRef" {
                    continue;
                }
            }
            objects.insert(id, (gen, obj));
        }
        Ok(objects)
    }
}

/// Parse the `%PDF-M.m` header, tolerating a small amount of leading junk.
pub fn parse_header(data: &[u8]) -> Result<(u8, u8)> {
    let window = &data[..data.len().min(1024)];
    let pos = crate::parser::find_keyword(window, b"%PDF-").ok_or_else(|| {
        let prefix = String::from_utf8_lossy(&data[..data.len().min(8)]).to_string();
        Error::InvalidHeader(prefix)
    })?;

    let rest = &window[pos + b"%PDF-".len()..];
    let major = rest
        .first()
        .filter(|b| b.is_ascii_digit())
        .map(|b| b - b'0');
    let minor = rest
        .get(2)
        .filter(|b| b.is_ascii_digit())
        .map(|b| b - b'0');

    match (major, rest.get(1), minor) {
        (Some(major), Some(b'.'), Some(minor)) => Ok((major, minor)),
        _ => Err(Error::InvalidHeader(
            String::from_utf8_lossy(&rest[..rest.len().min(8)]).to_string(),
        )),
    }
}
