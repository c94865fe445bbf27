//! Programmatic PDF creation.
//!
//! A small fluent builder for producing text documents: one Helvetica
//! font, one content stream per page. It exists for fixtures, demos and
//! the image-conversion path; it is not a general typesetter.

use super::content_stream::ContentStreamBuilder;
use super::object_serializer::ObjectSerializer;
use super::pdf_writer::{assemble_document, pdf_date};
use crate::decoders::flate_encode;
use crate::error::Result;
use crate::object::{Object, ObjectRef};
use std::collections::BTreeMap;

/// US Letter page size in points.
pub const LETTER: (f32, f32) = (612.0, 792.0);

/// Configuration for generated documents.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Document title for the Info dictionary
    pub title: Option<String>,
    /// Document author for the Info dictionary
    pub author: Option<String>,
    /// Creator application name
    pub creator: Option<String>,
    /// Compress content streams with FlateDecode
    pub compress: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            creator: Some("redpen".to_string()),
            compress: false,
        }
    }
}

struct PageData {
    width: f32,
    height: f32,
    content: ContentStreamBuilder,
}

/// Builder for a complete PDF document.
pub struct DocumentBuilder {
    config: BuilderConfig,
    pages: Vec<PageData>,
}

impl DocumentBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Create a builder with explicit configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
        }
    }

    /// Add a page of the given size (points).
    pub fn add_page(&mut self, width: f32, height: f32) -> PageBuilder<'_> {
        self.pages.push(PageData {
            width,
            height,
            content: ContentStreamBuilder::new(),
        });
        let index = self.pages.len() - 1;
        PageBuilder {
            builder: self,
            index,
        }
    }

    /// Add a US Letter page.
    pub fn add_letter_page(&mut self) -> PageBuilder<'_> {
        self.add_page(LETTER.0, LETTER.1)
    }

    /// Build the complete PDF document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut objects: BTreeMap<u32, (u16, Object)> = BTreeMap::new();

        let catalog_id = 1u32;
        let pages_id = 2u32;
        let font_id = 3u32;
        let info_id = 4u32;
        let mut next_id = 5u32;

        objects.insert(
            catalog_id,
            (
                0,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Catalog")),
                    ("Pages", ObjectSerializer::reference(pages_id, 0)),
                ]),
            ),
        );

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

        let mut info_entries = vec![(
            "CreationDate",
            ObjectSerializer::string(&pdf_date(&chrono::Utc::now())),
        )];
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", ObjectSerializer::string(title)));
        }
        if let Some(author) = &self.config.author {
            info_entries.push(("Author", ObjectSerializer::string(author)));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", ObjectSerializer::string(creator)));
        }
        objects.insert(info_id, (0, ObjectSerializer::dict(info_entries)));

        let mut page_refs = Vec::new();
        for page in &self.pages {
            let page_id = next_id;
            let content_id = next_id + 1;
            next_id += 2;

            let raw_content = page.content.build();
            let mut content_dict = std::collections::HashMap::new();
            let content_bytes = if self.config.compress {
                content_dict.insert(
                    "Filter".to_string(),
                    Object::Name("FlateDecode".to_string()),
                );
                flate_encode(&raw_content)
            } else {
                raw_content
            };

            objects.insert(
                page_id,
                (
                    0,
                    ObjectSerializer::dict(vec![
                        ("Type", ObjectSerializer::name("Page")),
                        ("Parent", ObjectSerializer::reference(pages_id, 0)),
                        (
                            "MediaBox",
                            ObjectSerializer::rect(0.0, 0.0, page.width as f64, page.height as f64),
                        ),
                        ("Contents", ObjectSerializer::reference(content_id, 0)),
                        (
                            "Resources",
                            ObjectSerializer::dict(vec![(
                                "Font",
                                ObjectSerializer::dict(vec![(
                                    "F1",
                                    ObjectSerializer::reference(font_id, 0),
                                )]),
                            )]),
                        ),
                    ]),
                ),
            );
            objects.insert(
                content_id,
                (
                    0,
                    Object::Stream {
                        dict: content_dict,
                        data: bytes::Bytes::from(content_bytes),
                    },
                ),
            );
            page_refs.push(ObjectSerializer::reference(page_id, 0));
        }

        objects.insert(
            pages_id,
            (
                0,
                ObjectSerializer::dict(vec![
                    ("Type", ObjectSerializer::name("Pages")),
                    ("Count", ObjectSerializer::integer(self.pages.len() as i64)),
                    ("Kids", Object::Array(page_refs)),
                ]),
            ),
        );

        assemble_document(
            (1, 7),
            &objects,
            ObjectRef::new(catalog_id, 0),
            Some(ObjectRef::new(info_id, 0)),
        )
    }

    /// Build and write the document to a file.
    pub fn save(self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one page's content.
pub struct PageBuilder<'a> {
    builder: &'a mut DocumentBuilder,
    index: usize,
}

impl<'a> PageBuilder<'a> {
    /// Place a line of Helvetica text with its baseline at `(x, y)` in
    /// PDF coordinates (origin bottom-left).
    pub fn text(&mut self, x: f32, y: f32, size: f32, text: &str) -> &mut Self {
        let content = &mut self.builder.pages[self.index].content;
        content
            .begin_text()
            .set_font("F1", size)
            .move_text(x, y)
            .show_text(text)
            .end_text();
        self
    }

    /// Finish the page and return the document builder.
    pub fn finish(self) -> &'a mut DocumentBuilder {
        self.builder
    }
}
