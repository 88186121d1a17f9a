//! Builders for test documents and archives.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::{dictionary, Document, Object, Stream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builds a single-page PDF whose text layer holds the given lines.
pub struct PdfBuilder {
    lines: Vec<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn line(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let content: String = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("BT /F1 12 Tf 50 {} Td ({}) Tj ET\n", 700 - i * 16, line))
            .collect();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("Failed to serialize test PDF");
        bytes
    }
}

/// A nota fiscal carrying the given number.
pub fn invoice_pdf(number: &str) -> Vec<u8> {
    PdfBuilder::new()
        .line("DANFE - Documento Auxiliar")
        .line(&format!("NF {}", number))
        .line("Emissao 12/05/2024")
        .build()
}

/// A PDF with readable text but no recognizable field.
pub fn unrelated_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .line("Meeting notes")
        .line("Nothing to see here")
        .build()
}

/// Builds an in-memory zip archive, as an upload would arrive.
pub struct ZipBuilder {
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn file(mut self, name: &str, content: Vec<u8>) -> Self {
        self.entries.push((name.to_string(), Some(content)));
        self
    }

    pub fn directory(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for (name, content) in self.entries {
            match content {
                Some(bytes) => {
                    writer.start_file(name, options).expect("Failed to start zip entry");
                    writer.write_all(&bytes).expect("Failed to write zip entry");
                }
                None => {
                    writer.add_directory(name, options).expect("Failed to add zip directory");
                }
            }
        }

        writer.finish().expect("Failed to finish zip").into_inner()
    }
}
