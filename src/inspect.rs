//! Read-only inspection of rendered PDFs with `lopdf`.

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::LetterError;

/// What a rendered letter looks like from the outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfSummary {
    /// Number of pages in the page tree.
    pub pages: usize,
    /// The `/Title` entry of the document information dictionary.
    pub title: Option<String>,
}

/// Counts the pages of the PDF in `bytes`.
pub fn page_count(bytes: &[u8]) -> Result<usize, LetterError> {
    let document = Document::load_mem(bytes)?;
    Ok(document.get_pages().len())
}

/// Summarizes the PDF in `bytes`.
pub fn summarize(bytes: &[u8]) -> Result<PdfSummary, LetterError> {
    let document = Document::load_mem(bytes)?;
    Ok(PdfSummary {
        pages: document.get_pages().len(),
        title: document_title(&document),
    })
}

/// Summarizes the PDF file at `path`.
pub fn summarize_file(path: impl AsRef<Path>) -> Result<PdfSummary, LetterError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| LetterError::io(path, err))?;
    summarize(&bytes)
}

fn document_title(document: &Document) -> Option<String> {
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let title = info.get(b"Title").ok()?.as_str().ok()?;
    Some(decode_text_string(title))
}

/// Decodes a PDF text string, which is either UTF-16BE with a byte order mark
/// or a single-byte encoding.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn one_page_pdf(title: Object) -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = document.add_object(dictionary! { "Title" => title });
        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).expect("save pdf");
        bytes
    }

    #[test]
    fn counts_pages_and_reads_title() {
        let bytes = one_page_pdf(Object::string_literal("Proposal"));
        assert_eq!(page_count(&bytes).expect("count pages"), 1);
        let summary = summarize(&bytes).expect("summarize");
        assert_eq!(summary.title.as_deref(), Some("Proposal"));
    }

    #[test]
    fn decodes_utf16_titles() {
        let mut title = vec![0xFE, 0xFF];
        for unit in "Accra".encode_utf16() {
            title.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_string(&title), "Accra");
    }

    #[test]
    fn garbage_is_an_inspect_error() {
        let err = page_count(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, LetterError::Inspect(_)));
    }
}
