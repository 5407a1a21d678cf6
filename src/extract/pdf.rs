//! PDF-to-text via lopdf.
//!
//! Pages are read in page-number order and concatenated as-is. A page
//! that cannot be decoded stops extraction; the text read so far is kept.

use lopdf::Document;
use std::time::Instant;

use super::ExtractError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfText {
    /// Text of each successfully read page, in page order.
    pub pages: Vec<String>,
    /// Page number (1-based) at which extraction stopped, if it did.
    pub failed_page: Option<u32>,
}

impl PdfText {
    pub fn text(&self) -> String {
        self.pages.concat()
    }
}

/// Extract the text of an in-memory PDF.
///
/// lopdf reports most damaged pages (missing or non-stream `Contents`) as
/// empty text rather than an error, so `failed_page` is rare in practice.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<PdfText, ExtractError> {
    let start = Instant::now();
    let document =
        Document::load_mem(pdf_bytes).map_err(|e| ExtractError::PdfParse(e.to_string()))?;

    let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
    log::info!("[PDF] Opened document with {} pages", page_numbers.len());

    let mut result = PdfText::default();
    for number in page_numbers {
        match document.extract_text(&[number]) {
            Ok(text) => result.pages.push(text),
            Err(e) => {
                log::warn!("[PDF] Page {} unreadable, stopping: {}", number, e);
                result.failed_page = Some(number);
                break;
            }
        }
    }

    log::info!(
        "[PDF] Extracted {} pages in {}ms",
        result.pages.len(),
        start.elapsed().as_millis()
    );
    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::fixtures::pdf_with_pages;
    use super::*;

    #[test]
    fn pages_concatenate_in_order() {
        let bytes = pdf_with_pages(&["Alpha page", "Bravo page", "Charlie page"]);
        let extracted = extract_pdf_text(&bytes).unwrap();
        assert_eq!(extracted.failed_page, None);
        assert_eq!(extracted.pages.len(), 3);

        let doc = Document::load_mem(&bytes).unwrap();
        let expected: String = (1..=3u32)
            .map(|n| doc.extract_text(&[n]).unwrap())
            .collect();
        let text = extracted.text();
        assert_eq!(text, expected);

        let a = text.find("Alpha").unwrap();
        let b = text.find("Bravo").unwrap();
        let c = text.find("Charlie").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = extract_pdf_text(b"%PDF-1.4 this is not really a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::PdfParse(_)));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(extract_pdf_text(&[]).is_err());
    }
}
