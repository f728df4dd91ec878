//! PDF Processor
//!
//! Extracts page text from PDF documents and prepares it for analysis.

use adc_utils::{AdcError, AdcResult};
use std::panic::{self, AssertUnwindSafe};

/// Source of per-page document text.
pub trait TextExtractor: Send + Sync {
    /// One string per page, in document order.
    fn extract_pages(&self, data: &[u8]) -> AdcResult<Vec<String>>;
}

/// pdf-extract backed extractor
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfProcessor {
    fn extract_pages(&self, data: &[u8]) -> AdcResult<Vec<String>> {
        // pdf-extract panics on some malformed input instead of erroring
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));

        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(AdcError::document_processing(format!(
                "PDF extraction failed: {}",
                e
            ))),
            Err(_) => Err(AdcError::document_processing(
                "PDF extraction panicked (malformed document)",
            )),
        }
    }
}

/// Inclusive, 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Pages inside the window; pages past the end of the document are skipped.
    pub fn select<'a>(&self, pages: &'a [String]) -> Vec<&'a str> {
        let start = self.first.saturating_sub(1) as usize;
        let end = (self.last as usize).min(pages.len());
        if start >= end {
            return Vec::new();
        }

        pages[start..end].iter().map(String::as_str).collect()
    }
}

/// Collapse all whitespace (newlines included) to single spaces and keep the
/// first `max_words` words.
pub fn normalize_text(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("page {}", i)).collect()
    }

    #[test]
    fn test_select_middle_window() {
        let pages = pages(6);
        assert_eq!(
            PageRange::new(2, 4).select(&pages),
            vec!["page 2", "page 3", "page 4"]
        );
    }

    #[test]
    fn test_select_clips_to_document_length() {
        let pages = pages(3);
        assert_eq!(PageRange::new(2, 4).select(&pages), vec!["page 2", "page 3"]);
    }

    #[test]
    fn test_select_short_document_is_empty() {
        let pages = pages(1);
        assert!(PageRange::new(2, 4).select(&pages).is_empty());
    }

    #[test]
    fn test_normalize_collapses_spaces_and_newlines() {
        let text = "  Annual   report\n\nfor the\nfiscal  year  ";
        assert_eq!(normalize_text(text, 500), "Annual report for the fiscal year");
    }

    #[test]
    fn test_normalize_limits_words() {
        let text = "one two three four five";
        assert_eq!(normalize_text(text, 3), "one two three");
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let processor = PdfProcessor::new();
        let err = processor.extract_pages(b"definitely not a pdf").unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_PROCESSING_ERROR");
    }
}
