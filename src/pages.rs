//! Page text sources.
//!
//! The parser works on one string per physical page. Reports normally arrive
//! as PDFs; already decoded reports can be fed in as text files with a form
//! feed between pages.

use crate::constants::PAGE_BREAK;
use crate::error::{PileError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supplies decoded page text and page counts for report files
pub trait PageSource {
    /// Decoded text of every page, in page order
    fn pages(&self, path: &Path) -> Result<Vec<String>>;

    /// Number of physical pages
    fn page_count(&self, path: &Path) -> Result<usize>;

    /// File extension handled by this source
    fn extension(&self) -> &'static str;
}

/// PDF reports decoded with `pdf-extract`, pages counted with `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageSource;

impl PageSource for PdfPageSource {
    fn pages(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = fs::read(path)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            PileError::Pdf {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        debug!("Decoded {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }

    fn page_count(&self, path: &Path) -> Result<usize> {
        let document = lopdf::Document::load(path).map_err(|e| PileError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(document.get_pages().len())
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Pre-decoded reports: UTF-8 text with a form feed between pages
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPageSource;

impl TextPageSource {
    /// Split text at form feeds, ignoring the empty page after a final break
    pub fn split_pages(text: &str) -> Vec<String> {
        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|page| page.trim().is_empty()) {
            pages.pop();
        }
        pages
    }
}

impl PageSource for TextPageSource {
    fn pages(&self, path: &Path) -> Result<Vec<String>> {
        let text = fs::read_to_string(path)?;
        Ok(Self::split_pages(&text))
    }

    fn page_count(&self, path: &Path) -> Result<usize> {
        Ok(self.pages(path)?.len())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}
