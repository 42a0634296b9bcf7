pub mod lopdf_backend;

use crate::{error::EngineError, outline::OutlineEntry};
use std::path::Path;

pub use lopdf_backend::LopdfEngine;

/// Opens PDF documents. Page indices at this boundary are 0-based.
pub trait Engine {
    type Doc: PdfDocument;

    fn name(&self) -> &'static str;
    fn open(&self, path: &Path) -> Result<Self::Doc, EngineError>;
}

/// An open document. Dropping it closes it.
pub trait PdfDocument {
    type Part: ExtractedPart;

    fn page_count(&self) -> u32;
    /// Bookmarks in document order with 1-based target pages.
    fn outline(&self) -> Vec<OutlineEntry>;
    /// Copy pages `start0..=end0` into a new, unsaved document.
    fn extract_range(&self, start0: u32, end0: u32) -> Result<Self::Part, EngineError>;
}

pub trait ExtractedPart {
    fn save(self, path: &Path) -> Result<(), EngineError>;
}
