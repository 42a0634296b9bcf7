use super::{Engine, ExtractedPart, PdfDocument};
use crate::{error::EngineError, outline::OutlineEntry};
use lopdf::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pure-Rust engine on top of `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfEngine;

pub struct LopdfDocument {
    path: PathBuf,
    doc: Document,
    page_count: u32,
}

pub struct LopdfPart {
    doc: Document,
}

impl Engine for LopdfEngine {
    type Doc = LopdfDocument;

    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn open(&self, path: &Path) -> Result<LopdfDocument, EngineError> {
        debug!("lopdf open {}", path.display());
        let doc = Document::load(path).map_err(|e| EngineError::new("open", path, e))?;
        let page_count = doc.get_pages().len() as u32;
        Ok(LopdfDocument {
            path: path.to_path_buf(),
            doc,
            page_count,
        })
    }
}

impl PdfDocument for LopdfDocument {
    type Part = LopdfPart;

    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn outline(&self) -> Vec<OutlineEntry> {
        let toc = match self.doc.get_toc() {
            Ok(toc) => toc,
            Err(err) => {
                debug!("no outline in {}: {err}", self.path.display());
                return Vec::new();
            }
        };
        if !toc.errors.is_empty() {
            warn!(
                "{} outline entries could not be resolved in {}",
                toc.errors.len(),
                self.path.display()
            );
        }
        toc.toc
            .into_iter()
            .map(|t| OutlineEntry {
                level: t.level as u32,
                title: t.title,
                target_page: t.page as u32,
            })
            .collect()
    }

    fn extract_range(&self, start0: u32, end0: u32) -> Result<LopdfPart, EngineError> {
        if start0 > end0 || end0 >= self.page_count {
            return Err(EngineError::new(
                "extract",
                &self.path,
                format!(
                    "page range {}-{} is outside the document's {} pages",
                    start0 + 1,
                    end0 + 1,
                    self.page_count
                ),
            ));
        }

        let mut part = self.doc.clone();
        let doomed: Vec<u32> = (1..=self.page_count)
            .filter(|p| *p < start0 + 1 || *p > end0 + 1)
            .collect();
        part.delete_pages(&doomed);
        part.prune_objects();
        part.compress();

        Ok(LopdfPart { doc: part })
    }
}

impl ExtractedPart for LopdfPart {
    fn save(mut self, path: &Path) -> Result<(), EngineError> {
        self.doc
            .save(path)
            .map(|_| ())
            .map_err(|e| EngineError::new("save", path, e))
    }
}
