use crate::{
    config::Config,
    engine::{Engine, PdfDocument},
    outline::OutlineEntry,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only snapshot of a loaded source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub path: String,
    pub file_bytes: u64,
    pub page_count: u32,
    pub outline: Vec<OutlineEntry>,
}

pub fn summarize<E: Engine>(cfg: &Config, engine: &E, input: &Path) -> Result<DocumentSummary> {
    let meta = std::fs::metadata(input).with_context(|| "stat input")?;
    let file_bytes = meta.len();
    if file_bytes > cfg.limits.max_input_file_bytes {
        anyhow::bail!("input exceeds max_input_file_bytes: {}", file_bytes);
    }

    let doc = engine
        .open(input)
        .with_context(|| format!("{} engine could not open the input", engine.name()))?;
    let page_count = doc.page_count();

    if page_count > cfg.limits.max_input_pages {
        anyhow::bail!("input exceeds max_input_pages: {}", page_count);
    }
    if page_count == 0 {
        anyhow::bail!("input has zero pages");
    }

    Ok(DocumentSummary {
        path: input.display().to_string(),
        file_bytes,
        page_count,
        outline: doc.outline(),
    })
}
