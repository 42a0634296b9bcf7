#![allow(dead_code)]

use pdf_splitter::{
    engine::{Engine, ExtractedPart, PdfDocument},
    error::EngineError,
    outline::OutlineEntry,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Engine that never parses anything: every source has `pages` pages and
/// extracted parts are written as a one-line text file.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    pub pages: u32,
    pub outline: Vec<OutlineEntry>,
    /// 0-based start page whose extraction fails.
    pub fail_at_start: Option<u32>,
}

pub struct FakeDoc {
    path: PathBuf,
    engine: FakeEngine,
    pub extracted: RefCell<Vec<(u32, u32)>>,
}

pub struct FakePart(String);

impl Engine for FakeEngine {
    type Doc = FakeDoc;

    fn name(&self) -> &'static str {
        "fake"
    }

    fn open(&self, path: &Path) -> Result<FakeDoc, EngineError> {
        if !path.exists() {
            return Err(EngineError::new("open", path, "no such file"));
        }
        Ok(FakeDoc {
            path: path.to_path_buf(),
            engine: self.clone(),
            extracted: RefCell::new(Vec::new()),
        })
    }
}

impl PdfDocument for FakeDoc {
    type Part = FakePart;

    fn page_count(&self) -> u32 {
        self.engine.pages
    }

    fn outline(&self) -> Vec<OutlineEntry> {
        self.engine.outline.clone()
    }

    fn extract_range(&self, start0: u32, end0: u32) -> Result<FakePart, EngineError> {
        if self.engine.fail_at_start == Some(start0) {
            return Err(EngineError::new("extract", &self.path, "corrupt page tree"));
        }
        self.extracted.borrow_mut().push((start0, end0));
        Ok(FakePart(format!("pages {start0}-{end0}")))
    }
}

impl ExtractedPart for FakePart {
    fn save(self, path: &Path) -> Result<(), EngineError> {
        std::fs::write(path, self.0).map_err(|e| EngineError::new("save", path, e))
    }
}

pub fn write_source(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
