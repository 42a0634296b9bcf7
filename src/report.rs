use crate::plan::{SplitTask, StrategyKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    Created,
    AlreadyPresent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub source: String,
    pub output_dir: String,
    pub backup_path: String,
    pub backup: BackupStatus,
    pub outputs: Vec<OutputFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFile {
    pub index: u32, // 1-based
    pub file_name: String,
    pub task: SplitTask,
    pub bytes: u64,
}

/// Written next to the outputs as `manifest.json` after a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub source: String,
    /// Hash of the source as computed by `fingerprint_mode`. Only
    /// `full_sha256` yields the file's actual SHA-256.
    pub source_fingerprint: String,
    pub fingerprint_mode: String,
    pub source_bytes: u64,
    pub page_count: u32,
    pub strategy: StrategyKind,
    pub engine: String,
    pub started: String,
    pub finished: String,
    pub run: RunReport,
}
