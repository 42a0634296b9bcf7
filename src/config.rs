use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub naming: Naming,
    #[serde(default)]
    pub planning: Planning,
    #[serde(default)]
    pub hashing: Hashing,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Load `path` if given, else `./pdf-splitter.toml` if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }
        let default = Path::new("pdf-splitter.toml");
        if default.exists() {
            Self::load(default)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    /// Appended to the sanitized source stem to name the output directory.
    pub output_suffix: String,
    pub backup_dir: String,
    pub logs_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            output_suffix: "_split_result".into(),
            backup_dir: "backup".into(),
            logs_dir: "logs".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Naming {
    pub fallback_name: String,
    /// Minimum width of the zero-padded sequence prefix.
    pub index_width: usize,
    pub normalize_unicode: bool,
    pub extension: String,
}
impl Default for Naming {
    fn default() -> Self {
        Self {
            fallback_name: crate::sanitize::FALLBACK_NAME.into(),
            index_width: 2,
            normalize_unicode: true,
            extension: "pdf".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planning {
    pub default_level: u32,
    pub default_max_mb: f64,
}
impl Default for Planning {
    fn default() -> Self {
        Self {
            default_level: 1,
            default_max_mb: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashing {
    pub mode: String,
    pub fast_window_bytes: u64,
}
impl Default for Hashing {
    fn default() -> Self {
        Self {
            mode: "full_sha256".into(),
            fast_window_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: u32,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 4 * 1024 * 1024 * 1024,
            max_input_pages: 100_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub write_manifest: bool,
    pub manifest_filename: String,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_manifest: true,
            manifest_filename: "manifest.json".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}
