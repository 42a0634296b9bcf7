//! Partition a document into equal page-count parts from its average page
//! size.
//!
//! This is an estimate. Parts are balanced by page count, not by bytes, so a
//! part full of image-heavy pages can come out larger than the limit. The
//! per-part `estimated_bytes` is there for display only.

use crate::{error::InputError, plan::SplitTask};
use serde::{Deserialize, Serialize};

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn mb_to_bytes(mb: f64) -> f64 {
    mb * BYTES_PER_MB
}

/// Reject limits the planner cannot work with: zero, negative, NaN or infinite.
pub fn check_limit(max_bytes: f64) -> Result<f64, InputError> {
    if max_bytes.is_finite() && max_bytes > 0.0 {
        Ok(max_bytes)
    } else {
        Err(InputError::InvalidSizeLimit(max_bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedTask {
    pub task: SplitTask,
    pub estimated_bytes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizePlan {
    /// The whole document already fits under the limit.
    Unneeded { total_bytes: u64, max_bytes: f64 },
    Split {
        avg_page_bytes: f64,
        pages_per_part: u32,
        parts: Vec<SizedTask>,
    },
}

impl SizePlan {
    pub fn tasks(&self) -> Vec<SplitTask> {
        match self {
            SizePlan::Unneeded { .. } => Vec::new(),
            SizePlan::Split { parts, .. } => parts.iter().map(|p| p.task.clone()).collect(),
        }
    }

    pub fn is_unneeded(&self) -> bool {
        matches!(self, SizePlan::Unneeded { .. })
    }
}

pub fn plan_by_size(total_pages: u32, total_bytes: u64, max_bytes: f64) -> Result<SizePlan, InputError> {
    let max_bytes = check_limit(max_bytes)?;
    if total_pages == 0 {
        return Err(InputError::EmptyDocument);
    }

    if total_bytes as f64 <= max_bytes {
        return Ok(SizePlan::Unneeded {
            total_bytes,
            max_bytes,
        });
    }

    let avg_page_bytes = total_bytes as f64 / f64::from(total_pages);
    let fit = (max_bytes / avg_page_bytes).floor();
    let pages_per_part = if fit >= f64::from(total_pages) {
        total_pages
    } else {
        (fit as u32).max(1)
    };
    let num_parts = total_pages.div_ceil(pages_per_part);

    let mut parts = Vec::with_capacity(num_parts as usize);
    for i in 0..num_parts {
        let start = i * pages_per_part + 1;
        let end = (start + pages_per_part - 1).min(total_pages);
        parts.push(SizedTask {
            task: SplitTask::new(start, end, default_part_name(i as usize, start, end)),
            estimated_bytes: f64::from(end - start + 1) * avg_page_bytes,
        });
    }

    Ok(SizePlan::Split {
        avg_page_bytes,
        pages_per_part,
        parts,
    })
}

/// `part_{n}_pages_{start}-{end}` with a 1-based `n`.
pub fn default_part_name(index: usize, start: u32, end: u32) -> String {
    format!("part_{}_pages_{}-{}", index + 1, start, end)
}
