use crate::{
    error::InputError,
    outline::{self, OutlineLevel},
    probe::DocumentSummary,
    ranges::{self, RawRow},
    size_plan::{self, SizePlan},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTask {
    pub start_page: u32, // 1-based inclusive
    pub end_page: u32,   // 1-based inclusive
    pub name: String,
}

impl SplitTask {
    pub fn new(start_page: u32, end_page: u32, name: impl Into<String>) -> Self {
        Self {
            start_page,
            end_page,
            name: name.into(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Chapters,
    Ranges,
    Size,
}

/// How the caller wants the document cut.
#[derive(Debug, Clone)]
pub enum Strategy {
    Chapters {
        level: OutlineLevel,
        /// 1-based chapter numbers; `None` takes all.
        selection: Option<Vec<usize>>,
    },
    Ranges(Vec<RawRow>),
    Size {
        max_bytes: f64,
    },
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Chapters { .. } => StrategyKind::Chapters,
            Strategy::Ranges(_) => StrategyKind::Ranges,
            Strategy::Size { .. } => StrategyKind::Size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPlan {
    pub page_count: u32,
    pub strategy: StrategyKind,
    pub tasks: Vec<SplitTask>,
    /// Per-task size estimates, present for size plans only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_bytes: Option<Vec<f64>>,
}

impl SplitPlan {
    pub fn total_task_pages(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.page_count())).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    Plan(SplitPlan),
    /// Size strategy only: the source is already under the limit.
    NoSplitNeeded { total_bytes: u64, max_bytes: f64 },
}

pub fn build_plan(summary: &DocumentSummary, strategy: &Strategy) -> Result<PlanOutcome, InputError> {
    let page_count = summary.page_count;

    let tasks = match strategy {
        Strategy::Chapters { level, selection } => {
            let chapters = outline::flatten(&summary.outline, *level, page_count);
            outline::select(&chapters, selection.as_deref())?
        }
        Strategy::Ranges(rows) => ranges::validate_rows(rows, page_count)?,
        Strategy::Size { max_bytes } => {
            return match size_plan::plan_by_size(page_count, summary.file_bytes, *max_bytes)? {
                SizePlan::Unneeded {
                    total_bytes,
                    max_bytes,
                } => Ok(PlanOutcome::NoSplitNeeded {
                    total_bytes,
                    max_bytes,
                }),
                SizePlan::Split { parts, .. } => Ok(PlanOutcome::Plan(SplitPlan {
                    page_count,
                    strategy: StrategyKind::Size,
                    estimated_bytes: Some(parts.iter().map(|p| p.estimated_bytes).collect()),
                    tasks: parts.into_iter().map(|p| p.task).collect(),
                })),
            };
        }
    };

    Ok(PlanOutcome::Plan(SplitPlan {
        page_count,
        strategy: strategy.kind(),
        tasks,
        estimated_bytes: None,
    }))
}
