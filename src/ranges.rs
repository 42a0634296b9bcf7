use crate::{
    error::{Field, InputError, RowError},
    plan::SplitTask,
    size_plan::default_part_name,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ROW_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^:\-]*?)\s*(?:-\s*([^:]*?)\s*)?(?::(.*))?$").expect("row spec regex")
});

/// A range row exactly as the user typed it, captured at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub name: String,
}

impl RawRow {
    pub fn new(start: impl Into<String>, end: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            name: name.into(),
        }
    }

    /// Parse `START-END[:NAME]` as typed on the command line.
    ///
    /// Nothing is validated here; `"7"` becomes a row with an empty end so
    /// that [`validate_rows`] reports it as a missing field.
    pub fn parse_spec(spec: &str) -> Self {
        match ROW_SPEC.captures(spec) {
            Some(caps) => {
                let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
                Self {
                    start: part(1),
                    end: part(2),
                    name: part(3),
                }
            }
            None => Self {
                start: spec.to_string(),
                ..Default::default()
            },
        }
    }
}

/// Validate raw rows against the document and turn them into split tasks.
///
/// Fully blank rows are skipped. The first bad row aborts the whole call.
/// Ranges may overlap or leave gaps; only each row on its own is checked.
pub fn validate_rows(rows: &[RawRow], total_pages: u32) -> Result<Vec<SplitTask>, InputError> {
    let mut tasks = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let start_text = row.start.trim();
        let end_text = row.end.trim();

        if start_text.is_empty() && end_text.is_empty() {
            continue;
        }
        if start_text.is_empty() || end_text.is_empty() {
            return Err(InputError::row(i, RowError::MissingField));
        }

        let start = parse_page(start_text, Field::Start).map_err(|e| InputError::row(i, e))?;
        let end = parse_page(end_text, Field::End).map_err(|e| InputError::row(i, e))?;

        let reason = if start < 1 {
            Some(RowError::OutOfRange {
                field: Field::Start,
                value: start,
            })
        } else if end < 1 {
            Some(RowError::OutOfRange {
                field: Field::End,
                value: end,
            })
        } else if start > end {
            Some(RowError::InvertedRange { start, end })
        } else if end > i64::from(total_pages) {
            Some(RowError::ExceedsDocument { end, total_pages })
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(InputError::row(i, reason));
        }
        // 1 <= start <= end <= total_pages, so both fit.
        let (start, end) = (start as u32, end as u32);

        let name = row.name.trim();
        let name = if name.is_empty() {
            default_part_name(i, start, end)
        } else {
            name.to_string()
        };
        tasks.push(SplitTask::new(start, end, name));
    }

    if tasks.is_empty() {
        return Err(InputError::EmptyPlan);
    }
    Ok(tasks)
}

fn parse_page(text: &str, field: Field) -> Result<i64, RowError> {
    text.parse().map_err(|_| RowError::NotANumber {
        field,
        text: text.to_string(),
    })
}
