use crate::{
    error::InputError,
    plan::SplitTask,
};
use serde::{Deserialize, Serialize};

/// One bookmark as reported by the PDF engine, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: u32,
    pub title: String,
    pub target_page: u32, // 1-based
}

impl OutlineEntry {
    pub fn new(level: u32, title: impl Into<String>, target_page: u32) -> Self {
        Self {
            level,
            title: title.into(),
            target_page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub title: String,
    pub start_page: u32, // 1-based inclusive
    pub end_page: u32,   // 1-based inclusive
}

/// Deepest bookmark level that still counts as a chapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineLevel(u32);

impl OutlineLevel {
    pub const MAX: u32 = 3;

    pub fn new(level: u32) -> Result<Self, InputError> {
        if (1..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(InputError::InvalidLevel(level))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for OutlineLevel {
    fn default() -> Self {
        Self(1)
    }
}

/// Turn a raw outline into chapter ranges.
///
/// Entries deeper than `max_level` are dropped. Each surviving entry runs up
/// to the page before the next one; the last runs to `total_pages`. Two
/// bookmarks on the same page yield a one-page chapter that overlaps the
/// next one, which is passed through as is. An empty result means the
/// document has no usable chapter data.
pub fn flatten(outline: &[OutlineEntry], max_level: OutlineLevel, total_pages: u32) -> Vec<ChapterRange> {
    let filtered: Vec<(&str, u32)> = outline
        .iter()
        .filter(|e| e.level <= max_level.get())
        .map(|e| (e.title.trim(), e.target_page.max(1)))
        .collect();

    let mut chapters = Vec::with_capacity(filtered.len());
    for (i, &(title, start_page)) in filtered.iter().enumerate() {
        let mut end_page = match filtered.get(i + 1) {
            Some(&(_, next)) => next - 1,
            None => total_pages,
        };
        if end_page < start_page {
            end_page = start_page;
        }
        chapters.push(ChapterRange {
            title: title.to_string(),
            start_page,
            end_page,
        });
    }
    chapters
}

/// Pick chapters by 1-based number and turn them into split tasks.
///
/// `None` takes every chapter. Selected chapters keep document order no
/// matter how the numbers were given; repeats are ignored.
pub fn select(chapters: &[ChapterRange], selection: Option<&[usize]>) -> Result<Vec<SplitTask>, InputError> {
    if chapters.is_empty() {
        return Err(InputError::NoChapters);
    }

    let picked: Vec<&ChapterRange> = match selection {
        None => chapters.iter().collect(),
        Some(numbers) => {
            let mut keep = vec![false; chapters.len()];
            for &number in numbers {
                if number == 0 || number > chapters.len() {
                    return Err(InputError::UnknownChapter {
                        number,
                        count: chapters.len(),
                    });
                }
                keep[number - 1] = true;
            }
            chapters
                .iter()
                .zip(keep)
                .filter_map(|(ch, k)| k.then_some(ch))
                .collect()
        }
    };

    if picked.is_empty() {
        return Err(InputError::EmptyPlan);
    }

    Ok(picked
        .into_iter()
        .map(|ch| SplitTask::new(ch.start_page, ch.end_page, ch.title.clone()))
        .collect())
}
