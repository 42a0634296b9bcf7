use pdf_splitter::{
    error::InputError,
    outline::{ChapterRange, OutlineEntry, OutlineLevel, flatten, select},
};

fn ch(title: &str, start: u32, end: u32) -> ChapterRange {
    ChapterRange {
        title: title.into(),
        start_page: start,
        end_page: end,
    }
}

fn level(n: u32) -> OutlineLevel {
    OutlineLevel::new(n).unwrap()
}

#[test]
fn top_level_only() {
    let outline = vec![
        OutlineEntry::new(1, "A", 1),
        OutlineEntry::new(2, "A.1", 2),
        OutlineEntry::new(1, "B", 5),
    ];
    assert_eq!(
        flatten(&outline, level(1), 10),
        vec![ch("A", 1, 4), ch("B", 5, 10)]
    );
}

#[test]
fn deeper_levels_split_further() {
    let outline = vec![
        OutlineEntry::new(1, "A", 1),
        OutlineEntry::new(2, "A.1", 2),
        OutlineEntry::new(3, "A.1.a", 3),
        OutlineEntry::new(1, "B", 5),
    ];
    assert_eq!(
        flatten(&outline, level(2), 10),
        vec![ch("A", 1, 1), ch("A.1", 2, 4), ch("B", 5, 10)]
    );
}

#[test]
fn three_chapters_over_100_pages() {
    let outline = vec![
        OutlineEntry::new(1, "Ch1", 1),
        OutlineEntry::new(1, "Ch2", 40),
        OutlineEntry::new(1, "Ch3", 80),
    ];
    assert_eq!(
        flatten(&outline, level(1), 100),
        vec![ch("Ch1", 1, 39), ch("Ch2", 40, 79), ch("Ch3", 80, 100)]
    );
}

#[test]
fn shared_target_page_clamps_and_overlaps() {
    let outline = vec![
        OutlineEntry::new(1, "Cover", 3),
        OutlineEntry::new(1, "Preface", 3),
        OutlineEntry::new(1, "Body", 6),
    ];
    assert_eq!(
        flatten(&outline, level(1), 20),
        vec![ch("Cover", 3, 3), ch("Preface", 3, 5), ch("Body", 6, 20)]
    );
}

#[test]
fn zero_target_clamps_to_first_page_and_titles_are_trimmed() {
    let outline = vec![OutlineEntry::new(1, "  Intro ", 0), OutlineEntry::new(1, "Rest", 4)];
    assert_eq!(
        flatten(&outline, level(1), 9),
        vec![ch("Intro", 1, 3), ch("Rest", 4, 9)]
    );
}

#[test]
fn ranges_are_well_formed_and_end_at_last_page() {
    let outline = vec![
        OutlineEntry::new(1, "x", 7),
        OutlineEntry::new(2, "y", 2),
        OutlineEntry::new(1, "z", 7),
        OutlineEntry::new(1, "w", 12),
    ];
    for n in 1..=3 {
        let chapters = flatten(&outline, level(n), 30);
        assert!(chapters.iter().all(|c| c.start_page <= c.end_page));
        assert_eq!(chapters.last().unwrap().end_page, 30);
    }
}

#[test]
fn nothing_at_requested_depth() {
    let outline = vec![OutlineEntry::new(2, "deep", 3)];
    assert!(flatten(&outline, level(1), 10).is_empty());
    assert!(flatten(&[], level(3), 10).is_empty());
}

#[test]
fn level_must_be_one_to_three() {
    assert_eq!(OutlineLevel::new(0), Err(InputError::InvalidLevel(0)));
    assert_eq!(OutlineLevel::new(4), Err(InputError::InvalidLevel(4)));
}

#[test]
fn input_outline_is_untouched() {
    let outline = vec![OutlineEntry::new(1, " A ", 0)];
    let before = outline.clone();
    let _ = flatten(&outline, level(1), 5);
    assert_eq!(outline, before);
}

#[test]
fn select_keeps_document_order() {
    let chapters = vec![ch("A", 1, 4), ch("B", 5, 8), ch("C", 9, 10)];
    let tasks = select(&chapters, Some(&[3, 1, 3][..])).unwrap();
    let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A", "C"]);
    assert_eq!((tasks[1].start_page, tasks[1].end_page), (9, 10));
}

#[test]
fn select_all_and_errors() {
    let chapters = vec![ch("A", 1, 4), ch("B", 5, 8)];
    assert_eq!(select(&chapters, None).unwrap().len(), 2);
    assert_eq!(
        select(&chapters, Some(&[5][..])),
        Err(InputError::UnknownChapter { number: 5, count: 2 })
    );
    assert_eq!(select(&chapters, Some(&[][..])), Err(InputError::EmptyPlan));
    assert_eq!(select(&[], None), Err(InputError::NoChapters));
}
