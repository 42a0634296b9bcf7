mod common;

use common::{FakeEngine, sorted_file_names, write_source};
use pdf_splitter::{
    engine::Engine,
    error::{InputError, RowError, SplitError},
    executor::{ChannelObserver, Event, ExecOptions, FnObserver, RunGuard, Splitter, execute, output_dir_for},
    plan::SplitTask,
    report::BackupStatus,
};
use std::cell::RefCell;
use std::path::Path;
use std::sync::mpsc;

fn tasks() -> Vec<SplitTask> {
    vec![
        SplitTask::new(1, 4, "Intro"),
        SplitTask::new(5, 8, "Part: Two?"),
        SplitTask::new(9, 10, "   "),
    ]
}

fn engine(pages: u32) -> FakeEngine {
    FakeEngine {
        pages,
        ..Default::default()
    }
}

#[test]
fn writes_numbered_files_and_backup() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Book.PDF", b"%PDF-fake");
    let out = dir.path().join("Book_split_result");

    let doc = engine(10).open(&src).unwrap();
    let report = execute(&doc, &tasks(), &src, &out, &ExecOptions::default(), &()).unwrap();

    assert_eq!(
        sorted_file_names(&out),
        ["01_Intro.pdf", "02_Part_ Two_.pdf", "03_untitled.pdf"]
    );
    assert_eq!(
        std::fs::read(out.join("backup").join("Book.PDF")).unwrap(),
        b"%PDF-fake"
    );
    assert_eq!(report.backup, BackupStatus::Created);
    assert_eq!(report.outputs.len(), 3);
    assert_eq!(report.outputs[2].index, 3);
    assert!(report.outputs.iter().all(|o| o.bytes > 0));
    assert_eq!(*doc.extracted.borrow(), [(0, 3), (4, 7), (8, 9)]);
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "a.pdf", b"x");
    let out = dir.path().join("out");

    let seen = RefCell::new(Vec::new());
    let lines = RefCell::new(Vec::new());
    let observer = FnObserver {
        on_progress: |p: f64| seen.borrow_mut().push(p),
        on_log: |l: &str| lines.borrow_mut().push(l.to_string()),
    };

    let doc = engine(10).open(&src).unwrap();
    execute(&doc, &tasks(), &src, &out, &ExecOptions::default(), &observer).unwrap();

    let seen = seen.borrow().clone();
    let expected: Vec<f64> = (0..3).map(|i| i as f64 / 3.0 * 100.0).chain([100.0]).collect();
    assert_eq!(seen, expected);
    let lines = lines.borrow().clone();
    assert!(lines.iter().any(|l| l.contains("01_Intro.pdf") && l.contains("4 pages")));
    assert!(lines.last().unwrap().contains(&out.display().to_string()));
}

#[test]
fn second_run_skips_backup_and_overwrites_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "a.pdf", b"original");
    let out = dir.path().join("out");
    let doc = engine(10).open(&src).unwrap();

    let first = execute(&doc, &tasks(), &src, &out, &ExecOptions::default(), &()).unwrap();
    assert_eq!(first.backup, BackupStatus::Created);

    std::fs::write(&src, b"edited since").unwrap();
    let (tx, rx) = mpsc::channel();
    let second = execute(
        &doc,
        &tasks(),
        &src,
        &out,
        &ExecOptions::default(),
        &ChannelObserver::new(tx),
    )
    .unwrap();

    assert_eq!(second.backup, BackupStatus::AlreadyPresent);
    assert_eq!(std::fs::read(out.join("backup/a.pdf")).unwrap(), b"original");
    assert_eq!(sorted_file_names(&out).len(), 3);

    let events: Vec<Event> = rx.try_iter().collect();
    assert!(events.contains(&Event::Log("backup already exists, skipping".into())));
    assert!(events.contains(&Event::Progress(100.0)));
    assert!(events.contains(&Event::Status("split complete".into())));
}

#[test]
fn failing_task_aborts_and_keeps_earlier_files() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "a.pdf", b"x");
    let out = dir.path().join("out");
    let eng = FakeEngine {
        pages: 10,
        fail_at_start: Some(4),
        ..Default::default()
    };

    let doc = eng.open(&src).unwrap();
    let (tx, rx) = mpsc::channel();
    let err = execute(
        &doc,
        &tasks(),
        &src,
        &out,
        &ExecOptions::default(),
        &ChannelObserver::new(tx),
    )
    .unwrap_err();

    match &err {
        SplitError::TaskFailed { index, total, .. } => {
            assert_eq!((*index, *total), (1, 3));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("failed at task 2 of 3"));
    assert_eq!(sorted_file_names(&out), ["01_Intro.pdf"]);

    let events: Vec<Event> = rx.try_iter().collect();
    assert!(!events.contains(&Event::Progress(100.0)));
    assert!(events.iter().any(|e| matches!(e, Event::Log(l) if l.starts_with("split failed"))));
}

#[test]
fn bad_tasks_fail_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "a.pdf", b"x");
    let out = dir.path().join("out");
    let doc = engine(5).open(&src).unwrap();

    let err = execute(&doc, &[], &src, &out, &ExecOptions::default(), &()).unwrap_err();
    assert!(matches!(err, SplitError::Input(InputError::EmptyPlan)));

    let err = execute(
        &doc,
        &[SplitTask::new(2, 6, "too far")],
        &src,
        &out,
        &ExecOptions::default(),
        &(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SplitError::Input(InputError::Task {
            index: 0,
            reason: RowError::ExceedsDocument {
                end: 6,
                total_pages: 5
            }
        })
    ));
    assert_eq!(err.to_string(), "task 1: end page (6) exceeds the document's 5 pages");
    assert!(!out.exists());
}

#[test]
fn wider_index_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "a.pdf", b"x");
    let out = dir.path().join("out");
    let opts = ExecOptions {
        index_width: 3,
        ..Default::default()
    };
    let doc = engine(10).open(&src).unwrap();
    execute(&doc, &[SplitTask::new(1, 10, "all")], &src, &out, &opts, &()).unwrap();
    assert_eq!(sorted_file_names(&out), ["001_all.pdf"]);
}

#[test]
fn output_dir_sits_next_to_source() {
    assert_eq!(
        output_dir_for(Path::new("/books/My: Book.pdf"), "_split_result"),
        Path::new("/books/My_ Book_split_result")
    );
}

#[test]
fn splitter_opens_source_and_reports_open_failure() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "a.pdf", b"x");
    let splitter = Splitter::new(engine(10), ExecOptions::default());

    let report = splitter
        .run(&tasks(), &src, &dir.path().join("out"), &())
        .unwrap();
    assert_eq!(report.outputs.len(), 3);
    assert!(!splitter.guard().is_running());

    let missing = dir.path().join("missing.pdf");
    let err = splitter
        .run(&tasks(), &missing, &dir.path().join("out2"), &())
        .unwrap_err();
    assert!(matches!(err, SplitError::Engine(_)));
    assert!(!splitter.guard().is_running());
}

#[test]
fn guard_rejects_concurrent_runs() {
    let guard = RunGuard::new();
    let ticket = guard.try_start().unwrap();
    assert!(guard.is_running());
    assert!(matches!(guard.clone().try_start(), Err(SplitError::AlreadyRunning)));
    drop(ticket);
    assert!(!guard.is_running());
    assert!(guard.try_start().is_ok());
}
