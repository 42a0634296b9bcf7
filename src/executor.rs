//! Turns a split plan into files on disk.
//!
//! A run creates the output and backup directories, copies the source into
//! the backup directory unless a copy is already there, then writes one
//! numbered file per task, strictly in order. The first failing task ends the
//! run; files written before it stay on disk.
//!
//! Progress and log lines go to an [`Observer`], which may be called from
//! whatever thread runs the split. UI callers marshal events themselves, for
//! example by draining a [`ChannelObserver`].

use crate::{
    config::Config,
    engine::{Engine, ExtractedPart, PdfDocument},
    error::{Field, InputError, RowError, SplitError},
    plan::SplitTask,
    report::{BackupStatus, OutputFile, RunReport},
    sanitize::{SanitizeOptions, sanitize_with},
    util::copy_preserving,
};
use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::Sender,
};
use tracing::{debug, error, info};

pub trait Observer {
    /// Percent complete, `0.0..=100.0`.
    fn progress(&self, percent: f64);
    fn log(&self, line: &str);
    fn status(&self, _text: &str) {}
}

/// Discards everything.
impl Observer for () {
    fn progress(&self, _percent: f64) {}
    fn log(&self, _line: &str) {}
}

/// Adapts a pair of closures.
pub struct FnObserver<P, L> {
    pub on_progress: P,
    pub on_log: L,
}

impl<P, L> Observer for FnObserver<P, L>
where
    P: Fn(f64),
    L: Fn(&str),
{
    fn progress(&self, percent: f64) {
        (self.on_progress)(percent)
    }

    fn log(&self, line: &str) {
        (self.on_log)(line)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Progress(f64),
    Log(String),
    Status(String),
}

/// Forwards events over a channel. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<Event>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }
}

impl Observer for ChannelObserver {
    fn progress(&self, percent: f64) {
        let _ = self.tx.send(Event::Progress(percent));
    }

    fn log(&self, line: &str) {
        let _ = self.tx.send(Event::Log(line.to_string()));
    }

    fn status(&self, text: &str) {
        let _ = self.tx.send(Event::Status(text.to_string()));
    }
}

/// Allows one split at a time per document. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

/// Held for the duration of a run; releases the guard on drop.
#[derive(Debug)]
pub struct RunTicket {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_start(&self) -> Result<RunTicket, SplitError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SplitError::AlreadyRunning)?;
        Ok(RunTicket {
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct ExecOptions {
    pub backup_dir: String,
    pub index_width: usize,
    pub fallback_name: String,
    pub normalize_unicode: bool,
    /// Used when the source has no extension of its own.
    pub extension: String,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ExecOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            backup_dir: cfg.paths.backup_dir.clone(),
            index_width: cfg.naming.index_width,
            fallback_name: cfg.naming.fallback_name.clone(),
            normalize_unicode: cfg.naming.normalize_unicode,
            extension: cfg.naming.extension.clone(),
        }
    }

    fn sanitize(&self, name: &str) -> String {
        sanitize_with(
            name,
            &SanitizeOptions {
                fallback: &self.fallback_name,
                normalize_unicode: self.normalize_unicode,
            },
        )
    }

    /// `NN_<name>.<ext>`, NN being the 1-based position.
    pub fn output_file_name(&self, index: usize, name: &str, ext: &str) -> String {
        format!(
            "{:0width$}_{}.{}",
            index + 1,
            self.sanitize(name),
            ext,
            width = self.index_width.max(2)
        )
    }
}

/// Owns an engine and the single-run guard for one loaded document.
pub struct Splitter<E: Engine> {
    engine: E,
    opts: ExecOptions,
    guard: RunGuard,
}

impl<E: Engine> Splitter<E> {
    pub fn new(engine: E, opts: ExecOptions) -> Self {
        Self {
            engine,
            opts,
            guard: RunGuard::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Open `source`, run `tasks` and close it again, whatever the outcome.
    /// Fails with [`SplitError::AlreadyRunning`] while another run holds the
    /// guard.
    pub fn run(
        &self,
        tasks: &[SplitTask],
        source: &Path,
        output_dir: &Path,
        observer: &dyn Observer,
    ) -> Result<RunReport, SplitError> {
        let _ticket = self.guard.try_start()?;
        let doc = self.engine.open(source).map_err(|e| {
            error!("{e}");
            observer.log(&format!("split failed: {e}"));
            SplitError::from(e)
        })?;
        execute(&doc, tasks, source, output_dir, &self.opts, observer)
    }
}

/// `<source dir>/<sanitized stem><suffix>`.
pub fn output_dir_for(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let dir_name = format!("{}{}", crate::sanitize::sanitize(&stem), suffix);
    match source.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    }
}

/// Run `tasks` against an already opened `doc` read from `source`.
pub fn execute<D: PdfDocument>(
    doc: &D,
    tasks: &[SplitTask],
    source: &Path,
    output_dir: &Path,
    opts: &ExecOptions,
    observer: &dyn Observer,
) -> Result<RunReport, SplitError> {
    let result = run_tasks(doc, tasks, source, output_dir, opts, observer);
    if let Err(err) = &result {
        error!("split failed: {err}");
        observer.log(&format!("split failed: {err}"));
        observer.status(&format!("error: {err}"));
    }
    result
}

fn run_tasks<D: PdfDocument>(
    doc: &D,
    tasks: &[SplitTask],
    source: &Path,
    output_dir: &Path,
    opts: &ExecOptions,
    observer: &dyn Observer,
) -> Result<RunReport, SplitError> {
    check_tasks(tasks, doc.page_count())?;

    let file_name = source.file_name().ok_or_else(|| {
        SplitError::fs(
            "read file name of",
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
        )
    })?;

    let backup_dir = output_dir.join(&opts.backup_dir);
    std::fs::create_dir_all(&backup_dir)
        .map_err(|e| SplitError::fs("create directory", &backup_dir, e))?;
    emit_log(observer, &format!("output directory: {}", output_dir.display()));

    let backup_path = backup_dir.join(file_name);
    let backup = if backup_path.exists() {
        emit_log(observer, "backup already exists, skipping");
        BackupStatus::AlreadyPresent
    } else {
        copy_preserving(source, &backup_path)
            .map_err(|e| SplitError::fs("back up source to", &backup_path, e))?;
        emit_log(
            observer,
            &format!(
                "backed up source to {}/{}",
                opts.backup_dir,
                file_name.to_string_lossy()
            ),
        );
        BackupStatus::Created
    };

    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| opts.extension.clone());

    let total = tasks.len();
    let mut outputs = Vec::with_capacity(total);

    for (i, task) in tasks.iter().enumerate() {
        observer.status(&format!("splitting: {} ({}/{})", task.name, i + 1, total));
        emit_progress(observer, i as f64 / total as f64 * 100.0);

        let out_name = opts.output_file_name(i, &task.name, &ext);
        let out_path = output_dir.join(&out_name);

        let bytes = write_task(doc, task, &out_path).map_err(|err| SplitError::TaskFailed {
            index: i,
            total,
            name: task.name.clone(),
            source: Box::new(err),
        })?;

        emit_log(
            observer,
            &format!(
                "  wrote {out_name} (pages {}-{}, {} pages)",
                task.start_page,
                task.end_page,
                task.page_count()
            ),
        );
        outputs.push(OutputFile {
            index: (i + 1) as u32,
            file_name: out_name,
            task: task.clone(),
            bytes,
        });
    }

    emit_progress(observer, 100.0);
    observer.status("split complete");
    emit_log(observer, &format!("split complete: {total} files written"));
    emit_log(observer, &format!("output location: {}", output_dir.display()));

    Ok(RunReport {
        source: source.display().to_string(),
        output_dir: output_dir.display().to_string(),
        backup_path: backup_path.display().to_string(),
        backup,
        outputs,
    })
}

fn write_task<D: PdfDocument>(doc: &D, task: &SplitTask, out_path: &Path) -> Result<u64, SplitError> {
    debug!(
        "extract pages {}-{} -> {}",
        task.start_page,
        task.end_page,
        out_path.display()
    );
    let part = doc.extract_range(task.start_page - 1, task.end_page - 1)?;
    part.save(out_path)?;
    let bytes = std::fs::metadata(out_path)
        .map_err(|e| SplitError::fs("stat output", out_path, e))?
        .len();
    Ok(bytes)
}

/// Last line of defence before anything is written; plans built through
/// [`crate::plan::build_plan`] always pass.
fn check_tasks(tasks: &[SplitTask], total_pages: u32) -> Result<(), SplitError> {
    if tasks.is_empty() {
        return Err(InputError::EmptyPlan.into());
    }
    for (i, t) in tasks.iter().enumerate() {
        let reason = if t.start_page < 1 {
            RowError::OutOfRange {
                field: Field::Start,
                value: i64::from(t.start_page),
            }
        } else if t.start_page > t.end_page {
            RowError::InvertedRange {
                start: i64::from(t.start_page),
                end: i64::from(t.end_page),
            }
        } else if t.end_page > total_pages {
            RowError::ExceedsDocument {
                end: i64::from(t.end_page),
                total_pages,
            }
        } else {
            continue;
        };
        return Err(InputError::Task { index: i, reason }.into());
    }
    Ok(())
}

fn emit_progress(observer: &dyn Observer, percent: f64) {
    debug!(percent, "progress");
    observer.progress(percent);
}

fn emit_log(observer: &dyn Observer, line: &str) {
    info!("{}", line.trim_start());
    observer.log(line);
}
