use crate::{
    config::Config,
    engine::{Engine, LopdfEngine},
    executor::{ExecOptions, FnObserver, Splitter, output_dir_for},
    outline::{self, OutlineLevel},
    plan::{PlanOutcome, SplitPlan, Strategy, build_plan},
    probe::{self, DocumentSummary},
    ranges::RawRow,
    report::Manifest,
    size_plan,
    util::{ensure_dir, hash_file, now_rfc3339},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdf-splitter")]
#[command(about = "Split a PDF by bookmarks, page ranges or size into numbered parts")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./pdf-splitter.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show page count, size and detected chapters.
    Inspect {
        #[arg(long)]
        input: PathBuf,
        /// Deepest bookmark level to list (1-3).
        #[arg(long)]
        level: Option<u32>,
    },
    /// Print the split plan without writing anything.
    Plan {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// Split the document.
    Run {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        strategy: StrategyArgs,
        /// Defaults to `<input stem>_split_result` next to the input.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Open the output folder in the file manager when done.
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum By {
    Chapters,
    Ranges,
    Size,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StrategyArgs {
    #[arg(long, value_enum, default_value_t = By::Chapters)]
    pub by: By,

    /// Chapters: deepest bookmark level that starts a chapter (1-3).
    #[arg(long)]
    pub level: Option<u32>,

    /// Chapters: 1-based chapter numbers to keep, e.g. `1,3,4`.
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Ranges: `START-END[:NAME]`, repeatable.
    #[arg(long = "range")]
    pub ranges: Vec<String>,

    /// Ranges: JSON array of `{"start","end","name"}` rows.
    #[arg(long)]
    pub ranges_file: Option<PathBuf>,

    /// Size: maximum part size in MB.
    #[arg(long)]
    pub max_mb: Option<f64>,
}

impl StrategyArgs {
    fn to_strategy(&self, cfg: &Config) -> Result<Strategy> {
        match self.by {
            By::Chapters => {
                let level = OutlineLevel::new(self.level.unwrap_or(cfg.planning.default_level))?;
                let selection = (!self.select.is_empty()).then(|| self.select.clone());
                Ok(Strategy::Chapters { level, selection })
            }
            By::Ranges => {
                let mut rows: Vec<RawRow> = match &self.ranges_file {
                    Some(path) => {
                        let raw = std::fs::read_to_string(path)
                            .with_context(|| format!("reading ranges file: {}", path.display()))?;
                        serde_json::from_str(&raw)
                            .with_context(|| format!("parsing ranges file: {}", path.display()))?
                    }
                    None => Vec::new(),
                };
                rows.extend(self.ranges.iter().map(|s| RawRow::parse_spec(s)));
                Ok(Strategy::Ranges(rows))
            }
            By::Size => {
                let mb = self.max_mb.unwrap_or(cfg.planning.default_max_mb);
                let max_bytes = size_plan::check_limit(size_plan::mb_to_bytes(mb))?;
                Ok(Strategy::Size { max_bytes })
            }
        }
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = Config::resolve(args.config.as_deref())?;

    match &args.cmd {
        Command::Inspect { input, level } => {
            let _guard = init_logging(&args, &cfg, None)?;
            inspect(&cfg, input, *level)
        }
        Command::Plan { input, strategy } => {
            let _guard = init_logging(&args, &cfg, None)?;
            plan(&cfg, input, strategy)
        }
        Command::Run {
            input,
            strategy,
            out_dir,
            reveal,
        } => run(&args, &cfg, input, strategy, out_dir.as_deref(), *reveal),
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn inspect(cfg: &Config, input: &Path, level: Option<u32>) -> Result<()> {
    validate_input(cfg, input)?;
    let summary = probe::summarize(cfg, &LopdfEngine, input)?;
    let level = OutlineLevel::new(level.unwrap_or(cfg.planning.default_level))?;
    let chapters = outline::flatten(&summary.outline, level, summary.page_count);
    if chapters.is_empty() {
        warn!("no bookmarks at level <= {}; use --by ranges or --by size", level.get());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "file_bytes": summary.file_bytes,
            "page_count": summary.page_count,
            "outline_entries": summary.outline.len(),
            "level": level.get(),
            "chapters": chapters,
        }))?
    );
    Ok(())
}

fn plan(cfg: &Config, input: &Path, args: &StrategyArgs) -> Result<()> {
    validate_input(cfg, input)?;
    let summary = probe::summarize(cfg, &LopdfEngine, input)?;
    let outcome = make_plan(cfg, &summary, args)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn make_plan(cfg: &Config, summary: &DocumentSummary, args: &StrategyArgs) -> Result<PlanOutcome> {
    let strategy = args.to_strategy(cfg)?;
    let outcome = build_plan(summary, &strategy)?;
    Ok(outcome)
}

fn run(
    args: &Args,
    cfg: &Config,
    input: &Path,
    strategy: &StrategyArgs,
    out_override: Option<&Path>,
    reveal: bool,
) -> Result<()> {
    validate_input(cfg, input)?;

    let engine = LopdfEngine;
    let summary = probe::summarize(cfg, &engine, input)?;

    // Everything is validated before the first directory is created.
    let split_plan = match make_plan(cfg, &summary, strategy)? {
        PlanOutcome::Plan(p) => p,
        PlanOutcome::NoSplitNeeded {
            total_bytes,
            max_bytes,
        } => {
            println!(
                "no split needed: {} is {:.2} MB, under the {:.2} MB limit",
                input.display(),
                total_bytes as f64 / size_plan::BYTES_PER_MB,
                max_bytes / size_plan::BYTES_PER_MB
            );
            return Ok(());
        }
    };

    let output_dir = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| output_dir_for(input, &cfg.paths.output_suffix));
    ensure_dir(&output_dir)?;

    let log_path = resolve_log_path(cfg, &output_dir);
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!(
        "splitting {} ({} pages) into {} parts by {:?}",
        input.display(),
        summary.page_count,
        split_plan.tasks.len(),
        split_plan.strategy
    );

    let started = now_rfc3339();
    let splitter = Splitter::new(engine, ExecOptions::from_config(cfg));
    let observer = FnObserver {
        on_progress: |pct: f64| eprintln!("[{pct:>5.1}%]"),
        on_log: |_line: &str| {},
    };
    let report = splitter.run(&split_plan.tasks, input, &output_dir, &observer)?;

    if cfg.output.write_manifest {
        write_manifest(
            cfg,
            &summary,
            &split_plan,
            splitter.engine().name(),
            started,
            &report,
            &output_dir,
        )?;
    }

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "output_dir": output_dir,
                "files": report.outputs.len(),
                "backup": report.backup,
                "status": "ok"
            }))?
        );
    }

    if reveal {
        reveal_dir(&output_dir)?;
    }

    Ok(())
}

fn write_manifest(
    cfg: &Config,
    summary: &DocumentSummary,
    split_plan: &SplitPlan,
    engine: &str,
    started: String,
    report: &crate::report::RunReport,
    output_dir: &Path,
) -> Result<()> {
    let source = Path::new(&summary.path);
    let manifest = Manifest {
        source: summary.path.clone(),
        source_fingerprint: hash_file(cfg, source)
            .with_context(|| format!("hashing input: {}", source.display()))?,
        fingerprint_mode: cfg.hashing.mode.clone(),
        source_bytes: summary.file_bytes,
        page_count: summary.page_count,
        strategy: split_plan.strategy,
        engine: engine.to_string(),
        started,
        finished: now_rfc3339(),
        run: report.clone(),
    };
    let path = output_dir.join(&cfg.output.manifest_filename);
    std::fs::write(&path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("writing manifest: {}", path.display()))?;
    Ok(())
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if !input.is_file() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) if !ext.eq_ignore_ascii_case("pdf") => {
            return Err(anyhow!("input is not a PDF: {}", input.display()));
        }
        Some(_) => {}
        None => warn!("input has no extension; assuming PDF: {}", input.display()),
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn resolve_log_path(cfg: &Config, output_dir: &Path) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(output_dir.join(&cfg.paths.logs_dir).join("pdf-splitter.log"))
}

fn reveal_dir(dir: &Path) -> Result<()> {
    let opener = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    std::process::Command::new(opener)
        .arg(dir)
        .spawn()
        .with_context(|| format!("spawning {opener} for {}", dir.display()))?;
    Ok(())
}
