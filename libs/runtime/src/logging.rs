use crate::config::{LogSection, LoggingConfig};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// Level names are case-insensitive; "none" is an alias of "off" and anything
/// unrecognized logs at INFO.
fn parse_level(raw: &str) -> LevelFilter {
    match raw.trim() {
        "" => LevelFilter::INFO,
        s if s.eq_ignore_ascii_case("none") => LevelFilter::OFF,
        s => s.parse().unwrap_or(LevelFilter::INFO),
    }
}

/// `user_search` matches `user_search` and `user_search::infra`, never
/// `user_search_cli`.
fn target_in_crate(target: &str, crate_name: &str) -> bool {
    match target.strip_prefix(crate_name) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}

type RotatingFile = FileRotate<AppendTimestamp>;

/// One rotating log file shared by every record routed to it.
#[derive(Clone)]
struct SharedLogFile(Arc<Mutex<RotatingFile>>);

impl SharedLogFile {
    fn open(path: &Path, max_bytes: usize, max_files: usize) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = FileRotate::new(
            path,
            AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(file))))
    }
}

/// Writer handed to the fmt layer per record; `None` swallows the record.
struct LogFileHandle(Option<SharedLogFile>);

impl Write for LogFileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Picks the log file for a record by its target: a section named after the
/// target's crate wins over the default section.
#[derive(Clone, Default)]
struct LogFileRouter {
    fallback: Option<SharedLogFile>,
    per_crate: HashMap<String, SharedLogFile>,
}

impl LogFileRouter {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = Self::default();
        for (name, section) in cfg {
            let Some(file) = open_section_file(name, section, base_dir) else {
                continue;
            };
            if name == DEFAULT_SECTION {
                router.fallback = Some(file);
            } else {
                router.per_crate.insert(name.clone(), file);
            }
        }
        router
    }

    fn route(&self, target: &str) -> Option<&SharedLogFile> {
        self.per_crate
            .iter()
            .find_map(|(name, file)| target_in_crate(target, name).then_some(file))
            .or(self.fallback.as_ref())
    }

    fn has_files(&self) -> bool {
        self.fallback.is_some() || !self.per_crate.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for LogFileRouter {
    type Writer = LogFileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileHandle(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        LogFileHandle(self.route(meta.target()).cloned())
    }
}

/// Relative log paths live under `base_dir` (the resolved home_dir).
fn log_path_under(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Size at which a file rotates; huge values saturate instead of overflowing.
fn rotation_bytes(section: &LogSection) -> usize {
    let bytes = section
        .max_size_mb
        .unwrap_or(DEFAULT_MAX_SIZE_MB)
        .saturating_mul(1024 * 1024);
    usize::try_from(bytes).unwrap_or(usize::MAX)
}

fn open_section_file(name: &str, section: &LogSection, base_dir: &Path) -> Option<SharedLogFile> {
    let file = section.file.trim();
    if file.is_empty() {
        return None;
    }

    let path = log_path_under(base_dir, file);
    let max_files = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    SharedLogFile::open(&path, rotation_bytes(section), max_files)
        .map_err(|e| {
            // the subscriber is not installed yet, stderr is all we have
            eprintln!("Cannot open log file for '{name}' at {}: {e}", path.display());
        })
        .ok()
}

/// Per-crate level filter; crates without their own section follow "default".
fn targets_for<F>(cfg: &LoggingConfig, default: LevelFilter, level_of: F) -> Targets
where
    F: Fn(&LogSection) -> LevelFilter,
{
    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |targets, (name, section)| {
            targets.with_target(name.clone(), level_of(section))
        })
}

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::OFF, |s| parse_level(&s.console_level));
    targets_for(cfg, default, |s| parse_level(&s.console_level))
}

fn file_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .filter(|s| !s.file.trim().is_empty())
        .map_or(LevelFilter::OFF, |s| parse_level(&s.file_level));
    // a section without a file of its own writes into the default file
    targets_for(cfg, default, |s| {
        if s.file.trim().is_empty() {
            default
        } else {
            parse_level(&s.file_level)
        }
    })
}

/// Install the global subscriber: a human-readable stderr layer plus JSON
/// lines into rotating files, each filtered per crate section. Relative file
/// paths resolve against `base_dir`. Calling it twice keeps the first
/// subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // route `log` records from dependencies into tracing
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_writer(std::io::stderr)
            .with_max_level(LevelFilter::WARN)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = LogFileRouter::from_config(cfg, base_dir);
    let files = router.has_files().then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(file_targets(cfg))
    });

    let _ = Registry::default().with(console).with(files).try_init();
}
