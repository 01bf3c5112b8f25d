use crate::config::{LoggingConfig, Section};
use file_rotate::{
    compression::Compression,
    suffix::AppendCount,
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 20;
const DEFAULT_MAX_BACKUPS: usize = 5;

// -------- level helpers --------

fn parse_level_filter(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" | "" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Per-target filter: the `default` section sets the fallback level and every
/// other section overrides the level for its own target prefix.
fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> &str) -> Targets {
    let default_level = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level_filter(level_of(s)))
        .unwrap_or(LevelFilter::INFO);

    cfg.iter()
        .filter(|(target, _)| target.as_str() != DEFAULT_SECTION)
        .fold(
            Targets::new().with_default(default_level),
            |targets, (target, section)| {
                targets.with_target(target.clone(), parse_level_filter(level_of(section)))
            },
        )
}

/// `RUST_LOG`, when set and parseable, wins over the configured console levels.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| raw.parse::<Targets>().ok())
        .unwrap_or_else(|| build_targets(cfg, |s| s.console_level.as_str()))
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendCount>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

struct RotWriterHandle(Arc<Mutex<FileRotate<AppendCount>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

// -------- path resolution helpers --------

/// Absolute paths are kept; relative paths are joined onto `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendCount::new(max_backups),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn file_writer(cfg: &LoggingConfig, base_dir: &Path) -> Option<RotWriter> {
    let section = cfg.get(DEFAULT_SECTION)?;
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_backups) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to initialize log file '{}': {e}",
                log_path.to_string_lossy()
            );
            None
        }
    }
}

// -------- public init --------

/// Install the global tracing subscriber.
///
/// Console output is human readable (colored on a terminal). When the
/// `default` section names a file, JSON lines including the active span
/// stack are written there as well, rotated by size.
/// `base_dir` anchors relative log paths (usually `server.home_dir`).
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` records (sqlx, sea-orm internals) before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    let console_layer = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let file_layer = file_writer(cfg, base_dir).map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_current_span(true)
            .with_span_list(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer)
            .with_filter(build_targets(cfg, |s| s.file_level.as_str()))
    });

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use std::fs;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_level_filter("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level_filter("Info"), LevelFilter::INFO);
        assert_eq!(parse_level_filter("warn"), LevelFilter::WARN);
        assert_eq!(parse_level_filter("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level_filter("off"), LevelFilter::OFF);
        assert_eq!(parse_level_filter("none"), LevelFilter::OFF);
        assert_eq!(parse_level_filter(""), LevelFilter::INFO);
        assert_eq!(parse_level_filter("loud"), LevelFilter::INFO);
    }

    #[test]
    fn targets_use_default_section_and_per_crate_overrides() {
        let mut cfg = default_logging_config();
        cfg.insert("sqlx".into(), section("warn", "", "error"));

        let console = build_targets(&cfg, |s| s.console_level.as_str());
        assert!(console.would_enable("products::domain", &tracing::Level::INFO));
        assert!(!console.would_enable("products::domain", &tracing::Level::DEBUG));
        assert!(!console.would_enable("sqlx::query", &tracing::Level::INFO));
        assert!(console.would_enable("sqlx::query", &tracing::Level::WARN));

        let file = build_targets(&cfg, |s| s.file_level.as_str());
        assert!(file.would_enable("products::domain", &tracing::Level::DEBUG));
        assert!(!file.would_enable("sqlx::query", &tracing::Level::WARN));
    }

    #[test]
    fn missing_default_section_falls_back_to_info() {
        let cfg = LoggingConfig::new();
        let targets = build_targets(&cfg, |s| s.console_level.as_str());
        assert!(targets.would_enable("anything", &tracing::Level::INFO));
        assert!(!targets.would_enable("anything", &tracing::Level::DEBUG));
    }

    #[test]
    fn file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let absolute = tmp.path().join("abs.log");
        let kept = resolve_log_path(&absolute.to_string_lossy(), Path::new("/elsewhere"));
        assert_eq!(kept, absolute);
    }

    #[test]
    fn rotating_writer_creates_parent_and_writes() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let writer = create_rotating_writer_at_path(&p, 128 * 1024, 2).unwrap();
        let mut handle = fmt::MakeWriter::make_writer(&writer);
        handle.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        handle.flush().unwrap();

        assert!(p.parent().unwrap().is_dir());
        assert!(fs::read_to_string(&p).unwrap().contains("hello"));
    }

    #[test]
    fn empty_file_disables_file_output() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "  ", "debug"));
        assert!(file_writer(&cfg, tmp.path()).is_none());

        cfg.insert("default".into(), section("info", "logs/catalog.log", "debug"));
        assert!(file_writer(&cfg, tmp.path()).is_some());
    }

    #[test]
    fn config_logging_integration_with_base_dir() {
        let tmp = tempdir().unwrap();
        let config_path = tmp.path().join("cfg.yaml");
        let yaml = format!(
            r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 3000

logging:
  default:
    console_level: info
    file: "logs/catalog.log"
    file_level: debug
  sea_orm:
    console_level: warn
"#,
            tmp.path().join("home").to_string_lossy().replace('\\', "/")
        );
        fs::write(&config_path, yaml).unwrap();

        let config = AppConfig::load_layered(&config_path).unwrap();
        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["sea_orm"].file, "");

        let abs = resolve_log_path(&logging["default"].file, &config.home_dir());
        assert!(abs.starts_with(&config.server.home_dir));
        assert!(abs.ends_with("logs/catalog.log"));
    }
}
