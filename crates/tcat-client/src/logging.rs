//! Diagnostics on stderr. Stdout belongs to the command loop.

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Dependencies held at `warn` unless tracing everything.
const CHATTY_DEPENDENCIES: &[&str] = &["btleplug", "rustls"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Filter directives for `--log-level`: the level itself, then a cap on
    /// the chatty dependencies.
    pub fn directives(self) -> Vec<String> {
        let mut directives = vec![self.as_str().to_string()];
        if self != Self::Trace {
            let cap = if self == Self::Error { "error" } else { "warn" };
            directives.extend(
                CHATTY_DEPENDENCIES
                    .iter()
                    .map(|name| format!("{name}={cap}")),
            );
        }
        directives
    }
}

/// A non-empty `RUST_LOG` value replaces the level directives entirely.
pub fn build_filter(level: LogLevel, rust_log: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(level.level_filter().into());
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => builder.parse_lossy(directives),
        _ => builder.parse_lossy(level.directives().join(",")),
    }
}

pub fn init_logging(format: LogFormat, level: LogLevel) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level, rust_log.as_deref()))
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
