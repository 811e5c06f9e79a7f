use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Log levels accepted on the command line and by the scan service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[default]
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    /// Nothing in this crate logs above error, so this shows errors only.
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
        }
    }

    /// `RUST_LOG` still wins when set.
    fn env_filter(self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.level_filter().into())
            .from_env_lossy()
    }
}

/// Changes the global log level after [`init`].
#[derive(Clone)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    pub fn set_level(&self, level: LogLevel) -> Result<()> {
        self.handle
            .reload(level.env_filter())
            .context("failed to reload log filter")
    }
}

/// Install the global subscriber: colored one-line events on stderr at `level`.
pub fn init(level: LogLevel) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(level.env_filter());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(ScanFormatter),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(LogHandle { handle })
}

pub struct ScanFormatter;

impl<S, N> FormatEvent<S, N> for ScanFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match *event.metadata().level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

        write!(writer, "{} ", color_func(symbol.into()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
