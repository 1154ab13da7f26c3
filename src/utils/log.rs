// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{fmt as std_fmt, fs::create_dir_all, io::Write, path::Path};

use anyhow::Result;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

struct SimpleFormatter;

impl<S, N> FormatEvent<S, N> for SimpleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let level = *event.metadata().level();
        write!(
            writer,
            "{} [{}] ",
            chrono::Local::now().format("%m-%d %H:%M:%S%.3f"),
            level
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber. Keep the returned guard alive for as long
/// as the file log should be flushed.
pub fn init_logging(verbose: bool, log_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let mut guard = None;

    let file_layer = if let Some(path) = log_path {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
        let directory = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Invalid log directory"))?;
        create_dir_all(directory)?;

        let file_appender = tracing_appender::rolling::never(directory, file_name);
        let (non_blocking, g) = tracing_appender::non_blocking(file_appender);
        guard = Some(g);

        Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .event_format(SimpleFormatter),
        )
    } else {
        None
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // The `log` facade has a single owner: logcat on Android, the subscriber
    // below everywhere else.
    install_log_bridge(verbose)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    if let Some(path) = log_path {
        install_panic_hook(path);
    }

    Ok(guard)
}

fn log_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

#[cfg(target_os = "android")]
fn install_log_bridge(verbose: bool) -> Result<()> {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log_level(verbose))
            .with_tag(crate::defs::LOG_TAG),
    );
    Ok(())
}

#[cfg(not(target_os = "android"))]
fn install_log_bridge(verbose: bool) -> Result<()> {
    use anyhow::Context;

    tracing_log::LogTracer::builder()
        .with_max_level(log_level(verbose))
        .init()
        .context("failed to bridge log records into tracing")
}

fn install_panic_hook(path: &Path) {
    let log_path_buf = path.to_path_buf();
    std::panic::set_hook(Box::new(move |info| {
        let msg = match info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<Any>",
            },
        };

        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();

        let error_msg = format!("\n[ERROR] PANIC: Thread crashed at {}: {}\n", location, msg);

        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path_buf)
        {
            let _ = writeln!(file, "{}", error_msg);
        }

        eprintln!("{}", error_msg);
    }));
}
