//! Progress logging for pipeline runs.
//!
//! Messages go through the [`log`] facade. The binary installs an
//! `env_logger` writing to stderr with [`format_record`] (see [`init`]), so
//! progress and skip reasons never mix with data printed on stdout, and they
//! keep the same prefixes when the pipeline is embedded in another program.

use std::io::Write;

/// Log target used for success lines (rendered with a check mark).
pub const SUCCESS_TARGET: &str = "ipc_split::success";

/// Log level for terminal display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Prefix printed before the message.
    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }

    fn from_record(record: &log::Record<'_>) -> Self {
        match record.level() {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            _ if record.target() == SUCCESS_TARGET => LogLevel::Success,
            _ => LogLevel::Info,
        }
    }
}

fn emit(level: LogLevel, msg: String, indent: u8) {
    let indent = "   ".repeat(indent as usize);
    match level {
        LogLevel::Info => log::info!("{}{}", indent, msg),
        LogLevel::Success => log::info!(target: SUCCESS_TARGET, "{}{}", indent, msg),
        LogLevel::Warning => log::warn!("{}{}", indent, msg),
        LogLevel::Error => log::error!("{}{}", indent, msg),
    }
}

/// `env_logger` format callback: `<prefix> <message>`.
pub fn format_record(buf: &mut env_logger::fmt::Formatter, record: &log::Record<'_>) -> std::io::Result<()> {
    let level = LogLevel::from_record(record);
    writeln!(buf, "{} {}", level.prefix(), record.args())
}

/// Install the progress logger: `RUST_LOG` filter (default `info`), stderr.
///
/// Stdout is reserved for command output such as the mapping JSON.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(format_record)
        .target(env_logger::Target::Stderr)
        .init();
}

pub fn log_info(msg: impl Into<String>) {
    emit(LogLevel::Info, msg.into(), 0);
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogLevel::Success, msg.into(), 0);
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogLevel::Warning, msg.into(), 0);
}

pub fn log_error(msg: impl Into<String>) {
    emit(LogLevel::Error, msg.into(), 0);
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    emit(LogLevel::Info, msg.into(), indent);
}
