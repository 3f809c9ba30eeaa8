use flexi_logger::{FileSpec, FlexiLoggerError, Logger, LoggerHandle};
use std::path::PathBuf;

/// Log specification for the given number of `-v` flags.  Dependencies only
/// ever log at `warn` and above.
pub(crate) fn log_spec(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Starts logging to stderr, or to `log_file` if given.  When the terminal
/// is taken over by the preview and no file is given, nothing is logged.
/// `RUST_LOG` overrides the verbosity.  The returned handle must be kept
/// alive for as long as logging is needed.
pub(crate) fn init(
    verbosity: u8,
    log_file: Option<PathBuf>,
    fullscreen: bool,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let mut logger = Logger::try_with_env_or_str(log_spec(verbosity))?;
    match log_file {
        Some(path) => logger = logger.log_to_file(FileSpec::try_from(path)?).print_message(),
        None if fullscreen => logger = logger.do_not_log(),
        None => (),
    }
    logger.start()
}
