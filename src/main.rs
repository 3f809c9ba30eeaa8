mod annotations;
mod app;
mod calendar;
mod config;
mod generate;
mod help;
mod holidays;
mod layout;
mod logging;
mod moon;
mod raster;
mod render;
mod style;
mod theme;
use crate::annotations::AnnotationBook;
use crate::app::App;
use crate::calendar::{MonthRef, MonthWindow};
use crate::config::Config;
use crate::layout::Format;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fmt;
use std::num::{NonZeroU64, NonZeroU8, NonZeroUsize};
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset,
};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Mode {
    #[default]
    Pdf,
    Strip,
    Preview,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Pdf => "pdf",
            Mode::Strip => "strip",
            Mode::Preview => "preview",
        };
        f.write_str(s)
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Mode, ParseModeError> {
        match s {
            "pdf" => Ok(Mode::Pdf),
            "strip" => Ok(Mode::Strip),
            "preview" => Ok(Mode::Preview),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid mode {0:?}; expected \"pdf\", \"strip\", or \"preview\"")]
struct ParseModeError(String);

/// Command-line settings.  Anything given here takes precedence over the
/// configuration file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    year: Option<i32>,
    format: Option<Format>,
    output: Option<PathBuf>,
    months: Option<NonZeroU8>,
    png: bool,
    watch: Option<NonZeroU64>,
    date: Option<Date>,
    verbosity: u8,
    log_file: Option<PathBuf>,
}

impl Options {
    fn apply_to(&self, config: &mut Config) {
        if let Some(year) = self.year {
            config.year = Some(year);
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(months) = self.months {
            config.strip.months = months.get();
        }
        if self.png {
            config.strip.png = true;
        }
        if let Some(secs) = self.watch {
            config.strip.refresh_secs = Some(secs.get());
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run { mode: Mode, options: Options },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut mode = None;
        let mut options = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    options.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('y') | Arg::Long("year") => {
                    options.year = Some(parser.value()?.parse()?);
                }
                Arg::Short('f') | Arg::Long("format") => {
                    options.format = Some(parser.value()?.parse()?);
                }
                Arg::Short('o') | Arg::Long("output") => {
                    options.output = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('n') | Arg::Long("months") => {
                    options.months = Some(parser.value()?.parse()?);
                }
                Arg::Long("png") => options.png = true,
                Arg::Long("watch") => options.watch = Some(parser.value()?.parse()?),
                Arg::Short('d') | Arg::Long("date") => {
                    options.date = Some(
                        parser
                            .value()?
                            .parse_with(|s| Date::parse(s, &YMD_FMT))?,
                    );
                }
                Arg::Short('v') | Arg::Long("verbose") => {
                    options.verbosity = options.verbosity.saturating_add(1);
                }
                Arg::Long("log-file") => options.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if mode.is_none() => mode = Some(value.parse()?),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            mode: mode.unwrap_or_default(),
            options,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run { mode, options } => run(mode, &options),
            Command::Help => {
                println!("Usage: calprint [OPTIONS] [pdf|strip|preview]");
                println!();
                println!("Printable year calendars with holidays, week numbers & moon phases");
                println!();
                println!("Modes:");
                println!("  pdf       Write the yearly PDFs (default)");
                println!("  strip     Write a strip of upcoming months for desktop widgets");
                println!("  preview   Show the strip of upcoming months in the terminal");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>      Read configuration from FILE");
                println!("  -y, --year <YEAR>        Calendar year [default: current year]");
                println!("  -f, --format <FORMAT>    paged, sheet, or both [default: both]");
                println!("  -o, --output <DIR>       Write files to DIR [default: .]");
                println!("  -n, --months <N>         Number of months in the strip");
                println!("      --png                Also render the strip as a PNG");
                println!("      --watch <SECS>       Regenerate the strip every SECS seconds");
                println!("  -d, --date <YYYY-MM-DD>  Use the given date as today");
                println!("  -v, --verbose            Log more details; repeat for more");
                println!("      --log-file <FILE>    Write log messages to FILE");
                println!("  -h, --help               Display this help message and exit");
                println!("  -V, --version            Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn run(mode: Mode, options: &Options) -> anyhow::Result<()> {
    // Must be determined before anything has a chance to spawn a thread
    let offset = UtcOffset::current_local_offset();
    let _logger = logging::init(
        options.verbosity,
        options.log_file.clone(),
        mode == Mode::Preview,
    )
    .context("failed to initialize logging")?;
    let offset = offset.unwrap_or_else(|e| {
        log::warn!("Could not determine local time zone ({e}); using UTC");
        UtcOffset::UTC
    });
    let today = || {
        options
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().to_offset(offset).date())
    };
    let mut config = Config::load(options.config.as_deref())?;
    options.apply_to(&mut config);
    log::debug!("Running in {mode} mode");
    let mut book = AnnotationBook::new(config.annotation_settings());
    let dir = config.output.clone().unwrap_or_else(|| PathBuf::from("."));
    match mode {
        Mode::Pdf => {
            let year = config.year.unwrap_or_else(|| today().year());
            for path in generate::year_pdfs(year, config.format, &dir, &mut book, &config.style)? {
                println!("Successfully generated: {}", path.display());
            }
        }
        Mode::Strip => {
            let style = &config.strip.style;
            loop {
                let start = MonthRef::containing(today());
                for path in generate::strip_files(start, &config.strip, &dir, &mut book, style)? {
                    println!("Successfully generated: {}", path.display());
                }
                let Some(secs) = config.strip.refresh_secs else {
                    break;
                };
                log::info!("Regenerating strip in {secs} seconds");
                thread::sleep(Duration::from_secs(secs));
            }
        }
        Mode::Preview => {
            let months = NonZeroUsize::from(
                NonZeroU8::new(config.strip.months).unwrap_or(NonZeroU8::MIN),
            );
            let style = config.strip.style.clone();
            let window = MonthWindow::new(today(), months);
            with_terminal(|mut terminal| {
                terminal.hide_cursor().context("failed to hide cursor")?;
                App::new(window, book, style, offset).run(&mut terminal)?;
                Ok(())
            })?;
        }
    }
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_args(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            parse(&[]).unwrap(),
            Command::Run {
                mode: Mode::Pdf,
                options: Options::default()
            }
        );
    }

    #[test]
    fn test_pdf_options() {
        let cmd = parse(&["-y", "2027", "--format", "sheet", "-o", "out", "-vv", "pdf"]).unwrap();
        assert_eq!(
            cmd,
            Command::Run {
                mode: Mode::Pdf,
                options: Options {
                    year: Some(2027),
                    format: Some(Format::Sheet),
                    output: Some(PathBuf::from("out")),
                    verbosity: 2,
                    ..Options::default()
                }
            }
        );
    }

    #[test]
    fn test_strip_options() {
        let cmd = parse(&[
            "strip",
            "--png",
            "-n",
            "4",
            "--watch",
            "600",
            "--date",
            "2026-11-03",
            "--log-file",
            "strip.log",
        ])
        .unwrap();
        let Command::Run { mode, options } = cmd else {
            panic!("expected a run command, got {cmd:?}");
        };
        assert_eq!(mode, Mode::Strip);
        assert!(options.png);
        assert_eq!(options.months, NonZeroU8::new(4));
        assert_eq!(options.watch, NonZeroU64::new(600));
        assert_eq!(options.date, Some(date!(2026 - 11 - 03)));
        assert_eq!(options.log_file, Some(PathBuf::from("strip.log")));
    }

    #[test]
    fn test_help_and_version_win() {
        assert_eq!(parse(&["preview", "-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["--version", "--bogus"]).unwrap(), Command::Version);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse(&["calendar"]).is_err());
        assert!(parse(&["pdf", "strip"]).is_err());
        assert!(parse(&["-f", "poster"]).is_err());
        assert!(parse(&["-n", "0"]).is_err());
        assert!(parse(&["--watch", "0"]).is_err());
        assert!(parse(&["--date", "2026-13-01"]).is_err());
        assert!(parse(&["-y"]).is_err());
    }

    #[test]
    fn test_options_override_config() {
        let mut config = Config::from_toml("year = 2025\nformat = \"paged\"\n").unwrap();
        let options = Options {
            format: Some(Format::Sheet),
            months: NonZeroU8::new(3),
            png: true,
            ..Options::default()
        };
        options.apply_to(&mut config);
        assert_eq!(config.year, Some(2025));
        assert_eq!(config.format, Format::Sheet);
        assert_eq!(config.strip.months, 3);
        assert!(config.strip.png);
        assert_eq!(config.strip.refresh_secs, None);
    }
}
