use crate::annotations::AnnotationSettings;
use crate::holidays::HolidayPreset;
use crate::layout::{Format, StripGeometry};
use crate::style::{StyleConfig, CM};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Month;

const CONFIG_PATH_ENV_VAR: &str = "CALPRINT_CONFIG";

/// Candidate configuration files, most specific first
pub(crate) fn find_config_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(path) = env::var_os(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("calprint").join("config.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".calprint.toml"));
    }
    locations
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) year: Option<i32>,
    pub(crate) format: Format,
    pub(crate) output: Option<PathBuf>,
    pub(crate) style: StyleConfig,
    pub(crate) holidays: HolidayConfig,
    /// Month → comma-separated day list
    pub(crate) birthdays: BTreeMap<String, String>,
    /// Month → `"day:phase"` entries replacing the computed phases
    pub(crate) moon_phases: BTreeMap<String, Vec<String>>,
    pub(crate) strip: StripConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HolidayConfig {
    pub(crate) preset: HolidayPreset,
    /// Month → preset days to leave unmarked
    pub(crate) exclude: BTreeMap<String, Vec<u8>>,
    /// Month → comma-separated list of extra days
    pub(crate) custom: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StripConfig {
    pub(crate) months: u8,
    pub(crate) page_width_cm: f32,
    pub(crate) month_height_cm: f32,
    pub(crate) top_margin_cm: f32,
    pub(crate) x_cm: f32,
    pub(crate) y_nudge_cm: f32,
    pub(crate) png: bool,
    pub(crate) dpi: u32,
    pub(crate) transparent: bool,
    pub(crate) threshold: u8,
    /// Regenerate the strip every this many seconds
    pub(crate) refresh_secs: Option<u64>,
    /// Styling of the strip, separate from the top-level `[style]`.  Keys
    /// missing from a `[strip.style]` table take the regular style defaults.
    pub(crate) style: StyleConfig,
}

impl Default for StripConfig {
    fn default() -> StripConfig {
        StripConfig {
            months: 6,
            page_width_cm: 8.0,
            month_height_cm: 5.5,
            top_margin_cm: 0.8,
            x_cm: 0.3,
            y_nudge_cm: 0.5,
            png: false,
            dpi: 200,
            transparent: true,
            threshold: 248,
            refresh_secs: None,
            style: StyleConfig::widget(),
        }
    }
}

impl StripConfig {
    pub(crate) fn geometry(&self) -> StripGeometry {
        StripGeometry {
            months: self.months,
            page_width: self.page_width_cm * CM,
            month_height: self.month_height_cm * CM,
            top_margin: self.top_margin_cm * CM,
            x: self.x_cm * CM,
            y_nudge: self.y_nudge_cm * CM,
        }
    }

}

impl Config {
    /// Loads the configuration from `path` if given, else from the first
    /// existing file among the default locations.  With no file at all, the
    /// defaults are used.
    pub(crate) fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match find_config_locations().into_iter().find(|p| p.is_file()) {
                Some(p) => p,
                None => {
                    log::debug!("No configuration file found; using defaults");
                    return Ok(Config::default());
                }
            },
        };
        log::debug!("Reading configuration from {}", path.display());
        let src = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Config::from_toml(&src).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn from_toml(src: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(src)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        validate_style("style", &self.style)?;
        validate_style("strip.style", &self.strip.style)?;
        let strip = &self.strip;
        if strip.months == 0 {
            return Err(ConfigError::Invalid(
                "strip.months must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("strip.page_width_cm", strip.page_width_cm),
            ("strip.month_height_cm", strip.month_height_cm),
        ] {
            positive(name, value)?;
        }
        for (name, value) in [
            ("strip.top_margin_cm", strip.top_margin_cm),
            ("strip.x_cm", strip.x_cm),
            ("strip.y_nudge_cm", strip.y_nudge_cm),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be a number")));
            }
        }
        if strip.dpi == 0 {
            return Err(ConfigError::Invalid("strip.dpi must be at least 1".into()));
        }
        if strip.refresh_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "strip.refresh_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Collects the annotation inputs, keyed by month number.  Entries under
    /// an unrecognized month name are skipped with a warning.
    pub(crate) fn annotation_settings(&self) -> AnnotationSettings {
        AnnotationSettings {
            holiday_preset: self.holidays.preset,
            excluded_holidays: by_month("holidays.exclude", &self.holidays.exclude),
            custom_holidays: by_month("holidays.custom", &self.holidays.custom),
            birthdays: by_month("birthdays", &self.birthdays),
            moon_overrides: by_month("moon_phases", &self.moon_phases),
        }
    }
}

fn validate_style(section: &str, style: &StyleConfig) -> Result<(), ConfigError> {
    positive(&format!("{section}.title_size"), style.title_size)?;
    positive(&format!("{section}.day_size"), style.day_size)?;
    positive(&format!("{section}.moon_size"), style.moon_size)?;
    Ok(())
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn by_month<T: Clone>(section: &str, entries: &BTreeMap<String, T>) -> BTreeMap<u8, T> {
    entries
        .iter()
        .filter_map(|(key, value)| match parse_month_key(key) {
            Some(month) => Some((u8::from(month), value.clone())),
            None => {
                log::warn!("Ignoring [{section}] entry for unknown month {key:?}");
                None
            }
        })
        .collect()
}

/// Parses a month given as a number (`"3"`), an English name (`"march"`), or
/// a three-letter abbreviation (`"Mar"`)
pub(crate) fn parse_month_key(key: &str) -> Option<Month> {
    let key = key.trim();
    if let Ok(n) = key.parse::<u8>() {
        return Month::try_from(n).ok();
    }
    let key = key.to_ascii_lowercase();
    (1..=12)
        .filter_map(|n| Month::try_from(n).ok())
        .find(|m| {
            let name = m.to_string().to_ascii_lowercase();
            name == key || (key.len() == 3 && name.starts_with(&key))
        })
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
