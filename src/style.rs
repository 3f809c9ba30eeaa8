use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;
use time::Weekday;

/// One centimeter in PDF points
pub(crate) const CM: f32 = 72.0 / 2.54;

/// Day font size at which the cell geometry was tuned; cell backgrounds and
/// markers scale relative to it.
const REFERENCE_DAY_SIZE: f32 = 11.0;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(try_from = "RgbRepr")]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub(crate) const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub(crate) const RED: Rgb = Rgb::new(255, 0, 0);
    pub(crate) const GRAY: Rgb = Rgb::new(128, 128, 128);

    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`, as PDF color operators expect
    pub(crate) fn unit(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| f32::from(c) / 255.0)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Rgb, ParseColorError> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError(s.to_owned()))?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_owned()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_owned()))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid color {0:?}; expected \"#rrggbb\" or [r, g, b]")]
pub(crate) struct ParseColorError(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RgbRepr {
    Hex(String),
    Triple([u8; 3]),
}

impl TryFrom<RgbRepr> for Rgb {
    type Error = ParseColorError;

    fn try_from(repr: RgbRepr) -> Result<Rgb, ParseColorError> {
        match repr {
            RgbRepr::Hex(s) => s.parse(),
            RgbRepr::Triple([r, g, b]) => Ok(Rgb::new(r, g, b)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum FontStyle {
    Normal,
    #[default]
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub(crate) fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }
}

/// One of the twelve standard PDF text faces
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct FontFace {
    pub(crate) family: FontFamily,
    pub(crate) style: FontStyle,
}

impl FontFace {
    pub(crate) fn base_name(self) -> &'static str {
        use FontFamily::*;
        use FontStyle::*;
        match (self.family, self.style) {
            (Helvetica, Normal) => "Helvetica",
            (Helvetica, Bold) => "Helvetica-Bold",
            (Helvetica, Italic) => "Helvetica-Oblique",
            (Helvetica, BoldItalic) => "Helvetica-BoldOblique",
            (Times, Normal) => "Times-Roman",
            (Times, Bold) => "Times-Bold",
            (Times, Italic) => "Times-Italic",
            (Times, BoldItalic) => "Times-BoldItalic",
            (Courier, Normal) => "Courier",
            (Courier, Bold) => "Courier-Bold",
            (Courier, Italic) => "Courier-Oblique",
            (Courier, BoldItalic) => "Courier-BoldOblique",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Font {
    pub(crate) face: FontFace,
    pub(crate) size: f32,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Palette {
    pub(crate) background: Rgb,
    pub(crate) normal_text: Rgb,
    pub(crate) weekend_background: Rgb,
    pub(crate) holiday_background: Rgb,
    pub(crate) holiday_text: Rgb,
    pub(crate) saturday_text: Rgb,
    pub(crate) sunday_text: Rgb,
    pub(crate) week_number_text: Rgb,
    pub(crate) week_number_background: Rgb,
    pub(crate) equinox_circle: Rgb,
    pub(crate) moon_symbol: Rgb,
    pub(crate) birthday_square: Rgb,
}

impl Default for Palette {
    fn default() -> Palette {
        Palette {
            background: Rgb::WHITE,
            normal_text: Rgb::BLACK,
            weekend_background: Rgb::new(240, 240, 240),
            holiday_background: Rgb::new(255, 230, 230),
            holiday_text: Rgb::RED,
            saturday_text: Rgb::GRAY,
            sunday_text: Rgb::RED,
            week_number_text: Rgb::GRAY,
            week_number_background: Rgb::WHITE,
            equinox_circle: Rgb::new(0, 128, 255),
            moon_symbol: Rgb::new(76, 76, 153),
            birthday_square: Rgb::new(255, 191, 204),
        }
    }
}

/// Annotation passes; a disabled pass emits nothing at all.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Features {
    pub(crate) week_numbers: bool,
    pub(crate) holidays: bool,
    pub(crate) equinoxes: bool,
    pub(crate) moon_phases: bool,
    pub(crate) birthdays: bool,
}

impl Default for Features {
    fn default() -> Features {
        Features {
            week_numbers: true,
            holidays: true,
            equinoxes: false,
            moon_phases: false,
            birthdays: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StyleConfig {
    pub(crate) font_family: FontFamily,
    pub(crate) font_style: FontStyle,
    pub(crate) title_size: f32,
    pub(crate) day_size: f32,
    pub(crate) moon_size: f32,
    pub(crate) palette: Palette,
    pub(crate) features: Features,
}

impl Default for StyleConfig {
    fn default() -> StyleConfig {
        StyleConfig {
            font_family: FontFamily::default(),
            font_style: FontStyle::default(),
            title_size: 12.0,
            day_size: 11.0,
            moon_size: 10.0,
            palette: Palette::default(),
            features: Features::default(),
        }
    }
}

impl StyleConfig {
    /// Preset for the desktop widget strip: smaller type, near-white cells,
    /// and equinox and moon markers switched on
    pub(crate) fn widget() -> StyleConfig {
        StyleConfig {
            day_size: 10.0,
            moon_size: 8.0,
            palette: Palette {
                background: Rgb::new(250, 250, 250),
                weekend_background: Rgb::new(237, 237, 237),
                holiday_background: Rgb::new(255, 217, 217),
                week_number_background: Rgb::new(250, 250, 250),
                equinox_circle: Rgb::new(204, 51, 51),
                moon_symbol: Rgb::new(51, 51, 128),
                ..Palette::default()
            },
            features: Features {
                equinoxes: true,
                moon_phases: true,
                ..Features::default()
            },
            ..StyleConfig::default()
        }
    }

    pub(crate) fn face(&self) -> FontFace {
        FontFace {
            family: self.font_family,
            style: self.font_style,
        }
    }

    pub(crate) fn title_font(&self) -> Font {
        Font {
            face: self.face(),
            size: self.title_size,
        }
    }

    pub(crate) fn day_font(&self) -> Font {
        Font {
            face: self.face(),
            size: self.day_size,
        }
    }

    pub(crate) fn scale(&self) -> f32 {
        self.day_size / REFERENCE_DAY_SIZE
    }

    /// Background of a day cell: holiday highlight beats weekend shading
    /// beats the plain background.
    pub(crate) fn cell_background(&self, holiday: bool, weekday: Weekday) -> Rgb {
        if self.features.holidays && holiday {
            self.palette.holiday_background
        } else if is_weekend(weekday) {
            self.palette.weekend_background
        } else {
            self.palette.background
        }
    }

    /// Color of a day number: holiday beats Saturday beats Sunday beats
    /// normal text.
    pub(crate) fn day_text_color(&self, holiday: bool, weekday: Weekday) -> Rgb {
        if self.features.holidays && holiday {
            self.palette.holiday_text
        } else {
            match weekday {
                Weekday::Saturday => self.palette.saturday_text,
                Weekday::Sunday => self.palette.sunday_text,
                _ => self.palette.normal_text,
            }
        }
    }
}

pub(crate) fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!("#ff8000".parse::<Rgb>(), Ok(Rgb::new(255, 128, 0)));
        assert_eq!("#FFFFFF".parse::<Rgb>(), Ok(Rgb::WHITE));
        assert!("ff8000".parse::<Rgb>().is_err());
        assert!("#ff80".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_sign_is_not_a_hex_digit() {
        assert!("#+f+f+f".parse::<Rgb>().is_err());
        assert!("#-1ffff".parse::<Rgb>().is_err());
        assert_eq!("#4c4c99".parse::<Rgb>(), Ok(Rgb::new(76, 76, 153)));
    }

    #[test]
    fn test_base_names() {
        let face = FontFace {
            family: FontFamily::Times,
            style: FontStyle::BoldItalic,
        };
        assert_eq!(face.base_name(), "Times-BoldItalic");
        let face = FontFace {
            family: FontFamily::Helvetica,
            style: FontStyle::Italic,
        };
        assert_eq!(face.base_name(), "Helvetica-Oblique");
        assert_eq!(FontFace::default().base_name(), "Helvetica-Bold");
    }

    #[test]
    fn test_holiday_beats_weekend() {
        let style = StyleConfig::default();
        let p = style.palette;
        assert_eq!(style.cell_background(true, Weekday::Sunday), p.holiday_background);
        assert_eq!(style.day_text_color(true, Weekday::Saturday), p.holiday_text);
        assert_eq!(style.cell_background(false, Weekday::Sunday), p.weekend_background);
        assert_eq!(style.day_text_color(false, Weekday::Saturday), p.saturday_text);
        assert_eq!(style.day_text_color(false, Weekday::Sunday), p.sunday_text);
        assert_eq!(style.cell_background(false, Weekday::Monday), p.background);
        assert_eq!(style.day_text_color(false, Weekday::Monday), p.normal_text);
    }

    #[test]
    fn test_holiday_highlight_disabled() {
        let mut style = StyleConfig::default();
        style.features.holidays = false;
        let p = style.palette;
        assert_eq!(style.cell_background(true, Weekday::Monday), p.background);
        assert_eq!(style.cell_background(true, Weekday::Sunday), p.weekend_background);
        assert_eq!(style.day_text_color(true, Weekday::Wednesday), p.normal_text);
    }
}
