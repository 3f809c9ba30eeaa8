use crate::style::{Rgb, StyleConfig};
use ratatui::style::{Color, Modifier, Style};
use time::Weekday;

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEK_NUMBER_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// What is known about a day when styling it in the terminal
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DayMarks {
    pub(crate) holiday: bool,
    pub(crate) equinox: bool,
    pub(crate) birthday: bool,
}

/// Terminal style of a day number.  Paper colors carry over for the text
/// (black is shown as the terminal's base color); the equinox circle and
/// birthday square become underlining and reverse video.
pub(crate) fn day_style(style: &StyleConfig, weekday: Weekday, marks: DayMarks) -> Style {
    let fg = style.day_text_color(marks.holiday, weekday);
    let mut s = if fg == style.palette.normal_text {
        BASE_STYLE
    } else {
        BASE_STYLE.fg(color(fg))
    };
    if style.features.holidays && marks.holiday {
        s = s.add_modifier(Modifier::BOLD);
    }
    if style.features.equinoxes && marks.equinox {
        s = s.add_modifier(Modifier::UNDERLINED);
    }
    if style.features.birthdays && marks.birthday {
        s = s.add_modifier(Modifier::REVERSED);
    }
    s
}

pub(crate) fn moon_style(style: &StyleConfig) -> Style {
    BASE_STYLE.fg(color(style.palette.moon_symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_style() {
        let mut style = StyleConfig::default();
        style.features.equinoxes = true;
        let plain = DayMarks::default();
        assert_eq!(day_style(&style, Weekday::Monday, plain), BASE_STYLE);
        assert_eq!(
            day_style(&style, Weekday::Saturday, plain),
            BASE_STYLE.fg(Color::Rgb(128, 128, 128))
        );
        let holiday = DayMarks {
            holiday: true,
            ..plain
        };
        assert_eq!(
            day_style(&style, Weekday::Saturday, holiday),
            BASE_STYLE.fg(Color::Rgb(255, 0, 0)).add_modifier(Modifier::BOLD)
        );
        let marked = DayMarks {
            equinox: true,
            birthday: true,
            ..plain
        };
        // Birthdays are disabled by default
        assert_eq!(
            day_style(&style, Weekday::Tuesday, marked),
            BASE_STYLE.add_modifier(Modifier::UNDERLINED)
        );
    }
}
