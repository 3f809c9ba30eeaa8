use super::util::{MonthGrid, WeekdayExt};
use super::window::MonthWindow;
use crate::annotations::AnnotationBook;
use crate::style::StyleConfig;
use crate::theme::{
    day_style, moon_style, DayMarks, TITLE_STYLE, WEEKDAY_STYLE, WEEK_NUMBER_STYLE,
};
use ratatui::{prelude::*, widgets::*};
use time::Weekday;

static HEADER: &str = " Wk  Mo   Tu   We   Th   Fr   Sa   Su ";

/// Columns taken up by the week number and its gutter
const WEEK_NUMBER_WIDTH: u16 = 4;

/// Columns per day: an opening bracket, two digits, a closing bracket, and
/// the moon glyph
const DAY_WIDTH: u16 = 5;

const TOTAL_WIDTH: u16 = WEEK_NUMBER_WIDTH + DAY_WIDTH * 7;

/// Lines above the first week of a month: the title and the weekday header
const HEADER_LINES: u16 = 2;

/// Blank lines after each month
const MONTH_GAP: u16 = 1;

/// A vertical strip of month grids starting at the window's first month
#[derive(Debug)]
pub(crate) struct Calendar<'a> {
    book: &'a mut AnnotationBook,
    style: &'a StyleConfig,
}

impl<'a> Calendar<'a> {
    pub(crate) fn new(book: &'a mut AnnotationBook, style: &'a StyleConfig) -> Calendar<'a> {
        Calendar { book, style }
    }
}

impl StatefulWidget for Calendar<'_> {
    type State = MonthWindow;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let left = area.width.saturating_sub(TOTAL_WIDTH) / 2;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(left),
                Constraint::Length(TOTAL_WIDTH.min(area.width)),
                Constraint::Min(0),
            ])
            .split(area);
        let mut canvas = BufferCanvas::new(chunks[1], buf);
        let today = state.today();
        let mut top = 0u16;
        for month in state.months() {
            if top >= canvas.area.height {
                break;
            }
            let grid = MonthGrid::new(month);
            let annotations = self.book.for_year(month.year());
            let title = format!("{} {}", month.month(), month.year());
            canvas.draw_centered(top, &title, TITLE_STYLE);
            canvas.mvprint(top + 1, 0, HEADER, WEEKDAY_STYLE);
            for (row, week) in std::iter::zip(0u16.., grid.weeks()) {
                let y = top + HEADER_LINES + row;
                if self.style.features.week_numbers {
                    canvas.mvprint(
                        y,
                        0,
                        format!("{:>3}", week.iso_week()),
                        WEEK_NUMBER_STYLE,
                    );
                }
                for (weekday, day) in week.enumerate() {
                    let m = month.month();
                    let marks = DayMarks {
                        holiday: annotations.holidays.contains(m, day),
                        equinox: annotations.astronomical.contains(m, day),
                        birthday: annotations.birthdays.contains(m, day),
                    };
                    let is_today = month.contains(today) && today.day() == day;
                    let style = day_style(self.style, weekday, marks);
                    canvas.draw_day(y, weekday, day, is_today, style);
                    if self.style.features.moon_phases {
                        if let Some(phase) = annotations.moon_phases.get(m, day) {
                            canvas.draw_moon(y, weekday, phase.symbol(), moon_style(self.style));
                        }
                    }
                }
            }
            top = top
                .saturating_add(HEADER_LINES)
                .saturating_add(u16::try_from(grid.weeks().len()).unwrap_or(u16::MAX))
                .saturating_add(MONTH_GAP);
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_centered(&mut self, y: u16, s: &str, style: Style) {
        let width = u16::try_from(Span::raw(s).width()).unwrap_or(u16::MAX);
        self.mvprint(y, TOTAL_WIDTH.saturating_sub(width) / 2, s, style);
    }

    fn draw_day(&mut self, y: u16, wd: Weekday, day: u8, today: bool, style: Style) {
        let x = WEEK_NUMBER_WIDTH + DAY_WIDTH * u16::from(wd.index0());
        let s = if today {
            format!("[{day:>2}]")
        } else {
            format!(" {day:>2} ")
        };
        self.mvprint(y, x, s, style);
    }

    fn draw_moon(&mut self, y: u16, wd: Weekday, glyph: char, style: Style) {
        let x = WEEK_NUMBER_WIDTH + DAY_WIDTH * u16::from(wd.index0()) + DAY_WIDTH - 1;
        self.mvprint(y, x, glyph.to_string(), style);
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text running past the calendar's area,
            // provided the Rect given to it lies entirely within the frame.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationSettings;
    use crate::theme::BASE_STYLE;
    use std::num::NonZeroUsize;
    use time::macros::date;

    fn render(window: &mut MonthWindow, style: &StyleConfig, area: Rect) -> Buffer {
        let mut book = AnnotationBook::new(AnnotationSettings::default());
        let mut buf = Buffer::empty(area);
        buf.set_style(area, BASE_STYLE);
        Calendar::new(&mut book, style).render(area, &mut buf, window);
        buf
    }

    fn line(buf: &Buffer, y: u16) -> String {
        let area = buf.area;
        (area.x..area.x + area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    fn window(today: time::Date, len: usize) -> MonthWindow {
        MonthWindow::new(today, NonZeroUsize::new(len).unwrap())
    }

    #[test]
    fn test_single_month() {
        let mut w = window(date!(2026 - 10 - 19), 1);
        let buf = render(&mut w, &StyleConfig::default(), Rect::new(0, 0, 39, 9));
        let lines = (0..9).map(|y| line(&buf, y)).collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                "             October 2026",
                " Wk  Mo   Tu   We   Th   Fr   Sa   Su",
                " 40                  1    2    3    4",
                " 41   5    6    7    8    9   10   11",
                " 42  12   13   14   15   16   17   18",
                " 43 [19]  20   21   22   23   24   25",
                " 44  26   27   28   29   30   31",
                "",
                "",
            ]
        );
    }

    #[test]
    fn test_window_continues_into_next_year() {
        let mut w = window(date!(2026 - 12 - 02), 2);
        let buf = render(&mut w, &StyleConfig::default(), Rect::new(0, 0, 39, 20));
        assert_eq!(line(&buf, 0), "             December 2026");
        // December 2026 spans five weeks
        assert_eq!(line(&buf, 8), "             January 2027");
        assert_eq!(line(&buf, 10), " 53                       1    2    3");
    }

    #[test]
    fn test_day_styles() {
        let mut style = StyleConfig::default();
        style.features.equinoxes = true;
        let mut w = window(date!(2026 - 06 - 01), 1);
        let buf = render(&mut w, &style, Rect::new(0, 0, 39, 9));
        // June 1 is Children's Day, on a Monday
        let cell = &buf[(6, 2)];
        assert_eq!(cell.symbol(), "1");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert!(cell.modifier.contains(Modifier::BOLD));
        // June 21 is the solstice, on a Sunday
        let cell = &buf[(36, 4)];
        assert_eq!(cell.symbol(), "1");
        assert!(cell.modifier.contains(Modifier::UNDERLINED));
        // June 6 is a plain Saturday
        let cell = &buf[(31, 2)];
        assert_eq!(cell.symbol(), "6");
        assert_eq!(cell.fg, Color::Rgb(128, 128, 128));
    }

    #[test]
    fn test_moon_glyphs() {
        let mut style = StyleConfig::default();
        let mut w = window(date!(2026 - 01 - 10), 1);
        let buf = render(&mut w, &style, Rect::new(0, 0, 39, 9));
        assert!(!(0..9).any(|y| line(&buf, y).contains('○')));
        style.features.moon_phases = true;
        let buf = render(&mut w, &style, Rect::new(0, 0, 39, 9));
        // Full moon on Saturday the 3rd, last quarter on Saturday the 10th
        assert_eq!(line(&buf, 2), "  1                  1    2    3 ○  4");
        assert!(line(&buf, 3).ends_with("[10]◐ 11"));
    }

    #[test]
    fn test_centered_in_wide_area() {
        let mut w = window(date!(2026 - 10 - 19), 1);
        let buf = render(&mut w, &StyleConfig::default(), Rect::new(0, 0, 79, 3));
        assert_eq!(line(&buf, 1), format!("{}{HEADER}", " ".repeat(20)).trim_end());
    }
}
