use crate::annotations::AnnotationBook;
use crate::calendar::{Calendar, MonthWindow};
use crate::help::Help;
use crate::style::StyleConfig;
use crate::theme::BASE_STYLE;
use crossterm::event::{poll, read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::Duration;
use time::{Date, OffsetDateTime, UtcOffset};

/// How long to wait for input before checking whether the date has changed
const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub(crate) struct App {
    window: MonthWindow,
    book: AnnotationBook,
    style: StyleConfig,
    offset: UtcOffset,
    state: AppState,
}

impl App {
    pub(crate) fn new(
        window: MonthWindow,
        book: AnnotationBook,
        style: StyleConfig,
        offset: UtcOffset,
    ) -> App {
        App {
            window,
            book,
            style,
            offset,
            state: AppState::Calendar,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            if poll(TICK)? {
                self.handle_input()?;
            } else {
                self.refresh();
            }
        }
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Calendar => match key {
                KeyCode::Char('j') | KeyCode::Down => self.window.one_month_forwards().is_ok(),
                KeyCode::Char('k') | KeyCode::Up => self.window.one_month_backwards().is_ok(),
                KeyCode::Char('z') | KeyCode::PageDown => self.window.one_page_forwards().is_ok(),
                KeyCode::Char('w') | KeyCode::PageUp => self.window.one_page_backwards().is_ok(),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.window.jump_to_today();
                    true
                }
                KeyCode::Char('r') => {
                    self.refresh();
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Quitting => false,
        }
    }

    fn refresh(&mut self) {
        let today = OffsetDateTime::now_utc().to_offset(self.offset).date();
        self.set_today(today);
    }

    fn set_today(&mut self, today: Date) {
        let before = self.window.today();
        if self.window.set_today(today) {
            log::info!("Date changed from {before} to {today}");
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        Calendar::new(&mut self.book, &self.style).render(area, buf, &mut self.window);
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationSettings;
    use crate::calendar::MonthRef;
    use std::num::NonZeroUsize;
    use time::{macros::date, Month};

    fn app(today: Date, months: usize) -> App {
        App::new(
            MonthWindow::new(today, NonZeroUsize::new(months).unwrap()),
            AnnotationBook::new(AnnotationSettings::default()),
            StyleConfig::default(),
            UtcOffset::UTC,
        )
    }

    fn screen(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_month_keys() {
        let mut app = app(date!(2026 - 12 - 15), 2);
        assert!(app.handle_key(KeyCode::Char('j')));
        assert_eq!(
            app.window.months().next(),
            MonthRef::new(2027, Month::January).ok()
        );
        assert!(app.handle_key(KeyCode::PageUp));
        assert!(app.handle_key(KeyCode::Up));
        assert_eq!(
            app.window.months().next(),
            MonthRef::new(2026, Month::October).ok()
        );
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(
            app.window.months().next(),
            MonthRef::new(2026, Month::December).ok()
        );
        assert!(!app.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = app(date!(2026 - 10 - 19), 1);
        assert!(!screen(&mut app, 40, 12).iter().any(|l| l.contains("Keys")));
        assert!(app.handle_key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Helping);
        assert!(screen(&mut app, 40, 12).iter().any(|l| l.contains("Keys")));
        // Any key dismisses the help, including ones that would quit
        assert!(app.handle_key(KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Calendar);
        assert!(app.handle_key(KeyCode::Esc));
        assert!(app.quitting());
    }

    #[test]
    fn test_set_today_moves_highlight() {
        let mut app = app(date!(2026 - 10 - 19), 1);
        let before = screen(&mut app, 39, 9);
        assert!(before[5].contains("[19]"));
        app.set_today(date!(2026 - 10 - 20));
        let after = screen(&mut app, 39, 9);
        assert!(after[5].contains(" 19 "));
        assert!(after[5].contains("[20]"));
        app.set_today(date!(2026 - 11 - 01));
        assert_eq!(
            screen(&mut app, 39, 9)[0].trim(),
            "November 2026"
        );
    }
}
