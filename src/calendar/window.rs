use super::util::MonthRef;
use std::num::NonZeroUsize;
use thiserror::Error;
use time::Date;

/// A scrollable run of consecutive months, tracking the current date
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthWindow {
    today: Date,
    start: MonthRef,
    len: NonZeroUsize,
}

impl MonthWindow {
    pub(crate) fn new(today: Date, len: NonZeroUsize) -> Self {
        MonthWindow {
            today,
            start: MonthRef::containing(today),
            len,
        }
    }

    pub(crate) fn today(&self) -> Date {
        self.today
    }

    pub(crate) fn months(&self) -> impl Iterator<Item = MonthRef> {
        self.start.iter_forwards().take(self.len.get())
    }

    /// Updates the current date.  A window showing the current month moves
    /// along with it into the next month; a scrolled window stays put.
    /// Returns `true` if the date changed.
    pub(crate) fn set_today(&mut self, today: Date) -> bool {
        if today == self.today {
            return false;
        }
        if self.start.contains(self.today) {
            self.start = MonthRef::containing(today);
        }
        self.today = today;
        true
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.start = MonthRef::containing(self.today);
    }

    pub(crate) fn one_month_forwards(&mut self) -> Result<(), OutOfTimeError> {
        self.start = self.start.next().ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn one_month_backwards(&mut self) -> Result<(), OutOfTimeError> {
        self.start = self.start.previous().ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn one_page_forwards(&mut self) -> Result<(), OutOfTimeError> {
        self.start = (0..self.len.get())
            .try_fold(self.start, |m, _| m.next())
            .ok_or(OutOfTimeError)?;
        Ok(())
    }

    pub(crate) fn one_page_backwards(&mut self) -> Result<(), OutOfTimeError> {
        self.start = (0..self.len.get())
            .try_fold(self.start, |m, _| m.previous())
            .ok_or(OutOfTimeError)?;
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;
