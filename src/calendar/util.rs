use std::iter::successors;
use time::{error::ComponentRange, Date, Duration, Month, Weekday, Weekday::*};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a Monday-first week
    fn index0(&self) -> u8;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u8 {
        self.number_days_from_monday()
    }
}

/// A calendar month, represented by its first day
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct MonthRef(Date);

impl MonthRef {
    pub(crate) fn new(year: i32, month: Month) -> Result<MonthRef, ComponentRange> {
        Date::from_calendar_date(year, month, 1).map(MonthRef)
    }

    pub(crate) fn containing(date: Date) -> MonthRef {
        MonthRef(date.saturating_sub(Duration::days(i64::from(date.day()) - 1)))
    }

    pub(crate) fn year(self) -> i32 {
        self.0.year()
    }

    pub(crate) fn month(self) -> Month {
        self.0.month()
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub(crate) fn iter_days(self) -> impl Iterator<Item = Date> {
        let month = self.month();
        successors(Some(self.0), |d| d.next_day()).take_while(move |d| d.month() == month)
    }

    pub(crate) fn next(self) -> Option<MonthRef> {
        self.iter_days()
            .last()
            .and_then(Date::next_day)
            .map(MonthRef)
    }

    pub(crate) fn previous(self) -> Option<MonthRef> {
        self.0.previous_day().map(MonthRef::containing)
    }

    /// Iterates over this month and the months after it
    pub(crate) fn iter_forwards(self) -> impl Iterator<Item = MonthRef> {
        successors(Some(self), |m| m.next())
    }

    /// The months of this month's year, starting from this month
    pub(crate) fn rest_of_year(self) -> impl Iterator<Item = MonthRef> {
        let year = self.year();
        self.iter_forwards().take_while(move |m| m.year() == year)
    }
}

pub(crate) fn days_in_month(year: i32, month: Month) -> u8 {
    (28..=31)
        .rev()
        .find(|&day| Date::from_calendar_date(year, month, day).is_ok())
        .unwrap_or(28)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
// Invariant: At least one element of `days` is Some
pub(crate) struct Week {
    days: [Option<u8>; DAYS_IN_WEEK],
    iso_week: u8,
}

impl Week {
    fn new(date: Date) -> Self {
        let mut this = Week {
            days: [None; DAYS_IN_WEEK],
            iso_week: date.iso_week(),
        };
        this.set(date);
        this
    }

    fn set(&mut self, date: Date) {
        let i = usize::from(date.weekday().index0());
        assert!(i < DAYS_IN_WEEK, "weekday index should be less than 7");
        self.days[i] = Some(date.day());
    }

    pub(crate) fn enumerate(&self) -> EnumerateWeek<'_> {
        EnumerateWeek::new(self)
    }

    pub(crate) fn get(&self, wd: Weekday) -> Option<u8> {
        self.days.get(usize::from(wd.index0())).copied().flatten()
    }

    /// ISO-8601 week number of the first day in this row
    pub(crate) fn iso_week(&self) -> u8 {
        self.iso_week
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct EnumerateWeek<'a> {
    week: &'a Week,
    next_weekday: Option<Weekday>,
}

impl<'a> EnumerateWeek<'a> {
    fn new(week: &'a Week) -> Self {
        EnumerateWeek {
            week,
            next_weekday: Some(Monday),
        }
    }
}

impl Iterator for EnumerateWeek<'_> {
    type Item = (Weekday, u8);

    fn next(&mut self) -> Option<(Weekday, u8)> {
        loop {
            let wd = self.next_weekday?;
            self.next_weekday = match wd.next() {
                Monday => None,
                wd2 => Some(wd2),
            };
            if let Some(day) = self.week.get(wd) {
                return Some((wd, day));
            }
        }
    }
}

/// A day cell of a month grid
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Cell {
    pub(crate) row: u8,
    pub(crate) weekday: Weekday,
    pub(crate) day: u8,
}

/// The weeks of one month laid out Monday-first, padded with empty cells
/// before the first and after the last day
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    month: MonthRef,
    weeks: Vec<Week>,
}

impl MonthGrid {
    pub(crate) fn new(month: MonthRef) -> MonthGrid {
        let mut weeks: Vec<Week> = Vec::with_capacity(6);
        for date in month.iter_days() {
            if date.weekday() == Monday || weeks.is_empty() {
                weeks.push(Week::new(date));
            } else if let Some(week) = weeks.last_mut() {
                week.set(date);
            }
        }
        MonthGrid { month, weeks }
    }

    pub(crate) fn month(&self) -> MonthRef {
        self.month
    }

    pub(crate) fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        std::iter::zip(0u8.., &self.weeks).flat_map(|(row, week)| {
            week.enumerate()
                .map(move |(weekday, day)| Cell { row, weekday, day })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn flattened(grid: &MonthGrid) -> Vec<Option<u8>> {
        grid.weeks()
            .iter()
            .flat_map(|w| w.days.iter().copied())
            .collect()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, Month::February), 28);
        assert_eq!(days_in_month(2028, Month::February), 29);
        assert_eq!(days_in_month(1900, Month::February), 28);
        assert_eq!(days_in_month(2000, Month::February), 29);
        assert_eq!(days_in_month(2026, Month::April), 30);
        assert_eq!(days_in_month(2026, Month::December), 31);
    }

    #[test]
    fn test_february_cell_counts() {
        let feb26 = MonthGrid::new(MonthRef::new(2026, Month::February).unwrap());
        assert_eq!(feb26.cells().count(), 28);
        let feb28 = MonthGrid::new(MonthRef::new(2028, Month::February).unwrap());
        assert_eq!(feb28.cells().count(), 29);
    }

    #[test]
    fn test_grid_covers_month_exactly() {
        for year in [1999, 2000, 2024, 2026, 2027, 2100] {
            for month in MonthRef::new(year, Month::January).unwrap().rest_of_year() {
                let grid = MonthGrid::new(month);
                let days = flattened(&grid).into_iter().flatten().collect::<Vec<_>>();
                let expected = (1..=days_in_month(year, month.month())).collect::<Vec<_>>();
                assert_eq!(days, expected, "{year}-{}", month.month());
                assert!(grid.weeks().len() <= 6, "too many rows in {year}-{}", month.month());
                assert!(
                    grid.weeks().iter().all(|w| w.days.iter().any(Option::is_some)),
                    "empty row in {year}-{}",
                    month.month()
                );
            }
        }
    }

    #[test]
    fn test_monday_first_padding() {
        // 2026-01-01 is a Thursday
        let grid = MonthGrid::new(MonthRef::new(2026, Month::January).unwrap());
        assert_eq!(
            grid.weeks()[0].days,
            [None, None, None, Some(1), Some(2), Some(3), Some(4)]
        );
        assert_eq!(grid.weeks()[0].get(Sunday), Some(4));
        let last = grid.weeks().last().unwrap();
        assert_eq!(
            last.days,
            [Some(26), Some(27), Some(28), Some(29), Some(30), Some(31), None]
        );
    }

    #[test]
    fn test_month_starting_on_monday() {
        // 2026-06-01 is a Monday
        let grid = MonthGrid::new(MonthRef::new(2026, Month::June).unwrap());
        assert_eq!(grid.weeks()[0].days[0], Some(1));
        assert_eq!(grid.weeks().len(), 5);
    }

    #[test]
    fn test_enumerate_week() {
        let grid = MonthGrid::new(MonthRef::new(2026, Month::January).unwrap());
        let mut iter = grid.weeks()[0].enumerate();
        assert_eq!(iter.next(), Some((Thursday, 1)));
        assert_eq!(iter.next(), Some((Friday, 2)));
        assert_eq!(iter.next(), Some((Saturday, 3)));
        assert_eq!(iter.next(), Some((Sunday, 4)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iso_week_numbers() {
        // 2027-01-01 is a Friday belonging to ISO week 53 of 2026
        let grid = MonthGrid::new(MonthRef::new(2027, Month::January).unwrap());
        let weeks = grid.weeks().iter().map(Week::iso_week).collect::<Vec<_>>();
        assert_eq!(weeks, [53, 1, 2, 3, 4]);
        let grid = MonthGrid::new(MonthRef::new(2026, Month::January).unwrap());
        let weeks = grid.weeks().iter().map(Week::iso_week).collect::<Vec<_>>();
        assert_eq!(weeks, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_week_numbers_non_decreasing_within_year() {
        for year in [2020, 2021, 2026, 2027] {
            for month in MonthRef::new(year, Month::January).unwrap().rest_of_year() {
                let grid = MonthGrid::new(month);
                let weeks = grid.weeks().iter().map(Week::iso_week).collect::<Vec<_>>();
                for pair in weeks.windows(2) {
                    assert!(
                        pair[0] < pair[1] || (pair[0] >= 52 && pair[1] == 1),
                        "week numbers {weeks:?} out of order in {year}-{}",
                        month.month()
                    );
                }
            }
        }
    }

    #[test]
    fn test_cells_rows_and_weekdays() {
        let grid = MonthGrid::new(MonthRef::new(2026, Month::March).unwrap());
        let cells = grid.cells().collect::<Vec<_>>();
        // 2026-03-01 is a Sunday
        assert_eq!(
            cells[0],
            Cell {
                row: 0,
                weekday: Sunday,
                day: 1
            }
        );
        assert_eq!(
            cells[1],
            Cell {
                row: 1,
                weekday: Monday,
                day: 2
            }
        );
        assert_eq!(cells.last().map(|c| c.row), Some(5));
    }

    #[test]
    fn test_month_navigation() {
        let dec = MonthRef::new(2026, Month::December).unwrap();
        let jan = dec.next().unwrap();
        assert_eq!((jan.year(), jan.month()), (2027, Month::January));
        assert_eq!(jan.previous(), Some(dec));
        assert_eq!(
            MonthRef::containing(date!(2026 - 10 - 19)).iter_days().next(),
            Some(date!(2026 - 10 - 01))
        );
        assert_eq!(
            MonthRef::new(2026, Month::March).unwrap().rest_of_year().count(),
            10
        );
        assert!(dec.contains(date!(2026 - 12 - 31)));
        assert!(!dec.contains(date!(2027 - 12 - 31)));
    }
}
