use serde::Deserialize;
use time::{Date, Duration, Month};

/// Built-in holiday calendars
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum HolidayPreset {
    /// Romanian legal (non-working) holidays
    #[default]
    Romania,
    None,
}

impl HolidayPreset {
    pub(crate) fn dates(self, year: i32) -> Vec<Date> {
        match self {
            HolidayPreset::Romania => romanian_holidays(year),
            HolidayPreset::None => Vec::new(),
        }
    }
}

const ROMANIAN_FIXED: &[(Month, u8)] = &[
    (Month::January, 1),   // New Year's Day
    (Month::January, 2),   // New Year's Day
    (Month::January, 6),   // Epiphany
    (Month::January, 7),   // Saint John the Baptist
    (Month::January, 24),  // Unification Day
    (Month::May, 1),       // Labour Day
    (Month::June, 1),      // Children's Day
    (Month::August, 15),   // Assumption of Mary
    (Month::November, 30), // Saint Andrew
    (Month::December, 1),  // National Day
    (Month::December, 25), // Christmas
    (Month::December, 26), // Christmas
];

/// Days relative to Orthodox Easter Sunday: Good Friday, Easter Sunday and
/// Monday, Pentecost Sunday and Monday
const ROMANIAN_MOVABLE: &[i64] = &[-2, 0, 1, 49, 50];

fn romanian_holidays(year: i32) -> Vec<Date> {
    let mut dates = ROMANIAN_FIXED
        .iter()
        .filter_map(|&(month, day)| Date::from_calendar_date(year, month, day).ok())
        .collect::<Vec<_>>();
    if let Some(easter) = orthodox_easter(year) {
        dates.extend(
            ROMANIAN_MOVABLE
                .iter()
                .filter_map(|&offset| easter.checked_add(Duration::days(offset)))
                .filter(|d| d.year() == year),
        );
    }
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Orthodox Easter Sunday of `year` on the Gregorian calendar.  The date is
/// found on the Julian calendar and then converted via its Julian day number.
pub(crate) fn orthodox_easter(year: i32) -> Option<Date> {
    let a = year.rem_euclid(4);
    let b = year.rem_euclid(7);
    let c = year.rem_euclid(19);
    let d = (19 * c + 15) % 30;
    let e = (2 * a + 4 * b - d + 34).rem_euclid(7);
    let month = (d + e + 114) / 31;
    let day = (d + e + 114) % 31 + 1;
    Date::from_julian_day(julian_calendar_jdn(year, month, day)).ok()
}

fn julian_calendar_jdn(year: i32, month: i32, day: i32) -> i32 {
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y.div_euclid(4) - 32083
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_orthodox_easter() {
        assert_eq!(orthodox_easter(2024), Some(date!(2024 - 05 - 05)));
        assert_eq!(orthodox_easter(2025), Some(date!(2025 - 04 - 20)));
        assert_eq!(orthodox_easter(2026), Some(date!(2026 - 04 - 12)));
        assert_eq!(orthodox_easter(2027), Some(date!(2027 - 05 - 02)));
    }

    #[test]
    fn test_romanian_holidays_2026() {
        let dates = HolidayPreset::Romania.dates(2026);
        for d in [
            date!(2026 - 01 - 01),
            date!(2026 - 01 - 24),
            date!(2026 - 04 - 10),
            date!(2026 - 04 - 12),
            date!(2026 - 04 - 13),
            date!(2026 - 05 - 31),
            date!(2026 - 06 - 01),
            date!(2026 - 12 - 26),
        ] {
            assert!(dates.contains(&d), "{d} missing");
        }
        // Pentecost Monday coincides with Children's Day
        assert_eq!(dates.len(), 16);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_no_preset() {
        assert!(HolidayPreset::None.dates(2026).is_empty());
    }
}
