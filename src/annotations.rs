use crate::calendar::days_in_month;
use crate::holidays::HolidayPreset;
use crate::moon::{phases_in_year, MoonPhase};
use std::collections::{BTreeMap, BTreeSet};
use time::Month;

/// Fixed approximation of the equinoxes and solstices
const EQUINOXES_AND_SOLSTICES: &[(Month, u8)] = &[
    (Month::March, 20),
    (Month::June, 21),
    (Month::September, 23),
    (Month::December, 21),
];

fn month_index(month: Month) -> usize {
    usize::from(u8::from(month) - 1)
}

/// Sets of marked day numbers, one per month
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct DaySets([BTreeSet<u8>; 12]);

impl DaySets {
    pub(crate) fn contains(&self, month: Month, day: u8) -> bool {
        self.0[month_index(month)].contains(&day)
    }

    pub(crate) fn insert(&mut self, month: Month, day: u8) {
        self.0[month_index(month)].insert(day);
    }

    pub(crate) fn remove(&mut self, month: Month, day: u8) {
        self.0[month_index(month)].remove(&day);
    }

    pub(crate) fn extend<I: IntoIterator<Item = u8>>(&mut self, month: Month, days: I) {
        self.0[month_index(month)].extend(days);
    }
}

/// Moon phases by month and day
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MoonPhases([BTreeMap<u8, MoonPhase>; 12]);

impl MoonPhases {
    pub(crate) fn get(&self, month: Month, day: u8) -> Option<MoonPhase> {
        self.0[month_index(month)].get(&day).copied()
    }

    pub(crate) fn insert(&mut self, month: Month, day: u8, phase: MoonPhase) {
        self.0[month_index(month)].insert(day, phase);
    }

    fn replace_month(&mut self, month: Month, phases: BTreeMap<u8, MoonPhase>) {
        self.0[month_index(month)] = phases;
    }
}

/// User-supplied annotation inputs, keyed by month number (1–12).  Day lists
/// are kept as the raw comma-separated text and parsed per year so that
/// out-of-range days can be dropped against the actual month length.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct AnnotationSettings {
    pub(crate) holiday_preset: HolidayPreset,
    pub(crate) excluded_holidays: BTreeMap<u8, Vec<u8>>,
    pub(crate) custom_holidays: BTreeMap<u8, String>,
    pub(crate) birthdays: BTreeMap<u8, String>,
    pub(crate) moon_overrides: BTreeMap<u8, Vec<String>>,
}

/// The four independent annotation calendars for one year
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Annotations {
    pub(crate) holidays: DaySets,
    pub(crate) astronomical: DaySets,
    pub(crate) moon_phases: MoonPhases,
    pub(crate) birthdays: DaySets,
}

impl Annotations {
    pub(crate) fn for_year(year: i32, settings: &AnnotationSettings) -> Annotations {
        let mut holidays = DaySets::default();
        for date in settings.holiday_preset.dates(year) {
            holidays.insert(date.month(), date.day());
        }
        for (month, days) in months_of(&settings.excluded_holidays) {
            for &day in days {
                holidays.remove(month, day);
            }
        }
        for (month, list) in months_of(&settings.custom_holidays) {
            holidays.extend(month, parse_day_list(list, days_in_month(year, month)));
        }

        let mut birthdays = DaySets::default();
        for (month, list) in months_of(&settings.birthdays) {
            birthdays.extend(month, parse_day_list(list, days_in_month(year, month)));
        }

        let mut moon_phases = MoonPhases::default();
        for (date, phase) in phases_in_year(year) {
            moon_phases.insert(date.month(), date.day(), phase);
        }
        for (month, entries) in months_of(&settings.moon_overrides) {
            moon_phases.replace_month(
                month,
                parse_phase_entries(entries, days_in_month(year, month)),
            );
        }

        log::debug!(
            "Built annotations for {year}: {} holidays, {} birthdays",
            holidays.0.iter().map(BTreeSet::len).sum::<usize>(),
            birthdays.0.iter().map(BTreeSet::len).sum::<usize>(),
        );
        Annotations {
            holidays,
            astronomical: equinoxes_and_solstices(),
            moon_phases,
            birthdays,
        }
    }
}

/// Per-year annotation cache for layouts that span more than one year
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct AnnotationBook {
    settings: AnnotationSettings,
    years: BTreeMap<i32, Annotations>,
}

impl AnnotationBook {
    pub(crate) fn new(settings: AnnotationSettings) -> AnnotationBook {
        AnnotationBook {
            settings,
            years: BTreeMap::new(),
        }
    }

    pub(crate) fn for_year(&mut self, year: i32) -> &Annotations {
        self.years
            .entry(year)
            .or_insert_with(|| Annotations::for_year(year, &self.settings))
    }
}

pub(crate) fn equinoxes_and_solstices() -> DaySets {
    let mut sets = DaySets::default();
    for &(month, day) in EQUINOXES_AND_SOLSTICES {
        sets.insert(month, day);
    }
    sets
}

fn months_of<T>(by_number: &BTreeMap<u8, T>) -> impl Iterator<Item = (Month, &T)> {
    by_number
        .iter()
        .filter_map(|(&n, v)| Month::try_from(n).ok().map(|m| (m, v)))
}

/// Parses a comma-separated list of day numbers such as `"5, 12,25"`.
/// Malformed entries and days outside `1..=max_day` are dropped.
pub(crate) fn parse_day_list(input: &str, max_day: u8) -> Vec<u8> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u8>() {
            Ok(day) if (1..=max_day).contains(&day) => Some(day),
            Ok(_) => {
                log::warn!("Ignoring day {s}: outside 1..={max_day}");
                None
            }
            Err(_) => {
                log::warn!("Ignoring malformed day {s:?}");
                None
            }
        })
        .collect()
}

/// Parses moon phase entries of the form `"day:label"`.  Entries whose label
/// is not a known phase are skipped.
fn parse_phase_entries(entries: &[String], max_day: u8) -> BTreeMap<u8, MoonPhase> {
    let mut phases = BTreeMap::new();
    for entry in entries {
        let Some((day, label)) = entry.split_once(':') else {
            log::warn!("Ignoring malformed moon phase entry {entry:?}");
            continue;
        };
        let Some(&day) = parse_day_list(day, max_day).first() else {
            continue;
        };
        match label.parse::<MoonPhase>() {
            Ok(phase) => {
                phases.insert(day, phase);
            }
            Err(e) => log::debug!("Skipping moon phase entry {entry:?}: {e}"),
        }
    }
    phases
}
