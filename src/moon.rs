use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::Date;

/// Mean length of a lunation in days
const SYNODIC_MONTH: f64 = 29.530_588_861;

/// Lunations per Julian year, used to find the lunation index near a year
const LUNATIONS_PER_YEAR: f64 = 12.3685;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) enum MoonPhase {
    New,
    FirstQuarter,
    Full,
    LastQuarter,
}

impl MoonPhase {
    const ALL: [MoonPhase; 4] = [
        MoonPhase::New,
        MoonPhase::FirstQuarter,
        MoonPhase::Full,
        MoonPhase::LastQuarter,
    ];

    fn fraction(self) -> f64 {
        match self {
            MoonPhase::New => 0.0,
            MoonPhase::FirstQuarter => 0.25,
            MoonPhase::Full => 0.5,
            MoonPhase::LastQuarter => 0.75,
        }
    }

    /// Terminal glyph for the phase
    pub(crate) fn symbol(self) -> char {
        match self {
            MoonPhase::New => '●',
            MoonPhase::FirstQuarter => '◑',
            MoonPhase::Full => '○',
            MoonPhase::LastQuarter => '◐',
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoonPhase::New => "new",
            MoonPhase::FirstQuarter => "first",
            MoonPhase::Full => "full",
            MoonPhase::LastQuarter => "last",
        };
        f.write_str(s)
    }
}

impl FromStr for MoonPhase {
    type Err = UnknownPhaseError;

    fn from_str(s: &str) -> Result<MoonPhase, UnknownPhaseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(MoonPhase::New),
            "first" | "first-quarter" => Ok(MoonPhase::FirstQuarter),
            "full" => Ok(MoonPhase::Full),
            "last" | "last-quarter" => Ok(MoonPhase::LastQuarter),
            _ => Err(UnknownPhaseError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown moon phase {0:?}")]
pub(crate) struct UnknownPhaseError(String);

/// All principal moon phases falling in `year`, in chronological order,
/// dated by their UTC calendar day.
pub(crate) fn phases_in_year(year: i32) -> Vec<(Date, MoonPhase)> {
    let k0 = ((f64::from(year) - 2000.0) * LUNATIONS_PER_YEAR).floor() - 1.0;
    (0..16)
        .flat_map(|i| {
            let k = k0 + f64::from(i);
            MoonPhase::ALL.map(|phase| (k + phase.fraction(), phase))
        })
        .filter_map(|(k, phase)| Some((julian_day_to_date(phase_jd_ut(k, phase, year))?, phase)))
        .filter(|(date, _)| date.year() == year)
        .collect()
}

/// Julian Ephemeris Day of the phase with lunation index `k`, using the mean
/// phase and the principal periodic terms (Meeus, *Astronomical Algorithms*,
/// ch. 49).  Accurate to a few minutes for recent centuries.
fn phase_jde(k: f64, phase: MoonPhase) -> f64 {
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let mean = 2_451_550.097_66 + SYNODIC_MONTH * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = (2.5534 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3).to_radians();
    let mp = (201.5643 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3
        - 0.000_000_058 * t4)
        .to_radians();
    let f = (160.7108 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3
        + 0.000_000_011 * t4)
        .to_radians();
    let omega = (124.7746 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3).to_radians();
    let sin = f64::sin;
    let correction = match phase {
        MoonPhase::New | MoonPhase::Full => {
            let (a, b, c, d, g, h, i) = if phase == MoonPhase::New {
                (-0.40720, 0.17241, 0.01608, 0.01039, 0.00739, -0.00514, 0.00208)
            } else {
                (-0.40614, 0.17302, 0.01614, 0.01043, 0.00734, -0.00515, 0.00209)
            };
            a * sin(mp)
                + b * e * sin(m)
                + c * sin(2.0 * mp)
                + d * sin(2.0 * f)
                + g * e * sin(mp - m)
                + h * e * sin(mp + m)
                + i * e * e * sin(2.0 * m)
                - 0.00111 * sin(mp - 2.0 * f)
                - 0.00057 * sin(mp + 2.0 * f)
                + 0.00056 * e * sin(2.0 * mp + m)
                - 0.00042 * sin(3.0 * mp)
                + 0.00042 * e * sin(m + 2.0 * f)
                + 0.00038 * e * sin(m - 2.0 * f)
                - 0.00024 * e * sin(2.0 * mp - m)
                - 0.00017 * sin(omega)
        }
        MoonPhase::FirstQuarter | MoonPhase::LastQuarter => {
            let base = -0.62801 * sin(mp) + 0.17172 * e * sin(m)
                - 0.01183 * e * sin(mp + m)
                + 0.00862 * sin(2.0 * mp)
                + 0.00804 * sin(2.0 * f)
                + 0.00454 * e * sin(mp - m)
                + 0.00204 * e * e * sin(2.0 * m)
                - 0.00180 * sin(mp - 2.0 * f)
                - 0.00070 * sin(mp + 2.0 * f)
                - 0.00040 * sin(3.0 * mp)
                - 0.00034 * e * sin(2.0 * mp - m)
                + 0.00032 * e * sin(m + 2.0 * f)
                + 0.00032 * e * sin(m - 2.0 * f)
                - 0.00028 * e * e * sin(mp + 2.0 * m)
                + 0.00027 * e * sin(2.0 * mp + m)
                - 0.00017 * sin(omega);
            let w = 0.00306 - 0.00038 * e * m.cos() + 0.00026 * mp.cos()
                - 0.00002 * (mp - m).cos()
                + 0.00002 * (mp + m).cos()
                + 0.00002 * (2.0 * f).cos();
            if phase == MoonPhase::FirstQuarter {
                base + w
            } else {
                base - w
            }
        }
    };
    mean + correction
}

/// Universal Time Julian Day of a phase: [`phase_jde`] is in Terrestrial
/// Time, which runs ahead of UT by ΔT.
fn phase_jd_ut(k: f64, phase: MoonPhase, year: i32) -> f64 {
    phase_jde(k, phase) - delta_t(year) / SECONDS_PER_DAY
}

/// ΔT = TT − UT in seconds, from the Espenak–Meeus polynomials for
/// 1986..2150, and their long-term parabola elsewhere
fn delta_t(year: i32) -> f64 {
    let y = f64::from(year) + 0.5;
    if (1986.0..2005.0).contains(&y) {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
            + 0.001_727_5 * t.powi(3)
            + 0.000_651_814 * t.powi(4)
            + 0.000_023_735_99 * t.powi(5)
    } else if (2005.0..2050.0).contains(&y) {
        let t = y - 2000.0;
        62.92 + 0.322_17 * t + 0.005_589 * t * t
    } else if (2050.0..2150.0).contains(&y) {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

#[allow(clippy::cast_possible_truncation)]
fn julian_day_to_date(jde: f64) -> Option<Date> {
    let jdn = (jde + 0.5).floor();
    if !jdn.is_finite() || jdn < f64::from(i32::MIN) || jdn > f64::from(i32::MAX) {
        return None;
    }
    Date::from_julian_day(jdn as i32).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn phase_on(date: Date) -> Option<MoonPhase> {
        phases_in_year(date.year())
            .into_iter()
            .find_map(|(d, p)| (d == date).then_some(p))
    }

    #[test]
    fn test_known_phases_2026() {
        assert_eq!(phase_on(date!(2026 - 01 - 03)), Some(MoonPhase::Full));
        assert_eq!(phase_on(date!(2026 - 01 - 10)), Some(MoonPhase::LastQuarter));
        assert_eq!(phase_on(date!(2026 - 01 - 18)), Some(MoonPhase::New));
        assert_eq!(phase_on(date!(2026 - 01 - 26)), Some(MoonPhase::FirstQuarter));
    }

    #[test]
    fn test_known_new_moon_2024() {
        // Total solar eclipse
        assert_eq!(phase_on(date!(2024 - 04 - 08)), Some(MoonPhase::New));
    }

    #[test]
    fn test_phases_cycle_in_order() {
        let phases = phases_in_year(2026);
        assert!(phases.len() >= 48, "only {} phases in 2026", phases.len());
        assert!(phases.len() <= 52, "{} phases in 2026", phases.len());
        for pair in phases.windows(2) {
            let (d0, p0) = pair[0];
            let (d1, p1) = pair[1];
            assert!(d0 < d1, "{d0} not before {d1}");
            let i0 = MoonPhase::ALL.iter().position(|&p| p == p0).unwrap();
            assert_eq!(MoonPhase::ALL[(i0 + 1) % 4], p1, "{p0} on {d0} followed by {p1}");
        }
        assert!(phases.iter().all(|(d, _)| d.year() == 2026));
    }

    #[test]
    fn test_delta_t() {
        assert!((delta_t(1990) - 57.0).abs() < 1.0, "{}", delta_t(1990));
        assert!((delta_t(2000) - 64.0).abs() < 1.0, "{}", delta_t(2000));
        let now = delta_t(2026);
        assert!((65.0..80.0).contains(&now), "{now}");
        // Continuous across the polynomial boundaries to within a second
        assert!((delta_t(2004) - delta_t(2005)).abs() < 1.0);
        assert!((delta_t(2049) - delta_t(2050)).abs() < 2.0);
    }

    #[test]
    fn test_phases_are_dated_in_ut() {
        let k = ((2026.0 - 2000.0) * LUNATIONS_PER_YEAR).floor();
        let shift = phase_jde(k, MoonPhase::Full) - phase_jd_ut(k, MoonPhase::Full, 2026);
        let seconds = shift * SECONDS_PER_DAY;
        assert!((65.0..80.0).contains(&seconds), "{seconds}");
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("new".parse::<MoonPhase>(), Ok(MoonPhase::New));
        assert_eq!("First".parse::<MoonPhase>(), Ok(MoonPhase::FirstQuarter));
        assert_eq!("last-quarter".parse::<MoonPhase>(), Ok(MoonPhase::LastQuarter));
        assert_eq!(" full ".parse::<MoonPhase>(), Ok(MoonPhase::Full));
        assert!("gibbous".parse::<MoonPhase>().is_err());
    }
}
