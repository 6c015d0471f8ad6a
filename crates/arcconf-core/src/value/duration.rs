//! ISO-8601 durations (`PnDTnHnMnS`) and periods (`PnYnMnWnD`)

use std::fmt;
use std::str::FromStr;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Elapsed-time duration with millisecond resolution
///
/// Two textual forms denote the same duration when they add up to the same
/// number of milliseconds (`PT60S` and `PT1M`); `Display` always renders the
/// canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDuration {
    millis: u64,
}

impl IsoDuration {
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs * MS_PER_SECOND,
        }
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }
}

impl FromStr for IsoDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('P')
            .ok_or_else(|| "duration must start with 'P'".to_string())?;
        let (date, time) = match body.split_once('T') {
            Some((date, time)) if time.is_empty() => {
                return Err(format!("empty time part in {:?}", date))
            }
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };
        if date.is_empty() && time.is_none() {
            return Err("duration has no components".to_string());
        }

        let mut millis: u64 = 0;
        for (number, unit) in components(date)? {
            match unit {
                'D' => millis = add_scaled(millis, whole(&number)?, MS_PER_DAY)?,
                other => return Err(format!("unexpected date unit '{}'", other)),
            }
        }

        let mut last_rank = 0;
        for (number, unit) in components(time.unwrap_or_default())? {
            let rank = match unit {
                'H' => 1,
                'M' => 2,
                'S' => 3,
                other => return Err(format!("unexpected time unit '{}'", other)),
            };
            if rank <= last_rank {
                return Err(format!("time unit '{}' out of order", unit));
            }
            last_rank = rank;
            millis = match unit {
                'H' => add_scaled(millis, whole(&number)?, MS_PER_HOUR)?,
                'M' => add_scaled(millis, whole(&number)?, MS_PER_MINUTE)?,
                _ => millis
                    .checked_add(seconds_to_millis(&number)?)
                    .ok_or_else(|| "duration overflows".to_string())?,
            };
        }

        Ok(Self { millis })
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis == 0 {
            return f.write_str("PT0S");
        }
        let days = self.millis / MS_PER_DAY;
        let hours = self.millis % MS_PER_DAY / MS_PER_HOUR;
        let minutes = self.millis % MS_PER_HOUR / MS_PER_MINUTE;
        let seconds = self.millis % MS_PER_MINUTE / MS_PER_SECOND;
        let fraction = self.millis % MS_PER_SECOND;

        f.write_str("P")?;
        if days > 0 {
            write!(f, "{}D", days)?;
        }
        if hours == 0 && minutes == 0 && seconds == 0 && fraction == 0 {
            return Ok(());
        }
        f.write_str("T")?;
        if hours > 0 {
            write!(f, "{}H", hours)?;
        }
        if minutes > 0 {
            write!(f, "{}M", minutes)?;
        }
        if fraction > 0 {
            let digits = format!("{:03}", fraction);
            write!(f, "{}.{}S", seconds, digits.trim_end_matches('0'))?;
        } else if seconds > 0 {
            write!(f, "{}S", seconds)?;
        }
        Ok(())
    }
}

/// Calendar period in years, months and days
///
/// Weeks are folded into days on parse (`P2W` is `P14D`); years and months
/// are kept apart since their length depends on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Period {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl Period {
    pub const fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('P')
            .ok_or_else(|| "period must start with 'P'".to_string())?;
        if body.contains('T') {
            return Err("period cannot carry a time part".to_string());
        }
        let parts = components(body)?;
        if parts.is_empty() {
            return Err("period has no components".to_string());
        }

        let mut period = Period::default();
        let mut last_rank = 0;
        for (number, unit) in parts {
            let rank = match unit {
                'Y' => 1,
                'M' => 2,
                'W' => 3,
                'D' => 4,
                other => return Err(format!("unexpected period unit '{}'", other)),
            };
            if rank <= last_rank {
                return Err(format!("period unit '{}' out of order", unit));
            }
            last_rank = rank;
            let n = u32::try_from(whole(&number)?).map_err(|_| "period overflows".to_string())?;
            match unit {
                'Y' => period.years = n,
                'M' => period.months = n,
                'W' => {
                    period.days = n
                        .checked_mul(7)
                        .ok_or_else(|| "period overflows".to_string())?
                }
                _ => {
                    period.days = period
                        .days
                        .checked_add(n)
                        .ok_or_else(|| "period overflows".to_string())?
                }
            }
        }
        Ok(period)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Period::default() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

/// Split `12D3H` style text into `(number, unit)` pairs
fn components(s: &str) -> Result<Vec<(String, char)>, String> {
    let mut out = Vec::new();
    let mut number = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
        } else if number.is_empty() {
            return Err(format!("unit '{}' without a number", c));
        } else {
            out.push((std::mem::take(&mut number), c));
        }
    }
    if !number.is_empty() {
        return Err(format!("number {} without a unit", number));
    }
    Ok(out)
}

fn whole(number: &str) -> Result<u64, String> {
    number
        .parse::<u64>()
        .map_err(|_| format!("{:?} is not a whole number", number))
}

fn add_scaled(acc: u64, n: u64, scale: u64) -> Result<u64, String> {
    n.checked_mul(scale)
        .and_then(|v| acc.checked_add(v))
        .ok_or_else(|| "duration overflows".to_string())
}

fn seconds_to_millis(number: &str) -> Result<u64, String> {
    let (secs, fraction) = match number.split_once('.') {
        Some((secs, fraction)) => (secs, fraction),
        None => (number, ""),
    };
    if fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{:?} has more than millisecond precision", number));
    }
    let secs = if secs.is_empty() { 0 } else { whole(secs)? };
    let frac_ms = if fraction.is_empty() {
        0
    } else {
        format!("{:0<3}", fraction)
            .parse::<u64>()
            .map_err(|_| format!("{:?} is not a number", number))?
    };
    add_scaled(frac_ms, secs, MS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_equivalent_forms() {
        let a: IsoDuration = "PT60S".parse().unwrap();
        let b: IsoDuration = "PT1M".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "PT1M");
    }

    #[test]
    fn test_duration_canonical_format() {
        assert_eq!(IsoDuration::from_millis(0).to_string(), "PT0S");
        assert_eq!(IsoDuration::from_millis(500).to_string(), "PT0.5S");
        assert_eq!(
            "P1DT2H3M4.25S".parse::<IsoDuration>().unwrap().to_string(),
            "P1DT2H3M4.25S"
        );
        assert_eq!("P2D".parse::<IsoDuration>().unwrap().to_string(), "P2D");
    }

    #[test]
    fn test_duration_rejects_garbage() {
        assert!("1M".parse::<IsoDuration>().is_err());
        assert!("PT".parse::<IsoDuration>().is_err());
        assert!("P".parse::<IsoDuration>().is_err());
        assert!("PT1S1M".parse::<IsoDuration>().is_err());
        assert!("PT0.0001S".parse::<IsoDuration>().is_err());
        assert!("P1Y".parse::<IsoDuration>().is_err());
    }

    #[test]
    fn test_period_parse_and_format() {
        let p: Period = "P1Y2M3D".parse().unwrap();
        assert_eq!(p, Period::new(1, 2, 3));
        assert_eq!(p.to_string(), "P1Y2M3D");
        assert_eq!("P2W".parse::<Period>().unwrap(), Period::new(0, 0, 14));
        assert_eq!(Period::default().to_string(), "P0D");
    }

    #[test]
    fn test_period_rejects_time_part() {
        assert!("P1DT1H".parse::<Period>().is_err());
        assert!("P1D1Y".parse::<Period>().is_err());
    }
}
