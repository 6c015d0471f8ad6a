//! Schedule expressions restricting when background work may run
//!
//! Text form is a whitespace separated list of `component=ranges` terms,
//! for example `hour=22-6 dayOfWeek=1-5`. Components left out match any
//! time. Ranges whose start exceeds their end wrap around (`22-6`).

use std::fmt;
use std::str::FromStr;

/// Inclusive range of component values; `from > to` wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleRange {
    pub from: u8,
    pub to: u8,
}

impl fmt::Display for ScheduleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// Schedule components in their canonical rendering order
const COMPONENTS: [(&str, u8, u8); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("dayOfMonth", 1, 31),
    ("month", 1, 12),
    ("dayOfWeek", 0, 6),
];

/// Parsed schedule; `None` for a component means any value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ScheduleExpression {
    components: [Option<Vec<ScheduleRange>>; 5],
}

impl ScheduleExpression {
    /// Ranges for a named component, `None` when unrestricted
    pub fn ranges(&self, component: &str) -> Option<&[ScheduleRange]> {
        COMPONENTS
            .iter()
            .position(|(name, _, _)| *name == component)
            .and_then(|i| self.components[i].as_deref())
    }

    /// Whether the expression admits the given wall-clock instant
    pub fn matches(&self, minute: u8, hour: u8, day_of_month: u8, month: u8, day_of_week: u8) -> bool {
        let at = [minute, hour, day_of_month, month, day_of_week];
        self.components
            .iter()
            .zip(at)
            .all(|(ranges, v)| match ranges {
                None => true,
                Some(ranges) => ranges.iter().any(|r| {
                    if r.from <= r.to {
                        (r.from..=r.to).contains(&v)
                    } else {
                        v >= r.from || v <= r.to
                    }
                }),
            })
    }
}

impl FromStr for ScheduleExpression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut expr = ScheduleExpression::default();
        let mut seen = [false; 5];
        let mut terms = 0;

        for term in s.split_whitespace() {
            terms += 1;
            let (name, spec) = term
                .split_once('=')
                .ok_or_else(|| format!("schedule term {:?} lacks '='", term))?;
            let index = COMPONENTS
                .iter()
                .position(|(component, _, _)| *component == name)
                .ok_or_else(|| format!("unknown schedule component {:?}", name))?;
            if seen[index] {
                return Err(format!("schedule component {:?} repeated", name));
            }
            seen[index] = true;

            if spec == "*" {
                continue;
            }
            let (_, min, max) = COMPONENTS[index];
            let mut ranges = spec
                .split(',')
                .map(|part| parse_range(part, min, max))
                .collect::<Result<Vec<_>, _>>()?;
            ranges.sort();
            ranges.dedup();
            expr.components[index] = Some(ranges);
        }

        if terms == 0 {
            return Err("empty schedule expression".to_string());
        }
        Ok(expr)
    }
}

fn parse_range(part: &str, min: u8, max: u8) -> Result<ScheduleRange, String> {
    let bound = |text: &str| -> Result<u8, String> {
        let n: u8 = text
            .parse()
            .map_err(|_| format!("{:?} is not a number", text))?;
        if n < min || n > max {
            return Err(format!("{} outside {}-{}", n, min, max));
        }
        Ok(n)
    };
    match part.split_once('-') {
        Some((from, to)) => Ok(ScheduleRange {
            from: bound(from)?,
            to: bound(to)?,
        }),
        None => {
            let n = bound(part)?;
            Ok(ScheduleRange { from: n, to: n })
        }
    }
}

impl fmt::Display for ScheduleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for ((name, _, _), ranges) in COMPONENTS.iter().zip(&self.components) {
            let Some(ranges) = ranges else { continue };
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}=", name)?;
            for (i, range) in ranges.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", range)?;
            }
        }
        if first {
            f.write_str("hour=*")?;
        }
        Ok(())
    }
}
