use std::fmt;
use std::str::FromStr;

/// Coded concept written as `value^designator^meaning`
///
/// Used for rejection codes and similar coded entries. Ordering and equality
/// consider all three parts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code {
    pub value: String,
    pub designator: String,
    pub meaning: String,
}

impl Code {
    pub fn new(
        value: impl Into<String>,
        designator: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            designator: designator.into(),
            meaning: meaning.into(),
        }
    }
}

impl FromStr for Code {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '^');
        let value = parts.next().unwrap_or_default();
        let designator = parts
            .next()
            .ok_or_else(|| format!("code {:?} has no designator", s))?;
        let meaning = parts
            .next()
            .ok_or_else(|| format!("code {:?} has no meaning", s))?;
        if value.is_empty() || designator.is_empty() {
            return Err(format!("code {:?} has an empty value or designator", s));
        }
        Ok(Code::new(value, designator, meaning))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}^{}", self.value, self.designator, self.meaning)
    }
}
