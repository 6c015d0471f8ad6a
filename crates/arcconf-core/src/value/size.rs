//! Byte sizes with decimal (`kB`, `MB`) and binary (`KiB`, `MiB`) units

const UNITS: &[(&str, u64)] = &[
    ("TB", 1_000_000_000_000),
    ("GB", 1_000_000_000),
    ("MB", 1_000_000),
    ("kB", 1_000),
    ("TiB", 1 << 40),
    ("GiB", 1 << 30),
    ("MiB", 1 << 20),
    ("KiB", 1 << 10),
];

/// Parse `"10GB"`, `"512 MiB"` or a bare byte count into bytes
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    if number.is_empty() {
        return Err(format!("{:?} does not start with a number", s));
    }
    let n: u64 = number
        .parse()
        .map_err(|_| format!("{:?} is out of range", number))?;

    let unit = unit.trim();
    let factor = if unit.is_empty() || unit.eq_ignore_ascii_case("B") {
        1
    } else {
        UNITS
            .iter()
            .chain(&[("K", 1_000), ("M", 1_000_000), ("G", 1_000_000_000)])
            .find(|(name, _)| name.eq_ignore_ascii_case(unit))
            .map(|(_, factor)| *factor)
            .ok_or_else(|| format!("unknown size unit {:?}", unit))?
    };
    n.checked_mul(factor)
        .ok_or_else(|| format!("{:?} overflows", s))
}

/// Render a byte count in the largest unit that divides it exactly
///
/// Decimal units win over binary ones, so `1000000` is `1MB` and `1048576`
/// is `1MiB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    UNITS
        .iter()
        .find(|(_, factor)| bytes % factor == 0)
        .map(|(unit, factor)| format!("{}{}", bytes / factor, unit))
        .unwrap_or_else(|| format!("{}B", bytes))
}
