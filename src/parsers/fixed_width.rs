//! Splitting of fixed-width text records.

use log::warn;
use std::path::Path;

/// Column widths of a fixed-width record, starting at the first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthLayout {
    widths: &'static [usize],
}

impl FixedWidthLayout {
    pub const fn new(widths: &'static [usize]) -> Self {
        Self { widths }
    }

    pub fn line_width(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Splits a line into trimmed fields. Fields past the end of a short line are empty.
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let len = line.len();
        let mut start = 0;
        self.widths
            .iter()
            .map(|width| {
                let end = start + width;
                let field = line.get(start.min(len)..end.min(len)).unwrap_or("");
                start = end;
                field.trim()
            })
            .collect()
    }
}

/// Parses a numeric field. Blank fields, runs of `*` and sentinel values are missing.
pub fn parse_value(field: &str, sentinels: &[f64]) -> Result<Option<f64>, String> {
    let field = field.trim();
    if field.is_empty() || field.chars().all(|c| c == '*') {
        return Ok(None);
    }
    let value: f64 = field
        .parse()
        .map_err(|_| format!("'{field}' is not a number"))?;
    if value.is_nan() || sentinels.iter().any(|s| (value - s).abs() < 1e-9) {
        return Ok(None);
    }
    Ok(Some(value))
}

/// [`parse_value`] for a cell of line `line` in `path`. Unreadable cells are
/// logged and read as missing.
pub fn parse_value_or_warn(field: &str, sentinels: &[f64], path: &Path, line: usize) -> Option<f64> {
    parse_value(field, sentinels).unwrap_or_else(|message| {
        warn!("Line {line} of {}: {message}", path.display());
        None
    })
}

pub fn parse_integer(field: &str) -> Result<i32, String> {
    let field = field.trim();
    field
        .parse::<i32>()
        .or_else(|_| {
            // Some tables write integral keys as `2020.0`.
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0)
                .map(|v| v as i32)
                .ok_or(())
        })
        .map_err(|_| format!("'{field}' is not an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: FixedWidthLayout = FixedWidthLayout::new(&[4, 3, 5]);

    #[test]
    fn test_split() {
        assert_eq!(LAYOUT.split("2021 12 -0.5"), vec!["2021", "12", "-0.5"]);
        assert_eq!(LAYOUT.split("2021  1"), vec!["2021", "1", ""]);
        assert_eq!(LAYOUT.split(""), vec!["", "", ""]);
        assert_eq!(LAYOUT.line_width(), 12);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 1.25", &[]), Ok(Some(1.25)));
        assert_eq!(parse_value("99.99", &[99.99]), Ok(None));
        assert_eq!(parse_value("-999.9", &[-999.9]), Ok(None));
        assert_eq!(parse_value("*****", &[]), Ok(None));
        assert_eq!(parse_value("   ", &[]), Ok(None));
        assert!(parse_value("abc", &[]).is_err());
        assert_eq!(parse_value_or_warn("abc", &[], Path::new("t.txt"), 3), None);
        assert_eq!(parse_value_or_warn("-999.9", &[-999.9], Path::new("t.txt"), 3), None);
        assert_eq!(parse_value_or_warn("0.5", &[], Path::new("t.txt"), 3), Some(0.5));
        assert_eq!(parse_integer("2020"), Ok(2020));
        assert_eq!(parse_integer("2020.0"), Ok(2020));
        assert!(parse_integer("20x").is_err());
    }
}
