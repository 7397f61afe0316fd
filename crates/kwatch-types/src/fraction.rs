use std::fmt;

use crate::cell::CellStyle;

/// A "count/total" cell, e.g. ready replica counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub count: i64,
    pub total: i64,
}

impl Fraction {
    /// Parse "1/2" style text. Anything else is not a fraction.
    pub fn parse(s: &str) -> Option<Fraction> {
        let (count, total) = s.split_once('/')?;
        Some(Fraction {
            count: parse_int(count)?,
            total: parse_int(total)?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.count == self.total
    }

    /// Style for a fraction cell: green when complete, yellow otherwise.
    pub fn style(&self) -> CellStyle {
        if self.is_complete() {
            CellStyle::Ok
        } else {
            CellStyle::Warning
        }
    }
}

fn parse_int(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractions() {
        assert_eq!(Fraction::parse("1/2"), Some(Fraction { count: 1, total: 2 }));
        assert_eq!(Fraction::parse("3/3"), Some(Fraction { count: 3, total: 3 }));
    }

    #[test]
    fn rejects_non_fractions() {
        assert_eq!(Fraction::parse("Running"), None);
        assert_eq!(Fraction::parse("1/"), None);
        assert_eq!(Fraction::parse("/2"), None);
        assert_eq!(Fraction::parse("1/2/3"), None);
        assert_eq!(Fraction::parse("-1/2"), None);
        assert_eq!(Fraction::parse(""), None);
    }

    #[test]
    fn complete_is_ok_incomplete_warns() {
        assert_eq!(Fraction::parse("2/2").unwrap().style(), CellStyle::Ok);
        assert_eq!(Fraction::parse("0/1").unwrap().style(), CellStyle::Warning);
    }
}
