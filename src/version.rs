//! Chrome Version Strings
//!
//! Dotted numeric versions ("120.0.6099.129") with a distinguished `Unknown`
//! value for anything that could not be read or parsed. Parsing never fails;
//! malformed input degrades to `Unknown` instead.

use std::fmt;

/// An installed or published Chrome version.
///
/// Ordering conventions (kept deliberately, callers beware):
/// - `Unknown` sorts below every concrete version
/// - `Unknown == Unknown` (ambiguous by convention)
/// - components compare numerically left-to-right; on a common prefix the
///   shorter sequence is smaller, so `1.2 < 1.2.0`
///
/// The derived `Ord` on the variants and on `Vec<u64>` yields exactly these
/// rules: variant order puts `Unknown` first, and `Vec` ordering is
/// element-wise with length as the final tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    Unknown,
    Known(Vec<u64>),
}

impl Version {
    /// Parse a dot-separated version string.
    ///
    /// Every component must be a non-negative integer; anything else
    /// (including the empty string) yields `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Version::Unknown;
        }

        let mut components = Vec::new();
        for part in s.split('.') {
            match part.trim().parse::<u64>() {
                Ok(n) => components.push(n),
                Err(_) => return Version::Unknown,
            }
        }
        Version::Known(components)
    }

    /// Whether this is a concrete (parsed) version.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Version::Known(_))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Unknown => write!(f, "Unknown"),
            Version::Known(components) => {
                let mut first = true;
                for c in components {
                    if !first {
                        write!(f, ".")?;
                    }
                    write!(f, "{c}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn parse_valid_version() {
        assert_eq!(
            Version::parse("120.0.6099.129"),
            Version::Known(vec![120, 0, 6099, 129])
        );
        assert_eq!(Version::parse(" 1.2 "), Version::Known(vec![1, 2]));
    }

    #[test]
    fn parse_garbage_is_unknown() {
        assert_eq!(Version::parse(""), Version::Unknown);
        assert_eq!(Version::parse("Unknown"), Version::Unknown);
        assert_eq!(Version::parse("1.2.x"), Version::Unknown);
        assert_eq!(Version::parse("1..2"), Version::Unknown);
        assert_eq!(Version::parse("-1.2"), Version::Unknown);
    }

    #[test]
    fn compare_is_reflexive() {
        for s in ["1", "1.2", "120.0.6099.129", "0.0.0"] {
            let v = Version::parse(s);
            assert_eq!(v.cmp(&v), Ordering::Equal, "{s} should equal itself");
        }
    }

    #[test]
    fn compare_is_antisymmetric() {
        let pairs = [
            ("1.0", "2.0"),
            ("119.0.0.0", "120.0.0.0"),
            ("1.2", "1.2.0"),
            ("9.0", "10.0"),
        ];
        for (a, b) in pairs {
            let (va, vb) = (Version::parse(a), Version::parse(b));
            assert_eq!(va.cmp(&vb), vb.cmp(&va).reverse(), "{a} vs {b}");
        }
    }

    #[test]
    fn compare_is_numeric_not_lexicographic() {
        assert_eq!(
            Version::parse("9.0").cmp(&Version::parse("10.0")),
            Ordering::Less
        );
    }

    #[test]
    fn prefix_is_smaller() {
        assert_eq!(
            Version::parse("1.2").cmp(&Version::parse("1.2.0")),
            Ordering::Less
        );
    }

    #[test]
    fn unknown_is_below_everything() {
        assert_eq!(
            Version::Unknown.cmp(&Version::parse("1.0")),
            Ordering::Less
        );
        assert_eq!(
            Version::parse("1.0").cmp(&Version::Unknown),
            Ordering::Greater
        );
        assert_eq!(
            Version::parse("0").cmp(&Version::Unknown),
            Ordering::Greater
        );
    }

    #[test]
    fn unknown_equals_unknown() {
        assert_eq!(Version::Unknown.cmp(&Version::Unknown), Ordering::Equal);
    }

    #[test]
    fn display_round_trip() {
        assert_eq!(Version::parse("120.0.6099.129").to_string(), "120.0.6099.129");
        assert_eq!(Version::Unknown.to_string(), "Unknown");
    }
}
