//! Upstream station identifiers.

use std::fmt;

/// Error returned when parsing an invalid station ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station ID: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// An identifier understood by the upstream arrivals API.
///
/// Station IDs are opaque to us: the upstream happens to use numeric strings,
/// but nothing here relies on that. The only guarantee is that the ID is
/// non-empty and contains no whitespace, so it can be passed as a query
/// parameter as-is.
///
/// # Examples
///
/// ```
/// use arrivals_server::domain::StationId;
///
/// let id = StationId::parse(" 20623 ").unwrap();
/// assert_eq!(id.as_str(), "20623");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("206 23").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Parse a station ID, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidStationId {
                reason: "must not contain whitespace or control characters",
            });
        }

        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the station ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StationId::parse("20623").is_ok());
        assert!(StationId::parse("abc-1").is_ok());
        assert!(StationId::parse("X").is_ok());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let id = StationId::parse("  21711\n").unwrap();
        assert_eq!(id.as_str(), "21711");
    }

    #[test]
    fn reject_empty_and_blank() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("   ").is_err());
        assert!(StationId::parse("\t").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        assert!(StationId::parse("206 23").is_err());
        assert!(StationId::parse("206\t23").is_err());
    }

    #[test]
    fn display_and_debug() {
        let id = StationId::parse("20621").unwrap();
        assert_eq!(format!("{}", id), "20621");
        assert_eq!(format!("{:?}", id), "StationId(20621)");
    }

    #[test]
    fn error_display() {
        let err = StationId::parse("").unwrap_err();
        assert_eq!(err.to_string(), "invalid station ID: must not be empty");
    }
}
