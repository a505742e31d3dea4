//! Platform → station lookup.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::{PlatformId, StationId};

use super::error::DirectoryError;

/// Stations feeding the central platforms.
const CENTRAL: &[&str] = &["20623", "20624"];

/// The deployment this service was built for.
///
/// Every platform is fed by the two central stations; the outer platforms
/// pick up one extra stop each.
const BUILTIN: &[(&str, &[&str])] = &[
    ("1", CENTRAL),
    ("2", CENTRAL),
    ("3", CENTRAL),
    ("4", CENTRAL),
    ("5", CENTRAL),
    ("6", CENTRAL),
    ("7", CENTRAL),
    ("8", CENTRAL),
    ("9", CENTRAL),
    ("10", CENTRAL),
    ("EAST", &["20623", "20624", "20621"]),
    ("SOUTH", &["20623", "20624", "21711"]),
    ("MAIN", CENTRAL),
    ("WEST", CENTRAL),
];

/// Read-only mapping from platforms to the upstream stations that report
/// arrivals for them.
///
/// Lookups never fail: a platform the directory doesn't know about has no
/// stations, which callers treat as "no arrivals" rather than a fault.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    table: HashMap<PlatformId, Vec<StationId>>,
}

impl StationDirectory {
    /// The built-in table.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(platform, stations)| (*platform, stations.iter().copied()));

        // The built-in table is static and known to be well-formed.
        Self::from_entries(entries).unwrap_or_default()
    }

    /// Build a directory from `(platform, stations)` pairs.
    ///
    /// Platform keys are canonicalized; two keys that canonicalize to the
    /// same platform are rejected rather than silently merged. Station order
    /// is preserved.
    pub fn from_entries<'a, I, S>(entries: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = (&'a str, S)>,
        S: IntoIterator<Item = &'a str>,
    {
        let mut table = HashMap::new();

        for (raw_platform, raw_stations) in entries {
            let platform = PlatformId::new(raw_platform);

            let stations = raw_stations
                .into_iter()
                .map(|s| {
                    StationId::parse(s).map_err(|_| DirectoryError::InvalidStation {
                        platform: platform.to_string(),
                        value: s.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            match table.entry(platform) {
                Entry::Occupied(e) => {
                    return Err(DirectoryError::DuplicatePlatform {
                        platform: e.key().to_string(),
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(stations);
                }
            }
        }

        Ok(Self { table })
    }

    /// Stations for a platform given as user input (any case, any padding).
    pub fn stations_for(&self, platform: &str) -> &[StationId] {
        self.stations(&PlatformId::new(platform))
    }

    /// Stations for an already-canonical platform.
    pub fn stations(&self, platform: &PlatformId) -> &[StationId] {
        self.table.get(platform).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All known platforms, sorted.
    pub fn platforms(&self) -> Vec<&PlatformId> {
        let mut platforms: Vec<_> = self.table.keys().collect();
        platforms.sort();
        platforms
    }

    /// Number of platforms in the directory.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(directory: &StationDirectory, platform: &str) -> Vec<String> {
        directory
            .stations_for(platform)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    #[test]
    fn builtin_covers_every_platform() {
        let directory = StationDirectory::builtin();
        assert_eq!(directory.len(), 14);
        assert_eq!(ids(&directory, "1"), vec!["20623", "20624"]);
        assert_eq!(ids(&directory, "EAST"), vec!["20623", "20624", "20621"]);
        assert_eq!(ids(&directory, "SOUTH"), vec!["20623", "20624", "21711"]);
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let directory = StationDirectory::builtin();
        assert_eq!(ids(&directory, " east "), ids(&directory, "EAST"));
        assert_eq!(ids(&directory, "Main"), ids(&directory, "MAIN"));
    }

    #[test]
    fn unknown_platform_has_no_stations() {
        let directory = StationDirectory::builtin();
        assert!(directory.stations_for("UNKNOWN").is_empty());
        assert!(directory.stations_for("").is_empty());
    }

    #[test]
    fn preserves_station_order() {
        let directory =
            StationDirectory::from_entries([("north", ["3", "1", "2"])]).unwrap();
        assert_eq!(ids(&directory, "NORTH"), vec!["3", "1", "2"]);
    }

    #[test]
    fn rejects_duplicate_platform_after_canonicalization() {
        let result = StationDirectory::from_entries([("east", ["1"]), ("EAST ", ["2"])]);
        assert!(matches!(
            result,
            Err(DirectoryError::DuplicatePlatform { platform }) if platform == "EAST"
        ));
    }

    #[test]
    fn rejects_blank_station() {
        let result = StationDirectory::from_entries([("1", ["20623", "  "])]);
        assert!(matches!(
            result,
            Err(DirectoryError::InvalidStation { platform, .. }) if platform == "1"
        ));
    }

    #[test]
    fn platforms_are_sorted() {
        let directory =
            StationDirectory::from_entries([("west", ["1"]), ("east", ["2"]), ("main", ["3"])])
                .unwrap();
        let names: Vec<_> = directory.platforms().iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["EAST", "MAIN", "WEST"]);
    }
}
