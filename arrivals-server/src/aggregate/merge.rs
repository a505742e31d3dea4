//! Merging arrivals reported by overlapping stations.
//!
//! Neighbouring stations often see the same bus. Duplicates are collapsed
//! by identity key and the survivors are ranked for display.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::Arrival;

/// Identity of the vehicle behind an arrival.
///
/// The vehicle ID is used when present, since two stations reporting the
/// same vehicle are by definition the same bus. Without one, route plus
/// predicted duration stands in. Two distinct vehicles on the same route
/// predicted at exactly the same millisecond will collapse into one; the
/// upstream gives us nothing better to tell them apart.
pub fn identity_key(arrival: &Arrival) -> String {
    match arrival.vehicle_id() {
        Some(vehicle_id) => format!("vid_{vehicle_id}"),
        None => format!(
            "{}_{}",
            arrival.route_number().trim().to_uppercase(),
            arrival.duration_ms()
        ),
    }
}

/// Deduplicate and rank arrivals.
///
/// For each identity key the arrival with the smallest `duration_ms` is
/// kept (the first one seen on a tie). The result lists arrivals with a
/// known location first, then by ascending duration; anything equal on
/// both keeps the order in which its key was first seen.
///
/// Merging an already merged list returns it unchanged.
pub fn merge_arrivals(arrivals: impl IntoIterator<Item = Arrival>) -> Vec<Arrival> {
    let mut merged: Vec<Arrival> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for arrival in arrivals {
        match slot_by_key.entry(identity_key(&arrival)) {
            Entry::Occupied(e) => {
                let existing = &mut merged[*e.get()];
                if arrival.duration_ms() < existing.duration_ms() {
                    *existing = arrival;
                }
            }
            Entry::Vacant(e) => {
                e.insert(merged.len());
                merged.push(arrival);
            }
        }
    }

    rank_arrivals(&mut merged);
    merged
}

/// Sort arrivals for display: located vehicles first, then soonest first.
///
/// The sort is stable.
pub fn rank_arrivals(arrivals: &mut [Arrival]) {
    arrivals.sort_by_key(|a| (!a.has_location(), a.duration_ms()));
}
