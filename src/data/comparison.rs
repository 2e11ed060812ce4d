use crate::data::model::TaggedLocation;

fn same_coordinate(a: Option<f64>, b: Option<f64>) -> bool {
    a.map(f64::to_bits) == b.map(f64::to_bits)
}

/// Cheap skip-gate deciding whether a location list needs a rebuild.
///
/// Lists of different length always differ. Otherwise entries are compared
/// position by position on name, coordinates, price and dataset id; a pure
/// reordering of identical values reports no change.
pub fn locations_changed(next: &[TaggedLocation], prev: &[TaggedLocation]) -> bool {
    if next.len() != prev.len() {
        log::debug!("location count changed: {} -> {}", prev.len(), next.len());
        return true;
    }

    let changed = next.iter().enumerate().any(|(index, next_loc)| {
        let Some(prev_loc) = prev.get(index) else {
            return true;
        };
        next_loc.record.name != prev_loc.record.name
            || !same_coordinate(next_loc.record.lat, prev_loc.record.lat)
            || !same_coordinate(next_loc.record.lon, prev_loc.record.lon)
            || !next_loc.record.same_price(&prev_loc.record)
            || next_loc.dataset_id != prev_loc.dataset_id
    });

    log::debug!(
        "compared {} locations: {}",
        next.len(),
        if changed { "changed" } else { "unchanged" }
    );
    changed
}
