use crate::{
    data::model::{LocationGroup, TaggedLocation},
    prelude::HashMap,
};

/// Collapses tagged locations sharing an exact coordinate into groups.
///
/// Locations without usable coordinates are skipped. Units keep input order
/// inside their group and groups are emitted in first-occurrence order.
pub fn group_locations_by_coordinates(locations: &[TaggedLocation]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::default();

    for location in locations {
        let Some((lat, lon)) = location.coordinates() else {
            continue;
        };
        let key = LocationGroup::coordinate_key(lat, lon);

        match index_by_key.get(&key) {
            Some(&index) => groups[index].units.push(location.clone()),
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(LocationGroup::seeded(location.clone(), lat, lon));
            }
        }
    }

    let skipped = locations.len() - groups.iter().map(LocationGroup::unit_count).sum::<usize>();
    log::debug!(
        "grouped {} locations into {} groups ({} without coordinates)",
        locations.len(),
        groups.len(),
        skipped
    );

    groups
}
