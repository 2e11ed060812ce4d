use crate::{
    core::constants::{PIN_ICON_SIZE, STYLE_CACHE_CAPACITY},
    data::model::LocationGroup,
    style::{
        color::Color,
        resolver::{circle_style, pin_styles, RenderStyle},
    },
    traits::CacheStats,
};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Everything a resolved style depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StyleKey {
    Marker {
        color: Color,
        /// `None` when labels are hidden
        label: Option<String>,
        unit_count: usize,
    },
    Cluster {
        color: Color,
        count: usize,
    },
}

/// Memoises resolved styles by their inputs.
///
/// Keys carry the colour, the unit count and the label text (absent when
/// labels are hidden), so toggling labels or recolouring a dataset can
/// never return a stale entry.
#[derive(Debug)]
pub struct StyleCache {
    cache: LruCache<StyleKey, Vec<RenderStyle>>,
    pin_size: u32,
    stats: CacheStats,
}

impl StyleCache {
    pub fn new(capacity: usize, pin_size: u32) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(STYLE_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            pin_size,
            stats: CacheStats::default(),
        }
    }

    pub fn marker(&mut self, group: &LocationGroup, show_labels: bool) -> Vec<RenderStyle> {
        let color = Color::from_dataset(group.color());
        let key = StyleKey::Marker {
            color,
            label: show_labels.then(|| group.name.clone()),
            unit_count: group.unit_count(),
        };
        let pin_size = self.pin_size;
        self.resolve(key, || {
            pin_styles(color, &group.name, group.unit_count(), show_labels, pin_size)
        })
    }

    pub fn cluster(&mut self, members: &[LocationGroup]) -> RenderStyle {
        let color = Color::from_dataset(members.first().and_then(LocationGroup::color));
        let count = members.len();
        self.resolve(StyleKey::Cluster { color, count }, || {
            vec![circle_style(color, count)]
        })
        .into_iter()
        .next()
        .unwrap_or_else(|| circle_style(color, count))
    }

    fn resolve<F>(&mut self, key: StyleKey, build: F) -> Vec<RenderStyle>
    where
        F: FnOnce() -> Vec<RenderStyle>,
    {
        if let Some(styles) = self.cache.get(&key) {
            self.stats.hits += 1;
            return styles.clone();
        }
        self.stats.misses += 1;
        let styles = build();
        self.cache.put(key, styles.clone());
        self.stats.size = self.cache.len();
        styles
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats.size = 0;
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new(STYLE_CACHE_CAPACITY, PIN_ICON_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::model::{LocationRecord, TaggedLocation},
        style::resolver::{cluster_style, marker_style},
    };

    fn group(name: &str, color: &str) -> LocationGroup {
        LocationGroup::seeded(
            TaggedLocation {
                record: LocationRecord::new(name, "addr").with_coordinates(37.5, 127.0),
                dataset_id: "d1".to_string(),
                dataset_name: "d1".to_string(),
                dataset_color: color.to_string(),
            },
            37.5,
            127.0,
        )
    }

    #[test]
    fn test_cached_styles_match_resolver() {
        let mut cache = StyleCache::default();
        let g = group("Villa", "#9b59b6");

        assert_eq!(cache.marker(&g, true), marker_style(&g, true));
        assert_eq!(cache.marker(&g, true), marker_style(&g, true));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);

        let members = vec![g.clone(), group("b", "#9b59b6")];
        assert_eq!(cache.cluster(&members), cluster_style(&members));
    }

    #[test]
    fn test_label_toggle_and_color_change_miss() {
        let mut cache = StyleCache::default();
        let g = group("Villa", "#9b59b6");

        cache.marker(&g, true);
        let hidden = cache.marker(&g, false);
        assert!(hidden[0].as_pin().unwrap().label.is_none());

        let recolored = cache.marker(&group("Villa", "#e74c3c"), true);
        assert!(recolored[0].as_pin().unwrap().svg.contains("#e74c3c"));
        assert_eq!(cache.stats().misses, 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_capacity_bounds_entries() {
        let mut cache = StyleCache::new(2, 24);
        for name in ["a", "b", "c"] {
            cache.marker(&group(name, "#3498db"), true);
        }
        assert_eq!(cache.len(), 2);
    }
}
