//! Listing records, datasets and the groups rendered on the map.

use crate::core::geo::LatLng;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn same_amount(a: Option<f64>, b: Option<f64>) -> bool {
    a.map(f64::to_bits) == b.map(f64::to_bits)
}

/// Single price tuple of a listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale: Option<f64>,
}

// Bitwise so that a record always equals itself, NaN amounts included.
impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        same_amount(self.deposit, other.deposit)
            && same_amount(self.monthly, other.monthly)
            && same_amount(self.sale, other.sale)
    }
}

/// Named deposit/rent tier of a multi-tier listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly: Option<f64>,
}

impl PartialEq for PriceSet {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && same_amount(self.deposit, other.deposit)
            && same_amount(self.monthly, other.monthly)
    }
}

/// One spreadsheet row after parsing and optional geocoding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub living_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_sets: Vec<PriceSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl LocationRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Coordinates usable for grouping.
    ///
    /// Missing, NaN and exactly-zero values all mean "not geocoded"; spreadsheet
    /// exports write `0` for rows the geocoder could not resolve.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let usable = |v: Option<f64>| v.filter(|v| !v.is_nan() && *v != 0.0);
        Some((usable(self.lat)?, usable(self.lon)?))
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Both price forms together make up the record's price information
    pub fn same_price(&self, other: &LocationRecord) -> bool {
        self.price == other.price && self.price_sets == other.price_sets
    }
}

/// One uploaded file's records plus presentation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub data: Vec<LocationRecord>,
    pub color: String,
}

impl Dataset {
    /// Tags every record with this dataset's identity
    pub fn tagged(&self) -> impl Iterator<Item = TaggedLocation> + '_ {
        self.data.iter().map(move |record| TaggedLocation {
            record: record.clone(),
            dataset_id: self.id.clone(),
            dataset_name: self.name.clone(),
            dataset_color: self.color.clone(),
        })
    }
}

/// A record annotated with its owning dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedLocation {
    #[serde(flatten)]
    pub record: LocationRecord,
    pub dataset_id: String,
    pub dataset_name: String,
    pub dataset_color: String,
}

impl TaggedLocation {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.record.coordinates()
    }
}

/// Every tagged location sharing one exact coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGroup {
    /// `"{lat}_{lon}"`
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub units: Vec<TaggedLocation>,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevator: Option<bool>,
}

impl LocationGroup {
    pub fn coordinate_key(lat: f64, lon: f64) -> String {
        format!("{}_{}", lat, lon)
    }

    /// Starts a group whose representative fields come from `first`
    pub fn seeded(first: TaggedLocation, lat: f64, lon: f64) -> Self {
        Self {
            id: Self::coordinate_key(lat, lon),
            lat,
            lon,
            name: first.record.name.clone(),
            address: first.record.address.clone(),
            house_type: first.record.house_type.clone(),
            elevator: first.record.elevator,
            units: vec![first],
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Colour of the first unit's dataset.
    ///
    /// Mixed-dataset groups keep the first unit's colour.
    pub fn color(&self) -> Option<&str> {
        self.units.first().map(|unit| unit.dataset_color.as_str())
    }

    /// Dataset owning this group for layer partitioning (first unit wins)
    pub fn dataset_id(&self) -> Option<&str> {
        self.units.first().map(|unit| unit.dataset_id.as_str())
    }

    pub fn spans_datasets(&self) -> bool {
        match self.dataset_id() {
            Some(first) => self.units.iter().any(|unit| unit.dataset_id != first),
            None => false,
        }
    }
}
