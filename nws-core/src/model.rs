use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    criteria::Param,
    error::CriteriaError,
    table::{Domain, VALIDATION_TABLE},
};

/// Active alert totals from `/alerts/active/count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCount {
    pub total: u64,
    pub land: u64,
    pub marine: u64,
    #[serde(default)]
    pub regions: BTreeMap<String, u64>,
    #[serde(default)]
    pub areas: BTreeMap<String, u64>,
    #[serde(default)]
    pub zones: BTreeMap<String, u64>,
}

impl AlertCount {
    /// Counts for the requested land areas; areas with no alerts map to 0.
    pub fn filter_land_areas(&self, areas: &[&str]) -> Result<BTreeMap<String, u64>, CriteriaError> {
        pick_validated(&self.areas, areas, Domain::LandArea, Param::Area)
    }

    /// Counts for the requested marine regions; regions with no alerts map to 0.
    pub fn filter_marine_regions(
        &self,
        regions: &[&str],
    ) -> Result<BTreeMap<String, u64>, CriteriaError> {
        pick_validated(&self.regions, regions, Domain::MarineRegion, Param::Region)
    }

    /// Counts for the requested zone ids. Zones are not validated.
    pub fn filter_zones(&self, zones: &[&str]) -> BTreeMap<String, u64> {
        zones
            .iter()
            .map(|zone| {
                let zone = zone.trim().to_ascii_uppercase();
                let count = self.zones.get(&zone).copied().unwrap_or(0);
                (zone, count)
            })
            .collect()
    }
}

fn pick_validated(
    counts: &BTreeMap<String, u64>,
    wanted: &[&str],
    domain: Domain,
    field: Param,
) -> Result<BTreeMap<String, u64>, CriteriaError> {
    wanted
        .iter()
        .map(|raw| {
            let key = VALIDATION_TABLE.canonical(domain, raw).ok_or_else(|| {
                CriteriaError::DataValidation { field, value: raw.to_string() }
            })?;
            Ok((key.to_string(), counts.get(key).copied().unwrap_or(0)))
        })
        .collect()
}

/// Event names from `/alerts/types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertTypes {
    pub event_types: Vec<String>,
}

/// Glossary from `/glossary`, keyed by term.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Glossary {
    pub terms: BTreeMap<String, String>,
}

impl Glossary {
    /// Case-insensitive lookup.
    pub fn define(&self, term: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(term.trim()))
            .map(|(_, definition)| definition.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawGlossary {
    #[serde(default)]
    glossary: Vec<RawGlossaryEntry>,
}

#[derive(Debug, Deserialize)]
struct RawGlossaryEntry {
    term: Option<String>,
    definition: Option<String>,
}

impl<'de> Deserialize<'de> for Glossary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawGlossary::deserialize(deserializer)?;
        let terms = raw
            .glossary
            .into_iter()
            .filter_map(|entry| Some((entry.term?, entry.definition?)))
            .collect();
        Ok(Glossary { terms })
    }
}

/// Metadata for a latitude/longitude from `/points/{lat},{lon}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInfo {
    pub grid_id: String,
    pub grid_x: i64,
    pub grid_y: i64,
    pub forecast: Option<String>,
    pub forecast_hourly: Option<String>,
    pub forecast_zone: Option<String>,
    pub county: Option<String>,
    pub fire_weather_zone: Option<String>,
    pub time_zone: Option<String>,
    pub radar_station: Option<String>,
    #[serde(skip_deserializing)]
    pub city: Option<String>,
    #[serde(skip_deserializing)]
    pub state: Option<String>,
}

impl PointInfo {
    /// Decodes the `properties` object of a points response, pulling the
    /// nearest city and state out of `relativeLocation`.
    pub fn from_properties(properties: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut info = PointInfo::deserialize(properties)?;

        let relative = &properties["relativeLocation"]["properties"];
        info.city = relative["city"].as_str().map(str::to_string);
        info.state = relative["state"].as_str().map(str::to_string);

        // Zone fields are full URLs; keep only the zone id.
        for zone in [&mut info.forecast_zone, &mut info.county, &mut info.fire_weather_zone] {
            if let Some(url) = zone.as_mut() {
                if let Some(id) = url.rsplit('/').next() {
                    *url = id.to_string();
                }
            }
        }

        Ok(info)
    }
}

/// An observation station near a point, from `/points/{lat},{lon}/stations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub identifier: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub time_zone: Option<String>,
    pub elevation_m: Option<f64>,
}

/// Stations in the order the API lists them, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationList {
    #[serde(rename = "features", default)]
    pub stations: Vec<Station>,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    geometry: RawPoint,
    properties: RawStationProperties,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStationProperties {
    station_identifier: String,
    name: String,
    time_zone: Option<String>,
    elevation: Option<RawMeasure>,
}

#[derive(Debug, Deserialize)]
struct RawMeasure {
    value: Option<f64>,
}

impl<'de> Deserialize<'de> for Station {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawStation::deserialize(deserializer)?;
        let [lon, lat, ..] = raw.geometry.coordinates[..] else {
            return Err(serde::de::Error::custom("station position needs longitude and latitude"));
        };

        Ok(Station {
            identifier: raw.properties.station_identifier,
            name: raw.properties.name,
            lat,
            lon,
            time_zone: raw.properties.time_zone,
            elevation_m: raw.properties.elevation.and_then(|e| e.value),
        })
    }
}

/// Response of the API root, used as a health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
}

impl ServerStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
