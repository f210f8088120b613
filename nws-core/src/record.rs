//! Parsed alert records.
//!
//! One [`AlertRecord`] is built from one raw GeoJSON feature of the
//! `/alerts` family of endpoints and never changes afterwards.

use chrono::{DateTime, FixedOffset, Utc};
use geo::{BoundingRect, Coord, Intersects, LineString, Point, Polygon, Rect};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::{
    error::RecordError,
    table::{Domain, VALIDATION_TABLE},
};

/// The five time fields carried by every alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    Sent,
    Effective,
    Onset,
    Expires,
    Ends,
}

impl TimeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeField::Sent => "sent",
            TimeField::Effective => "effective",
            TimeField::Onset => "onset",
            TimeField::Expires => "expires",
            TimeField::Ends => "ends",
        }
    }

    pub const fn all() -> &'static [TimeField] {
        &[
            TimeField::Sent,
            TimeField::Effective,
            TimeField::Onset,
            TimeField::Expires,
            TimeField::Ends,
        ]
    }
}

/// An issued-local timestamp together with its UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub local: DateTime<FixedOffset>,
    pub utc: DateTime<Utc>,
}

impl Timestamp {
    pub fn new(local: DateTime<FixedOffset>) -> Self {
        Self { local, utc: local.with_timezone(&Utc) }
    }

    fn parse(field: TimeField, raw: Option<String>) -> Result<Option<Self>, RecordError> {
        let Some(raw) = raw else {
            return Ok(None);
        };

        let local = DateTime::parse_from_rfc3339(&raw).map_err(|source| RecordError::Time {
            field: field.as_str(),
            value: raw.clone(),
            source,
        })?;

        Ok(Some(Self::new(local)))
    }
}

/// Geometry attached to an alert. Coordinates are `x = lon`, `y = lat`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertGeometry {
    Points(Vec<Coord<f64>>),
    Polygon {
        points: Vec<Coord<f64>>,
        polygon: Polygon<f64>,
    },
    MultiPolygon {
        points: Vec<Vec<Coord<f64>>>,
        polygons: Vec<Polygon<f64>>,
    },
}

impl AlertGeometry {
    /// Every coordinate, flattened across polygons.
    pub fn coords(&self) -> Vec<Coord<f64>> {
        match self {
            AlertGeometry::Points(points) | AlertGeometry::Polygon { points, .. } => points.clone(),
            AlertGeometry::MultiPolygon { points, .. } => points.iter().flatten().copied().collect(),
        }
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            AlertGeometry::Points(_) => &[],
            AlertGeometry::Polygon { polygon, .. } => std::slice::from_ref(polygon),
            AlertGeometry::MultiPolygon { polygons, .. } => polygons,
        }
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        LineString::from(self.coords()).bounding_rect()
    }

    /// Whether the point lies inside or on the boundary of the geometry.
    /// Point geometries match only exactly equal coordinates.
    pub fn intersects_point(&self, lat: f64, lon: f64) -> bool {
        let point = Point::new(lon, lat);
        match self {
            AlertGeometry::Points(points) => points.iter().any(|c| c.x == lon && c.y == lat),
            _ => self.polygons().iter().any(|polygon| polygon.intersects(&point)),
        }
    }
}

/// One parsed alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub id: String,
    /// Canonical product name, e.g. "Tornado Warning".
    pub event: String,
    pub severity: String,
    pub certainty: String,
    pub urgency: String,
    pub status: String,
    pub message_type: String,
    pub category: Option<String>,
    pub sender_name: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub sent: Option<Timestamp>,
    pub effective: Option<Timestamp>,
    pub onset: Option<Timestamp>,
    pub expires: Option<Timestamp>,
    pub ends: Option<Timestamp>,
    /// Zone ids, e.g. "TXZ123".
    pub affected_zones: Vec<String>,
    pub area_descriptions: Vec<String>,
    pub geometry: Option<AlertGeometry>,
}

impl AlertRecord {
    pub fn time(&self, field: TimeField) -> Option<&Timestamp> {
        match field {
            TimeField::Sent => self.sent.as_ref(),
            TimeField::Effective => self.effective.as_ref(),
            TimeField::Onset => self.onset.as_ref(),
            TimeField::Expires => self.expires.as_ref(),
            TimeField::Ends => self.ends.as_ref(),
        }
    }

    pub fn utc(&self, field: TimeField) -> Option<DateTime<Utc>> {
        self.time(field).map(|t| t.utc)
    }
}

/// Orders two alerts by one of their time fields, in UTC.
///
/// Returns `None` when either alert lacks the field.
pub fn compare_by(a: &AlertRecord, b: &AlertRecord, field: TimeField) -> Option<Ordering> {
    Some(a.utc(field)?.cmp(&b.utc(field)?))
}

pub fn occurred_before(a: &AlertRecord, b: &AlertRecord, field: TimeField) -> bool {
    compare_by(a, b, field) == Some(Ordering::Less)
}

pub fn occurred_after(a: &AlertRecord, b: &AlertRecord, field: TimeField) -> bool {
    compare_by(a, b, field) == Some(Ordering::Greater)
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<String>,
    properties: RawProperties,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperties {
    id: Option<String>,
    event: Option<String>,
    severity: Option<String>,
    certainty: Option<String>,
    urgency: Option<String>,
    status: Option<String>,
    message_type: Option<String>,
    category: Option<String>,
    sender_name: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    instruction: Option<String>,
    sent: Option<String>,
    effective: Option<String>,
    onset: Option<String>,
    expires: Option<String>,
    ends: Option<String>,
    #[serde(default)]
    affected_zones: Vec<String>,
    area_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// GeoJSON position: `[lon, lat]`, optionally followed by altitude.
type Position = Vec<f64>;

/// Builds an [`AlertRecord`] from one raw alert feature.
pub fn parse_feature(raw: &serde_json::Value) -> Result<AlertRecord, RecordError> {
    let feature = RawFeature::deserialize(raw)?;
    let props = feature.properties;

    let id = props.id.or(feature.id).ok_or(RecordError::MissingField("id"))?;

    let raw_event = props.event.ok_or(RecordError::MissingField("event"))?;
    let event = VALIDATION_TABLE
        .canonical(Domain::Product, &raw_event)
        .ok_or(RecordError::UnknownEvent(raw_event))?
        .to_string();

    let affected_zones = props
        .affected_zones
        .iter()
        .filter_map(|urn| urn.trim_end_matches('/').rsplit('/').next())
        .map(str::to_string)
        .collect();

    let area_descriptions = props
        .area_desc
        .as_deref()
        .map(|desc| desc.split(';').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    Ok(AlertRecord {
        id,
        event,
        severity: props.severity.ok_or(RecordError::MissingField("severity"))?,
        certainty: props.certainty.ok_or(RecordError::MissingField("certainty"))?,
        urgency: props.urgency.ok_or(RecordError::MissingField("urgency"))?,
        status: props.status.ok_or(RecordError::MissingField("status"))?,
        message_type: props.message_type.ok_or(RecordError::MissingField("messageType"))?,
        category: props.category,
        sender_name: props.sender_name,
        headline: props.headline,
        description: props.description,
        instruction: props.instruction,
        sent: Timestamp::parse(TimeField::Sent, props.sent)?,
        effective: Timestamp::parse(TimeField::Effective, props.effective)?,
        onset: Timestamp::parse(TimeField::Onset, props.onset)?,
        expires: Timestamp::parse(TimeField::Expires, props.expires)?,
        ends: Timestamp::parse(TimeField::Ends, props.ends)?,
        affected_zones,
        area_descriptions,
        geometry: parse_geometry(feature.geometry)?,
    })
}

fn parse_geometry(raw: Option<RawGeometry>) -> Result<Option<AlertGeometry>, RecordError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let geometry = match raw.kind.as_str() {
        "Point" => {
            let position: Position = decode_coordinates(&raw)?;
            AlertGeometry::Points(vec![to_coord(&raw.kind, &position)?])
        }
        "Polygon" => {
            let rings: Vec<Vec<Position>> = decode_coordinates(&raw)?;
            let points = exterior_ring(&raw.kind, &rings)?;
            let polygon = Polygon::new(LineString::from(points.clone()), vec![]);
            AlertGeometry::Polygon { points, polygon }
        }
        "MultiPolygon" => {
            let members: Vec<Vec<Vec<Position>>> = decode_coordinates(&raw)?;
            let mut points = Vec::with_capacity(members.len());
            let mut polygons = Vec::with_capacity(members.len());
            for rings in &members {
                let ring = exterior_ring(&raw.kind, rings)?;
                polygons.push(Polygon::new(LineString::from(ring.clone()), vec![]));
                points.push(ring);
            }
            AlertGeometry::MultiPolygon { points, polygons }
        }
        other => {
            log::debug!("Ignoring unsupported alert geometry type `{other}`");
            return Ok(None);
        }
    };

    Ok(Some(geometry))
}

fn decode_coordinates<T: serde::de::DeserializeOwned>(raw: &RawGeometry) -> Result<T, RecordError> {
    T::deserialize(&raw.coordinates).map_err(|e| RecordError::Geometry {
        kind: raw.kind.clone(),
        message: e.to_string(),
    })
}

fn exterior_ring(kind: &str, rings: &[Vec<Position>]) -> Result<Vec<Coord<f64>>, RecordError> {
    let ring = rings.first().ok_or_else(|| RecordError::Geometry {
        kind: kind.to_string(),
        message: "polygon has no rings".to_string(),
    })?;

    ring.iter().map(|position| to_coord(kind, position)).collect()
}

fn to_coord(kind: &str, position: &[f64]) -> Result<Coord<f64>, RecordError> {
    match position {
        [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
        _ => Err(RecordError::Geometry {
            kind: kind.to_string(),
            message: format!("position {position:?} needs at least two values"),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};

    pub(crate) fn feature(id: &str, event: &str, geometry: Value) -> Value {
        json!({
            "id": format!("https://api.weather.gov/alerts/{id}"),
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "id": id,
                "areaDesc": "Harris, TX; Fort Bend, TX; Harris, TX",
                "affectedZones": [
                    "https://api.weather.gov/zones/forecast/TXZ213",
                    "https://api.weather.gov/zones/county/TXC201"
                ],
                "sent": "2024-05-01T12:00:00-05:00",
                "effective": "2024-05-01T12:00:00-05:00",
                "onset": "2024-05-01T13:00:00-05:00",
                "expires": "2024-05-01T18:00:00-05:00",
                "ends": null,
                "status": "Actual",
                "messageType": "Alert",
                "category": "Met",
                "severity": "Severe",
                "certainty": "Likely",
                "urgency": "Expected",
                "event": event,
                "senderName": "NWS Houston/Galveston TX",
                "headline": "Flood Warning issued May 1",
                "description": "Rising water.",
                "instruction": null
            }
        })
    }

    #[test]
    fn null_geometry_is_absent() {
        let record = parse_feature(&feature("a1", "Flood Warning", Value::Null)).expect("parse");
        assert!(record.geometry.is_none());
    }

    #[test]
    fn polygon_keeps_points_in_order() {
        let ring = json!([[-95.0, 29.0], [-94.0, 29.0], [-94.0, 30.0], [-95.0, 30.0], [-95.0, 29.0]]);
        let geometry = json!({ "type": "Polygon", "coordinates": [ring] });
        let record = parse_feature(&feature("a1", "Flood Warning", geometry)).expect("parse");

        let Some(AlertGeometry::Polygon { points, polygon }) = &record.geometry else {
            panic!("expected polygon geometry, got {:?}", record.geometry);
        };
        assert_eq!(points.len(), 5);
        assert_eq!(points[1], Coord { x: -94.0, y: 29.0 });
        assert_eq!(polygon.exterior().0, *points);
    }

    #[test]
    fn multipolygon_builds_one_polygon_per_member() {
        let a = json!([[[-95.0, 29.0], [-94.0, 29.0], [-94.0, 30.0], [-95.0, 29.0]]]);
        let b = json!([[[-90.0, 35.0], [-89.0, 35.0], [-89.0, 36.0], [-90.0, 35.0]]]);
        let geometry = json!({ "type": "MultiPolygon", "coordinates": [a, b] });
        let record = parse_feature(&feature("a1", "Flood Warning", geometry)).expect("parse");

        let geometry = record.geometry.expect("geometry");
        assert_eq!(geometry.polygons().len(), 2);
        assert_eq!(geometry.coords().len(), 8);
        // lat must not be replaced by lon
        assert_eq!(geometry.coords()[4], Coord { x: -90.0, y: 35.0 });
    }

    #[test]
    fn point_geometry_has_no_polygon() {
        let geometry = json!({ "type": "Point", "coordinates": [-95.5, 29.5] });
        let record = parse_feature(&feature("a1", "Flood Warning", geometry)).expect("parse");

        let geometry = record.geometry.expect("geometry");
        assert!(geometry.polygons().is_empty());
        assert_eq!(geometry.coords(), vec![Coord { x: -95.5, y: 29.5 }]);
    }

    #[test]
    fn unknown_geometry_type_is_absent() {
        let geometry = json!({ "type": "GeometryCollection", "geometries": [] });
        let record = parse_feature(&feature("a1", "Flood Warning", geometry)).expect("parse");
        assert!(record.geometry.is_none());
    }

    #[test]
    fn malformed_coordinates_fail() {
        let geometry = json!({ "type": "Polygon", "coordinates": [[[-95.0]]] });
        let err = parse_feature(&feature("a1", "Flood Warning", geometry)).unwrap_err();
        assert!(matches!(err, RecordError::Geometry { .. }));
    }

    #[test]
    fn times_keep_local_and_utc() {
        let record = parse_feature(&feature("a1", "Flood Warning", Value::Null)).expect("parse");

        let sent = record.sent.expect("sent");
        assert_eq!(sent.local.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(sent.utc.to_rfc3339(), "2024-05-01T17:00:00+00:00");
        assert!(record.ends.is_none());
    }

    #[test]
    fn malformed_time_is_reported() {
        let mut raw = feature("a1", "Flood Warning", Value::Null);
        raw["properties"]["expires"] = json!("tomorrow-ish");

        let err = parse_feature(&raw).unwrap_err();
        assert!(matches!(err, RecordError::Time { field: "expires", .. }));
    }

    #[test]
    fn zones_and_area_descriptions_are_split() {
        let record = parse_feature(&feature("a1", "Flood Warning", Value::Null)).expect("parse");

        assert_eq!(record.affected_zones, vec!["TXZ213", "TXC201"]);
        assert_eq!(record.area_descriptions, vec!["Harris, TX", "Fort Bend, TX", "Harris, TX"]);
    }

    #[test]
    fn area_description_segments_are_all_kept() {
        let mut raw = feature("a1", "Flood Warning", Value::Null);
        raw["properties"]["areaDesc"] = json!("Pampa, TX;; Pampa, TX");
        let record = parse_feature(&raw).expect("parse");

        assert_eq!(record.area_descriptions, vec!["Pampa, TX", "", "Pampa, TX"]);
    }

    #[test]
    fn event_is_title_cased() {
        let record = parse_feature(&feature(
            "a1",
            "Arroyo and Small Stream Flood Advisory",
            Value::Null,
        ))
        .expect("parse");
        assert_eq!(record.event, "Arroyo And Small Stream Flood Advisory");
    }

    #[test]
    fn unknown_event_is_an_upstream_error() {
        let err = parse_feature(&feature("a1", "Meteor Shower Warning", Value::Null)).unwrap_err();
        assert!(matches!(err, RecordError::UnknownEvent(ref e) if e == "Meteor Shower Warning"));
    }

    #[test]
    fn compare_by_uses_utc() {
        let mut early = feature("a1", "Flood Warning", Value::Null);
        early["properties"]["sent"] = json!("2024-05-01T12:00:00-05:00");
        let mut late = feature("a2", "Flood Warning", Value::Null);
        // Earlier wall clock, later instant.
        late["properties"]["sent"] = json!("2024-05-01T11:30:00-07:00");

        let early = parse_feature(&early).expect("parse");
        let late = parse_feature(&late).expect("parse");

        assert!(occurred_before(&early, &late, TimeField::Sent));
        assert!(occurred_after(&late, &early, TimeField::Sent));
        assert_eq!(compare_by(&early, &late, TimeField::Ends), None);
        assert!(!occurred_before(&early, &late, TimeField::Ends));
    }
}
