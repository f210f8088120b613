//! Filter criteria: a bag of named, optional filter values.

use chrono::{DateTime, FixedOffset, Utc};
use std::{fmt, str::FromStr};

use crate::{record::TimeField, table::Domain};

/// Every named slot a [`FilterCriteria`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    AlertId,
    Event,
    Certainty,
    Severity,
    Status,
    Urgency,
    MessageType,
    Region,
    Area,
    RegionType,
    Zone,
    Point,
    LatNorth,
    LatSouth,
    LonEast,
    LonWest,
    SentBefore,
    SentAfter,
    EffectiveBefore,
    EffectiveAfter,
    OnsetBefore,
    OnsetAfter,
    ExpiresBefore,
    ExpiresAfter,
    EndsBefore,
    EndsAfter,
}

/// The value type a parameter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text, no domain table.
    Text,
    /// Text checked against a validation table.
    Categorical(Domain),
    /// A latitude or longitude bound.
    Bound(Bound),
    /// An instant compared against one of the record's time fields.
    Time(TimeField, Side),
    /// A latitude/longitude pair.
    Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

impl Param {
    pub const fn all() -> &'static [Param] {
        &[
            Param::AlertId,
            Param::Event,
            Param::Certainty,
            Param::Severity,
            Param::Status,
            Param::Urgency,
            Param::MessageType,
            Param::Region,
            Param::Area,
            Param::RegionType,
            Param::Zone,
            Param::Point,
            Param::LatNorth,
            Param::LatSouth,
            Param::LonEast,
            Param::LonWest,
            Param::SentBefore,
            Param::SentAfter,
            Param::EffectiveBefore,
            Param::EffectiveAfter,
            Param::OnsetBefore,
            Param::OnsetAfter,
            Param::ExpiresBefore,
            Param::ExpiresAfter,
            Param::EndsBefore,
            Param::EndsAfter,
        ]
    }

    /// Location selectors; at most one of these may be supplied at once.
    pub const fn location_selectors() -> &'static [Param] {
        &[Param::Area, Param::Point, Param::Region, Param::RegionType, Param::Zone]
    }

    /// Wire name, as used in the API query string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Param::AlertId => "id",
            Param::Event => "event",
            Param::Certainty => "certainty",
            Param::Severity => "severity",
            Param::Status => "status",
            Param::Urgency => "urgency",
            Param::MessageType => "message_type",
            Param::Region => "region",
            Param::Area => "area",
            Param::RegionType => "region_type",
            Param::Zone => "zone",
            Param::Point => "point",
            Param::LatNorth => "lat_north",
            Param::LatSouth => "lat_south",
            Param::LonEast => "lon_east",
            Param::LonWest => "lon_west",
            Param::SentBefore => "sent_before",
            Param::SentAfter => "sent_after",
            Param::EffectiveBefore => "effective_before",
            Param::EffectiveAfter => "effective_after",
            Param::OnsetBefore => "onset_before",
            Param::OnsetAfter => "onset_after",
            Param::ExpiresBefore => "expires_before",
            Param::ExpiresAfter => "expires_after",
            Param::EndsBefore => "ends_before",
            Param::EndsAfter => "ends_after",
        }
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            Param::AlertId | Param::Zone => ParamKind::Text,
            Param::Event => ParamKind::Categorical(Domain::Product),
            Param::Certainty => ParamKind::Categorical(Domain::Certainty),
            Param::Severity => ParamKind::Categorical(Domain::Severity),
            Param::Status => ParamKind::Categorical(Domain::Status),
            Param::Urgency => ParamKind::Categorical(Domain::Urgency),
            Param::MessageType => ParamKind::Categorical(Domain::MessageType),
            Param::Region => ParamKind::Categorical(Domain::MarineRegion),
            Param::Area => ParamKind::Categorical(Domain::LandArea),
            Param::RegionType => ParamKind::Categorical(Domain::RegionType),
            Param::Point => ParamKind::Coordinate,
            Param::LatNorth => ParamKind::Bound(Bound::North),
            Param::LatSouth => ParamKind::Bound(Bound::South),
            Param::LonEast => ParamKind::Bound(Bound::East),
            Param::LonWest => ParamKind::Bound(Bound::West),
            Param::SentBefore => ParamKind::Time(TimeField::Sent, Side::Before),
            Param::SentAfter => ParamKind::Time(TimeField::Sent, Side::After),
            Param::EffectiveBefore => ParamKind::Time(TimeField::Effective, Side::Before),
            Param::EffectiveAfter => ParamKind::Time(TimeField::Effective, Side::After),
            Param::OnsetBefore => ParamKind::Time(TimeField::Onset, Side::Before),
            Param::OnsetAfter => ParamKind::Time(TimeField::Onset, Side::After),
            Param::ExpiresBefore => ParamKind::Time(TimeField::Expires, Side::Before),
            Param::ExpiresAfter => ParamKind::Time(TimeField::Expires, Side::After),
            Param::EndsBefore => ParamKind::Time(TimeField::Ends, Side::Before),
            Param::EndsAfter => ParamKind::Time(TimeField::Ends, Side::After),
        }
    }

    pub fn is_location_selector(&self) -> bool {
        Self::location_selectors().contains(self)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Param {
    type Err = String;

    /// Accepts the wire name (`message_type`) as well as the camelCase
    /// spelling (`messageType`, `alertId`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        let folded = folded.to_ascii_lowercase();

        if folded == "alertid" {
            return Ok(Param::AlertId);
        }

        Param::all()
            .iter()
            .copied()
            .find(|p| p.as_str().replace('_', "") == folded)
            .ok_or_else(|| format!("Unknown filter parameter '{s}'."))
    }
}

/// One supplied filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Instant(DateTime<FixedOffset>),
    Coordinate { lat: f64, lon: f64 },
}

impl Value {
    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "string",
            Value::Number(_) => "number",
            Value::Instant(_) => "timestamp",
            Value::Coordinate { .. } => "coordinate",
        }
    }

    /// Best-effort typing of a raw string: number, then RFC 3339 instant,
    /// otherwise text.
    pub fn infer(raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            return Value::Number(n);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Value::Instant(dt);
        }
        Value::Text(raw.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Instant(dt) => Some(dt.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Instant(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Instant(value.fixed_offset())
    }
}

impl From<(f64, f64)> for Value {
    /// `(lat, lon)`
    fn from((lat, lon): (f64, f64)) -> Self {
        Value::Coordinate { lat, lon }
    }
}

/// A bag of named, optional filter values for one filter or query operation.
///
/// Parameters keep the order they were first supplied in; supplying the same
/// parameter again replaces its values in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    entries: Vec<(Param, Vec<Value>)>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterCriteria::insert`].
    pub fn with(mut self, param: Param, value: impl Into<Value>) -> Self {
        self.insert(param, value);
        self
    }

    /// Builder form of [`FilterCriteria::insert_many`].
    pub fn with_many<I, V>(mut self, param: Param, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert_many(param, values);
        self
    }

    /// Supply a single value; stored as a one-element list.
    pub fn insert(&mut self, param: Param, value: impl Into<Value>) {
        self.insert_many(param, [value]);
    }

    pub fn insert_many<I, V>(&mut self, param: Param, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(p, _)| *p == param) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((param, values)),
        }
    }

    pub fn remove(&mut self, param: Param) -> Option<Vec<Value>> {
        let idx = self.entries.iter().position(|(p, _)| *p == param)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, param: Param) -> Option<&[Value]> {
        self.entries.iter().find(|(p, _)| *p == param).map(|(_, v)| v.as_slice())
    }

    pub fn contains(&self, param: Param) -> bool {
        self.get(param).is_some()
    }

    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, &[Value])> {
        self.entries.iter().map(|(p, v)| (*p, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
