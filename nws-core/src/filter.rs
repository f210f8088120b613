//! In-memory filtering of already-fetched alerts.
//!
//! Each supplied parameter selects the records it matches; matching is
//! inclusive at every boundary. Under [`MatchMode::Any`] (the default, and
//! what [`apply_filter`] uses) a record is kept when any parameter selects
//! it. [`MatchMode::All`] keeps only records every parameter selects.

use std::collections::HashSet;

use crate::{
    collection::AlertCollection,
    criteria::{Bound, FilterCriteria, Param, ParamKind, Side, Value},
    error::CriteriaError,
    record::AlertRecord,
    table::{self, is_marine_zone},
    validation::{ValidatedCriteria, validate},
};

/// How per-parameter selections are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Union: a record matching any supplied parameter is kept.
    #[default]
    Any,
    /// Intersection: a record must match every supplied parameter.
    All,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    mode: MatchMode,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Validates `criteria`, then filters `records` into a new collection.
    pub fn apply(
        &self,
        records: &AlertCollection,
        criteria: &FilterCriteria,
    ) -> Result<AlertCollection, CriteriaError> {
        let validated = validate(criteria)?;
        Ok(self.apply_validated(records, &validated))
    }

    pub fn apply_validated(
        &self,
        records: &AlertCollection,
        criteria: &ValidatedCriteria,
    ) -> AlertCollection {
        // Per-parameter selections, as indexes into `records`.
        let selections: Vec<HashSet<usize>> = criteria
            .iter()
            .map(|(param, values)| {
                records
                    .iter()
                    .enumerate()
                    .filter(|(_, record)| matches_param(record, param, values))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();

        let keep = |idx: &usize| match self.mode {
            MatchMode::Any => selections.iter().any(|s| s.contains(idx)),
            MatchMode::All => selections.iter().all(|s| s.contains(idx)),
        };

        let kept: Vec<_> = (0..records.len())
            .filter(keep)
            .filter_map(|idx| records.get_shared(idx))
            .collect();

        log::debug!(
            "Filter ({:?}) kept {} of {} alert(s)",
            self.mode,
            kept.len(),
            records.len()
        );

        AlertCollection::from_shared(kept)
    }
}

/// Filters `records` with union semantics across parameters.
pub fn apply_filter(
    records: &AlertCollection,
    criteria: &FilterCriteria,
) -> Result<AlertCollection, CriteriaError> {
    FilterEngine::new().apply(records, criteria)
}

/// Whether `record` matches any of `values` for `param`.
fn matches_param(record: &AlertRecord, param: Param, values: &[Value]) -> bool {
    values.iter().any(|value| matches_value(record, param, value))
}

fn matches_value(record: &AlertRecord, param: Param, value: &Value) -> bool {
    match (param.kind(), value) {
        (ParamKind::Time(field, side), Value::Instant(_)) => {
            let (Some(at), Some(bound)) = (record.utc(field), value.as_instant()) else {
                return false;
            };
            match side {
                Side::After => at >= bound,
                Side::Before => at <= bound,
            }
        }
        (ParamKind::Bound(bound), Value::Number(limit)) => {
            let Some(rect) = record.geometry.as_ref().and_then(|g| g.bounding_rect()) else {
                return false;
            };
            match bound {
                Bound::North => rect.max().y <= *limit,
                Bound::South => rect.min().y >= *limit,
                Bound::East => rect.max().x <= *limit,
                Bound::West => rect.min().x >= *limit,
            }
        }
        (ParamKind::Coordinate, Value::Coordinate { lat, lon }) => record
            .geometry
            .as_ref()
            .is_some_and(|g| g.intersects_point(*lat, *lon)),
        (_, Value::Text(text)) => matches_text(record, param, text),
        _ => false,
    }
}

fn matches_text(record: &AlertRecord, param: Param, text: &str) -> bool {
    let eq = |attr: &str| attr.eq_ignore_ascii_case(text);
    let zone_prefix = |zone: &String, prefix: &str| {
        zone.get(..prefix.len()).is_some_and(|p| p.eq_ignore_ascii_case(prefix))
    };

    match param {
        Param::AlertId => record.id == text,
        Param::Event => eq(&record.event),
        Param::Certainty => eq(&record.certainty),
        Param::Severity => eq(&record.severity),
        Param::Status => eq(&record.status),
        Param::Urgency => eq(&record.urgency),
        Param::MessageType => eq(&record.message_type),
        Param::Zone => record.affected_zones.iter().any(|z| eq(z.as_str())),
        Param::Area => record.affected_zones.iter().any(|z| zone_prefix(z, text)),
        Param::Region => {
            let prefixes = table::marine_region_prefixes(text);
            record
                .affected_zones
                .iter()
                .any(|z| prefixes.iter().any(|p| zone_prefix(z, *p)))
        }
        Param::RegionType => {
            let want_marine = text.eq_ignore_ascii_case("marine");
            record.affected_zones.iter().any(|z| is_marine_zone(z) == want_marine)
        }
        _ => false,
    }
}
