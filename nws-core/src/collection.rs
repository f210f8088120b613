use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use crate::{
    criteria::{FilterCriteria, Param},
    error::{CriteriaError, RecordError},
    filter::apply_filter,
    record::{AlertRecord, TimeField, compare_by, parse_feature},
    table::{Domain, VALIDATION_TABLE},
};

/// An ordered set of alerts.
///
/// Records are shared, never copied: filtering or sorting produces a new
/// collection pointing at the same records, and leaves this one unchanged.
#[derive(Debug, Clone, Default)]
pub struct AlertCollection {
    records: Vec<Arc<AlertRecord>>,
}

impl AlertCollection {
    pub fn from_records(records: impl IntoIterator<Item = AlertRecord>) -> Self {
        Self { records: records.into_iter().map(Arc::new).collect() }
    }

    pub fn from_shared(records: Vec<Arc<AlertRecord>>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.records.iter().map(Arc::as_ref)
    }

    pub fn get(&self, index: usize) -> Option<&AlertRecord> {
        self.records.get(index).map(Arc::as_ref)
    }

    pub fn get_shared(&self, index: usize) -> Option<Arc<AlertRecord>> {
        self.records.get(index).cloned()
    }

    pub fn find(&self, id: &str) -> Option<&AlertRecord> {
        self.iter().find(|r| r.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|r| r.id.as_str()).collect()
    }

    /// See [`crate::filter::apply_filter`].
    pub fn filter(&self, criteria: &FilterCriteria) -> Result<AlertCollection, CriteriaError> {
        apply_filter(self, criteria)
    }

    /// Number of alerts per requested event, in the order requested.
    ///
    /// Event names are case-insensitive and must be valid products; events
    /// with no active alert count as zero.
    pub fn count(&self, events: &[&str]) -> Result<Vec<usize>, CriteriaError> {
        let counts = self.event_counts();

        events
            .iter()
            .map(|event| {
                let canonical = VALIDATION_TABLE.canonical(Domain::Product, event).ok_or_else(|| {
                    CriteriaError::DataValidation { field: Param::Event, value: event.to_string() }
                })?;
                Ok(counts.get(canonical).copied().unwrap_or(0))
            })
            .collect()
    }

    pub fn event_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.iter() {
            *counts.entry(record.event.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// A copy ordered by `field` (UTC). Alerts without the field go last,
    /// keeping their relative order.
    pub fn sorted_by(&self, field: TimeField) -> AlertCollection {
        let mut records = self.records.clone();
        records.sort_by(|a, b| match (a.time(field), b.time(field)) {
            (Some(_), Some(_)) => compare_by(a, b, field).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        AlertCollection { records }
    }
}

impl<'a> IntoIterator for &'a AlertCollection {
    type Item = &'a AlertRecord;
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, Arc<AlertRecord>>,
        fn(&'a Arc<AlertRecord>) -> &'a AlertRecord,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().map(shared_record as fn(&'a Arc<AlertRecord>) -> &'a AlertRecord)
    }
}

fn shared_record(record: &Arc<AlertRecord>) -> &AlertRecord {
    record
}

/// Parses an alerts response body.
///
/// Accepts a GeoJSON `FeatureCollection` (list endpoints) or a single
/// `Feature` (`/alerts/{id}`). Alert ids must be unique.
pub fn parse_feature_collection(body: &serde_json::Value) -> Result<AlertCollection, RecordError> {
    let features: Vec<&serde_json::Value> = match body.get("features") {
        Some(serde_json::Value::Array(features)) => features.iter().collect(),
        Some(_) => return Err(RecordError::MissingField("features")),
        None if body.get("properties").is_some() => vec![body],
        None => return Err(RecordError::MissingField("features")),
    };

    let mut seen = HashSet::with_capacity(features.len());
    let mut records = Vec::with_capacity(features.len());
    for feature in features {
        let record = parse_feature(feature)?;
        if !seen.insert(record.id.clone()) {
            return Err(RecordError::DuplicateId(record.id));
        }
        records.push(record);
    }

    log::debug!("Parsed {} alert(s)", records.len());

    Ok(AlertCollection::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::feature;
    use serde_json::{Value, json};

    fn body(features: Vec<Value>) -> Value {
        json!({ "type": "FeatureCollection", "features": features })
    }

    #[test]
    fn parses_feature_collection_in_order() {
        let collection = parse_feature_collection(&body(vec![
            feature("a", "Flood Warning", Value::Null),
            feature("b", "Tornado Warning", Value::Null),
        ]))
        .expect("parse");

        assert_eq!(collection.ids(), vec!["a", "b"]);
        assert_eq!(collection.find("b").map(|r| r.event.as_str()), Some("Tornado Warning"));
    }

    #[test]
    fn parses_single_feature() {
        let collection =
            parse_feature_collection(&feature("a", "Flood Warning", Value::Null)).expect("parse");
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = parse_feature_collection(&body(vec![
            feature("a", "Flood Warning", Value::Null),
            feature("a", "Flood Warning", Value::Null),
        ]))
        .unwrap_err();

        assert!(matches!(err, RecordError::DuplicateId(ref id) if id == "a"));
    }

    #[test]
    fn missing_features_is_an_upstream_error() {
        let err = parse_feature_collection(&json!({ "title": "nope" })).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("features")));
    }

    #[test]
    fn count_by_event() {
        let collection = parse_feature_collection(&body(vec![
            feature("a", "Flood Warning", Value::Null),
            feature("b", "Flood Warning", Value::Null),
            feature("c", "Tornado Warning", Value::Null),
        ]))
        .expect("parse");

        let counts = collection.count(&["flood warning", "Tornado Warning", "Freeze Warning"]);
        assert_eq!(counts, Ok(vec![2, 1, 0]));

        let err = collection.count(&["Sharknado Warning"]).unwrap_err();
        assert!(matches!(err, CriteriaError::DataValidation { field: Param::Event, .. }));
    }

    #[test]
    fn sorted_by_puts_missing_times_last() {
        let mut early = feature("early", "Flood Warning", Value::Null);
        early["properties"]["ends"] = json!("2024-05-01T10:00:00-05:00");
        let mut late = feature("late", "Flood Warning", Value::Null);
        late["properties"]["ends"] = json!("2024-05-02T10:00:00-05:00");
        let open = feature("open", "Flood Warning", Value::Null);

        let collection = parse_feature_collection(&body(vec![open, late, early])).expect("parse");
        let sorted = collection.sorted_by(TimeField::Ends);

        assert_eq!(sorted.ids(), vec!["early", "late", "open"]);
        assert_eq!(collection.ids(), vec!["open", "late", "early"]);
    }
}
