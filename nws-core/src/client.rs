use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::{
    collection::{AlertCollection, parse_feature_collection},
    config::ClientContext,
    criteria::{FilterCriteria, Param},
    error::{ClientError, CriteriaError},
    model::{AlertCount, AlertTypes, Glossary, PointInfo, ServerStatus, Station, StationList},
    query,
    record::AlertRecord,
    table::{Domain, VALIDATION_TABLE},
};

pub mod http;

pub use http::HttpFetcher;

/// Retrieves a JSON document for a fully built URL.
#[async_trait]
pub trait Fetch: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, ClientError>;
}

/// Typed access to the alert, glossary and point endpoints.
///
/// Each call is a single request; failures are returned, never retried.
#[derive(Debug, Clone)]
pub struct NwsClient<F> {
    fetcher: F,
    base_url: String,
}

impl NwsClient<HttpFetcher> {
    pub fn from_context(context: &ClientContext) -> Result<Self, ClientError> {
        Ok(Self::new(HttpFetcher::new(context)?, context.base_url.clone()))
    }
}

impl<F: Fetch> NwsClient<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// URL of `/alerts/active` (or `/alerts` when `all`) with `criteria` applied.
    pub fn alerts_url(&self, criteria: &FilterCriteria, all: bool) -> Result<String, CriteriaError> {
        query::alerts_url(&self.base_url, criteria, all)
    }

    pub async fn active_alerts(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<AlertCollection, ClientError> {
        let url = self.alerts_url(criteria, false)?;
        self.fetch_alerts(&url).await
    }

    /// Active and expired alerts from the last seven days.
    pub async fn alerts(&self, criteria: &FilterCriteria) -> Result<AlertCollection, ClientError> {
        let url = self.alerts_url(criteria, true)?;
        self.fetch_alerts(&url).await
    }

    pub async fn alert_by_id(&self, id: &str) -> Result<AlertRecord, ClientError> {
        let id = non_empty(Param::AlertId, id)?;
        let body = self.fetcher.fetch(&self.url(&format!("alerts/{id}"))).await?;
        Ok(crate::record::parse_feature(&body)?)
    }

    /// Active alerts for a state, territory or marine area code. Full state
    /// names are accepted.
    pub async fn alerts_by_area(&self, area: &str) -> Result<AlertCollection, ClientError> {
        let area = canonical(Domain::LandArea, Param::Area, area)?;
        self.fetch_alerts(&self.url(&format!("alerts/active/area/{area}"))).await
    }

    pub async fn alerts_by_zone(&self, zone: &str) -> Result<AlertCollection, ClientError> {
        let zone = non_empty(Param::Zone, zone)?.to_ascii_uppercase();
        self.fetch_alerts(&self.url(&format!("alerts/active/zone/{zone}"))).await
    }

    pub async fn alerts_by_marine_region(
        &self,
        region: &str,
    ) -> Result<AlertCollection, ClientError> {
        let region = canonical(Domain::MarineRegion, Param::Region, region)?;
        self.fetch_alerts(&self.url(&format!("alerts/active/region/{region}"))).await
    }

    pub async fn alert_count(&self) -> Result<AlertCount, ClientError> {
        self.fetch_as("alerts/active/count").await
    }

    pub async fn alert_types(&self) -> Result<AlertTypes, ClientError> {
        self.fetch_as("alerts/types").await
    }

    pub async fn glossary(&self) -> Result<Glossary, ClientError> {
        self.fetch_as("glossary").await
    }

    pub async fn point(&self, lat: f64, lon: f64) -> Result<PointInfo, ClientError> {
        check_point(lat, lon)?;

        let endpoint = format!("points/{lat},{lon}");
        let body = self.fetcher.fetch(&self.url(&endpoint)).await?;
        PointInfo::from_properties(&body["properties"])
            .map_err(|source| ClientError::Decode { endpoint, source })
    }

    /// Observation stations near a location, nearest first.
    pub async fn point_stations(&self, lat: f64, lon: f64) -> Result<Vec<Station>, ClientError> {
        check_point(lat, lon)?;

        let list: StationList = self.fetch_as(&format!("points/{lat},{lon}/stations")).await?;
        Ok(list.stations)
    }

    /// Health check against the API root.
    pub async fn ping(&self) -> Result<ServerStatus, ClientError> {
        self.fetch_as("").await
    }

    async fn fetch_alerts(&self, url: &str) -> Result<AlertCollection, ClientError> {
        let body = self.fetcher.fetch(url).await?;
        Ok(parse_feature_collection(&body)?)
    }

    async fn fetch_as<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        let body = self.fetcher.fetch(&self.url(endpoint)).await?;
        serde_json::from_value(body)
            .map_err(|source| ClientError::Decode { endpoint: format!("/{endpoint}"), source })
    }
}

fn canonical(domain: Domain, field: Param, value: &str) -> Result<&'static str, CriteriaError> {
    VALIDATION_TABLE
        .canonical(domain, value)
        .ok_or_else(|| CriteriaError::DataValidation { field, value: value.to_string() })
}

fn check_point(lat: f64, lon: f64) -> Result<(), CriteriaError> {
    crate::validation::validate(&FilterCriteria::new().with(Param::Point, (lat, lon)))?;
    Ok(())
}

fn non_empty(field: Param, value: &str) -> Result<&str, CriteriaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CriteriaError::DataValidation { field, value: value.to_string() })
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::feature;
    use serde_json::{Value, json};
    use std::{collections::HashMap, sync::Mutex};

    /// Serves canned bodies by URL and records every request.
    #[derive(Debug, Default)]
    struct StubFetcher {
        bodies: HashMap<String, Value>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn serve(mut self, url: &str, body: Value) -> Self {
            self.bodies.insert(url.to_string(), body);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl Fetch for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Value, ClientError> {
            self.requested.lock().expect("lock").push(url.to_string());
            self.bodies.get(url).cloned().ok_or_else(|| ClientError::Status {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            })
        }
    }

    fn collection(features: Vec<Value>) -> Value {
        json!({ "type": "FeatureCollection", "features": features })
    }

    #[tokio::test]
    async fn active_alerts_sends_constructed_query() {
        let url = "http://stub/alerts/active?event=Flood%20Warning&severity=Severe";
        let stub = StubFetcher::default()
            .serve(url, collection(vec![feature("a", "Flood Warning", Value::Null)]));
        let client = NwsClient::new(stub, "http://stub/");

        let criteria = FilterCriteria::new()
            .with(Param::Event, "flood warning")
            .with(Param::Severity, "severe");
        let alerts = client.active_alerts(&criteria).await.expect("alerts");

        assert_eq!(alerts.ids(), vec!["a"]);
        assert_eq!(client.fetcher.requested(), vec![url.to_string()]);
    }

    #[tokio::test]
    async fn invalid_criteria_never_reach_the_network() {
        let client = NwsClient::new(StubFetcher::default(), "http://stub");

        let criteria = FilterCriteria::new().with(Param::Area, "TX").with(Param::Zone, "TXZ213");
        let err = client.alerts(&criteria).await.unwrap_err();
        assert!(matches!(err, ClientError::Criteria(CriteriaError::Conflict { .. })));

        let err = client.alerts_by_marine_region("XX").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Criteria(CriteriaError::DataValidation { field: Param::Region, .. })
        ));

        assert!(client.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn area_accepts_state_names() {
        let stub = StubFetcher::default().serve("http://stub/alerts/active/area/TX", collection(vec![]));
        let client = NwsClient::new(stub, "http://stub");

        let alerts = client.alerts_by_area("Texas").await.expect("alerts");
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn alert_by_id_parses_single_feature() {
        let stub = StubFetcher::default()
            .serve("http://stub/alerts/abc", feature("abc", "Tornado Warning", Value::Null));
        let client = NwsClient::new(stub, "http://stub");

        let alert = client.alert_by_id("abc").await.expect("alert");
        assert_eq!(alert.event, "Tornado Warning");
    }

    #[tokio::test]
    async fn bad_upstream_alert_is_a_record_error() {
        let mut broken = feature("abc", "Tornado Warning", Value::Null);
        broken["properties"]["sent"] = json!("not a time");
        let stub = StubFetcher::default().serve("http://stub/alerts/active", collection(vec![broken]));
        let client = NwsClient::new(stub, "http://stub");

        let err = client.active_alerts(&FilterCriteria::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Record(_)));
    }

    #[tokio::test]
    async fn count_and_types_decode() {
        let stub = StubFetcher::default()
            .serve(
                "http://stub/alerts/active/count",
                json!({ "total": 3, "land": 2, "marine": 1, "regions": {}, "areas": { "TX": 2 }, "zones": {} }),
            )
            .serve("http://stub/alerts/types", json!({ "eventTypes": ["Flood Warning"] }));
        let client = NwsClient::new(stub, "http://stub");

        let count = client.alert_count().await.expect("count");
        assert_eq!(count.total, 3);

        let types = client.alert_types().await.expect("types");
        assert_eq!(types.event_types, vec!["Flood Warning".to_string()]);
    }

    #[tokio::test]
    async fn unexpected_shape_names_the_endpoint() {
        let stub = StubFetcher::default().serve("http://stub/", json!({ "nope": true }));
        let client = NwsClient::new(stub, "http://stub");

        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { ref endpoint, .. } if endpoint == "/"));
    }

    #[tokio::test]
    async fn point_rejects_out_of_range_coordinates() {
        let client = NwsClient::new(StubFetcher::default(), "http://stub");

        let err = client.point(120.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ClientError::Criteria(CriteriaError::DataValidation { .. })));

        let err = client.point_stations(0.0, -200.0).await.unwrap_err();
        assert!(matches!(err, ClientError::Criteria(CriteriaError::DataValidation { .. })));

        assert!(client.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn point_stations_requests_stations_path() {
        let stub = StubFetcher::default().serve(
            "http://stub/points/29.76,-95.37/stations",
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-95.36, 29.64] },
                    "properties": {
                        "stationIdentifier": "KHOU",
                        "name": "Houston, William P. Hobby Airport",
                        "timeZone": "America/Chicago"
                    }
                }]
            }),
        );
        let client = NwsClient::new(stub, "http://stub");

        let stations = client.point_stations(29.76, -95.37).await.expect("stations");
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].identifier, "KHOU");
        assert_eq!(stations[0].time_zone.as_deref(), Some("America/Chicago"));
    }
}
