//! Core library for the `nws` CLI.
//!
//! This crate defines:
//! - Alert records built from api.weather.gov GeoJSON features
//! - Filter criteria, their validation against the NWS value tables, and
//!   in-memory filtering of alert collections
//! - Query-string construction for the alerts endpoints
//! - A thin async client over the alert, glossary and point endpoints
//! - Configuration of the user agent the API requires
//!
//! It is used by `nws-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod collection;
pub mod config;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod record;
pub mod table;
pub mod validation;

pub use client::{Fetch, HttpFetcher, NwsClient};
pub use collection::{AlertCollection, parse_feature_collection};
pub use config::{ClientContext, Config, UserAgent};
pub use criteria::{FilterCriteria, Param, Value};
pub use error::{ClientError, CriteriaError, Problem, RecordError};
pub use filter::{FilterEngine, MatchMode, apply_filter};
pub use model::{AlertCount, AlertTypes, Glossary, PointInfo, ServerStatus, Station, StationList};
pub use query::{alerts_url, build_query};
pub use record::{AlertGeometry, AlertRecord, TimeField, Timestamp, parse_feature};
pub use table::{Domain, VALIDATION_TABLE, ValidationTable};
pub use validation::{ValidatedCriteria, validate};
