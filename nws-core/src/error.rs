use thiserror::Error;

use crate::criteria::Param;

/// Caller misuse: the filter criteria cannot be accepted as supplied.
///
/// Every variant is raised before any filtering or query construction
/// happens; the whole operation is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("No filter criteria supplied. Supply at least one parameter.")]
    Empty,

    #[error(
        "Parameters {} cannot be combined. Supply at most one of: area, point, region, region_type, zone.",
        join_params(.fields)
    )]
    Conflict { fields: Vec<Param> },

    #[error("Invalid type for parameter `{field}`: expected {expected}, got {found}.")]
    ParameterType {
        field: Param,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid data input for parameter `{field}`: `{value}`. See the validation tables for valid inputs.")]
    DataValidation { field: Param, value: String },
}

/// Bad upstream data: a raw alert feature could not be turned into a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to decode alert JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Alert feature is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Alert field `{field}` has malformed timestamp `{value}`: {source}")]
    Time {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Malformed {kind} geometry: {message}")]
    Geometry { kind: String, message: String },

    #[error("Unknown alert event `{0}`")]
    UnknownEvent(String),

    #[error("Duplicate alert id `{0}` in response")]
    DuplicateId(String),
}

/// RFC 7807 problem details returned by the API on failed requests.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = self.title.as_deref().unwrap_or("Request failed");
        match &self.detail {
            Some(detail) => write!(f, "{title}: {detail}")?,
            None => f.write_str(title)?,
        }
        if let Some(id) = &self.correlation_id {
            write!(f, " (correlation id {id})")?;
        }
        Ok(())
    }
}

/// Anything that can go wrong while talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("API returned status {status}: {problem}")]
    Api { status: u16, problem: Problem },

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Unexpected response shape from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

fn join_params(fields: &[Param]) -> String {
    fields
        .iter()
        .map(|p| format!("`{}`", p.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_every_field() {
        let err = CriteriaError::Conflict { fields: vec![Param::Area, Param::Zone] };
        let msg = err.to_string();

        assert!(msg.contains("`area`"));
        assert!(msg.contains("`zone`"));
    }

    #[test]
    fn problem_display_includes_correlation_id() {
        let problem: Problem = serde_json::from_value(serde_json::json!({
            "type": "https://api.weather.gov/problems/NotFound",
            "title": "Not Found",
            "status": 404,
            "detail": "Alert not found",
            "correlationId": "abc123"
        }))
        .expect("problem must decode");

        assert_eq!(problem.to_string(), "Not Found: Alert not found (correlation id abc123)");
    }
}
