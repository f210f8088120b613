//! Query-string construction for the alerts endpoints.

use chrono::{SecondsFormat, Utc};

use crate::{
    criteria::{FilterCriteria, Value},
    error::CriteriaError,
    validation::{ValidatedCriteria, validate},
};

/// Appends the query string for `criteria` to `base`.
///
/// An empty bag yields `base` unchanged. Otherwise the criteria are
/// validated first, so the same type, domain and location-selector rules
/// apply as for in-memory filtering. Parameters appear in the order they
/// were supplied; list values are comma-joined in the order given.
pub fn build_query(base: &str, criteria: &FilterCriteria) -> Result<String, CriteriaError> {
    if criteria.is_empty() {
        return Ok(base.to_string());
    }

    let validated = validate(criteria)?;
    let url = format!("{base}?{}", render(&validated));
    log::debug!("Constructed query URL {url}");
    Ok(url)
}

/// URL of `/alerts/active` (or `/alerts` when `all`) under `base_url`, with
/// `criteria` applied.
pub fn alerts_url(
    base_url: &str,
    criteria: &FilterCriteria,
    all: bool,
) -> Result<String, CriteriaError> {
    let path = if all { "alerts" } else { "alerts/active" };
    build_query(&format!("{}/{path}", base_url.trim_end_matches('/')), criteria)
}

fn render(criteria: &ValidatedCriteria) -> String {
    criteria
        .iter()
        .map(|(param, values)| {
            let joined = values.iter().map(render_value).collect::<Vec<_>>().join(",");
            format!("{param}={joined}")
        })
        .collect::<Vec<_>>()
        .join("&")
        // Only whitespace needs escaping for these values.
        .replace(' ', "%20")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Number(n) => n.to_string(),
        Value::Instant(dt) => dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true),
        Value::Coordinate { lat, lon } => format!("{lat},{lon}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Param;
    use chrono::DateTime;

    #[test]
    fn multi_value_event_is_comma_joined_and_space_encoded() {
        let criteria = FilterCriteria::new()
            .with_many(Param::Event, ["Severe Thunderstorm Warning", "Tornado Warning"]);

        let url = build_query("https://host/alerts", &criteria).expect("valid");
        assert_eq!(
            url,
            "https://host/alerts?event=Severe%20Thunderstorm%20Warning,Tornado%20Warning"
        );
    }

    #[test]
    fn empty_bag_yields_bare_base() {
        let url = build_query("https://host/alerts", &FilterCriteria::new()).expect("empty is fine");
        assert_eq!(url, "https://host/alerts");
    }

    #[test]
    fn fields_keep_caller_order() {
        let criteria = FilterCriteria::new()
            .with(Param::Urgency, "immediate")
            .with_many(Param::Severity, ["Severe", "Extreme"])
            .with(Param::MessageType, "Alert");

        let url = build_query("https://host/alerts/active", &criteria).expect("valid");
        assert_eq!(
            url,
            "https://host/alerts/active?urgency=Immediate&severity=Severe,Extreme&message_type=alert"
        );
    }

    #[test]
    fn non_text_values_render_canonically() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00-05:00").expect("time");
        let criteria = FilterCriteria::new()
            .with(Param::Point, (29.76, -95.37))
            .with(Param::SentAfter, at)
            .with(Param::LatNorth, 40.5);

        let url = build_query("https://host/alerts", &criteria).expect("valid");
        assert_eq!(
            url,
            "https://host/alerts?point=29.76,-95.37&sent_after=2024-05-01T17:00:00Z&lat_north=40.5"
        );
    }

    #[test]
    fn alerts_url_picks_active_or_all_path() {
        let criteria = FilterCriteria::new().with(Param::Area, "texas");

        assert_eq!(
            alerts_url("https://host/", &criteria, false).expect("valid"),
            "https://host/alerts/active?area=TX"
        );
        assert_eq!(
            alerts_url("https://host", &FilterCriteria::new(), true).expect("valid"),
            "https://host/alerts"
        );
    }

    #[test]
    fn conflicting_selectors_are_rejected() {
        let criteria = FilterCriteria::new().with(Param::Area, "TX").with(Param::Zone, "TXZ213");

        let err = build_query("https://host/alerts", &criteria).unwrap_err();
        assert!(matches!(err, CriteriaError::Conflict { .. }));
    }

    #[test]
    fn empty_value_list_never_renders_a_bare_parameter() {
        let criteria = FilterCriteria::new().with_many(Param::Severity, Vec::<&str>::new());

        let err = build_query("https://host/alerts", &criteria).unwrap_err();
        assert!(matches!(err, CriteriaError::ParameterType { field: Param::Severity, .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let criteria = FilterCriteria::new().with(Param::Severity, "Apocalyptic");

        let err = build_query("https://host/alerts", &criteria).unwrap_err();
        assert!(matches!(err, CriteriaError::DataValidation { field: Param::Severity, .. }));
    }
}
