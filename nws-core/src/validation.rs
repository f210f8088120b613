//! Type and domain checking of filter criteria.

use crate::{
    criteria::{Bound, FilterCriteria, Param, ParamKind, Value},
    error::CriteriaError,
    table::VALIDATION_TABLE,
};

/// Criteria that passed [`validate`].
///
/// Holds a copy of the caller's values with every categorical value replaced
/// by its canonical spelling; the caller's bag is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCriteria {
    entries: Vec<(Param, Vec<Value>)>,
}

impl ValidatedCriteria {
    pub fn iter(&self) -> impl Iterator<Item = (Param, &[Value])> {
        self.entries.iter().map(|(p, v)| (*p, v.as_slice()))
    }

    pub fn get(&self, param: Param) -> Option<&[Value]> {
        self.entries.iter().find(|(p, _)| *p == param).map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Checks a criteria bag, rejecting it as a whole on the first problem.
///
/// Order of checks: empty bag, location-selector conflicts, empty value
/// lists and value types, then domain membership and coordinate ranges.
pub fn validate(criteria: &FilterCriteria) -> Result<ValidatedCriteria, CriteriaError> {
    if criteria.is_empty() {
        return Err(CriteriaError::Empty);
    }

    let selectors: Vec<Param> = criteria.params().filter(Param::is_location_selector).collect();
    if selectors.len() > 1 {
        return Err(CriteriaError::Conflict { fields: selectors });
    }

    for (param, values) in criteria.iter() {
        if values.is_empty() {
            return Err(CriteriaError::ParameterType {
                field: param,
                expected: "one or more values",
                found: "empty list",
            });
        }
        for value in values {
            check_type(param, value)?;
        }
    }

    let entries = criteria
        .iter()
        .map(|(param, values)| {
            let canonical = values
                .iter()
                .map(|value| check_domain(param, value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((param, canonical))
        })
        .collect::<Result<Vec<_>, CriteriaError>>()?;

    log::debug!("Validated {} filter parameter(s)", entries.len());

    Ok(ValidatedCriteria { entries })
}

fn check_type(param: Param, value: &Value) -> Result<(), CriteriaError> {
    let expected = match param.kind() {
        ParamKind::Text | ParamKind::Categorical(_) => "string",
        ParamKind::Bound(_) => "number",
        ParamKind::Time(..) => "timestamp",
        ParamKind::Coordinate => "coordinate",
    };

    if value.type_name() == expected {
        Ok(())
    } else {
        Err(CriteriaError::ParameterType { field: param, expected, found: value.type_name() })
    }
}

fn check_domain(param: Param, value: &Value) -> Result<Value, CriteriaError> {
    let reject = |shown: String| CriteriaError::DataValidation { field: param, value: shown };

    match (param.kind(), value) {
        (ParamKind::Categorical(domain), Value::Text(text)) => VALIDATION_TABLE
            .canonical(domain, text)
            .map(|canonical| Value::Text(canonical.to_string()))
            .ok_or_else(|| reject(text.clone())),
        (ParamKind::Text, Value::Text(text)) if text.trim().is_empty() => Err(reject(text.clone())),
        (ParamKind::Bound(bound), Value::Number(n)) => {
            let limit = match bound {
                Bound::North | Bound::South => 90.0,
                Bound::East | Bound::West => 180.0,
            };
            if n.is_finite() && n.abs() <= limit {
                Ok(value.clone())
            } else {
                Err(reject(n.to_string()))
            }
        }
        (ParamKind::Coordinate, Value::Coordinate { lat, lon }) => {
            if lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0 {
                Ok(value.clone())
            } else {
                Err(reject(format!("{lat},{lon}")))
            }
        }
        _ => Ok(value.clone()),
    }
}
