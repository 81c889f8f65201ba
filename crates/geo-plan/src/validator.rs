//! Raw plan validation
//!
//! Turns untyped JSON into an [`AnalysisPlan`]. Every field is checked even
//! after earlier failures so the caller sees the full list of problems.

use crate::bbox::BoundingBox;
use crate::error::ValidationErrors;
use crate::model::{
    AnalysisParameters, AnalysisPlan, AnalysisType, DataProduct, Location, OutputKind, TimeRange,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::str::FromStr;

static DATE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date regex"));

/// Structural validator for raw plans
///
/// Stateless; unknown top-level keys are ignored so planners may attach
/// their own metadata, but unknown `parameters` keys are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanValidator;

impl PlanValidator {
    /// Validate a raw plan
    ///
    /// # Errors
    /// Returns [`ValidationErrors`] naming every offending field.
    pub fn validate(raw: &Value) -> Result<AnalysisPlan, ValidationErrors> {
        let Some(object) = raw.as_object() else {
            return Err(ValidationErrors::single("$", "plan must be a JSON object"));
        };

        let mut errors = ValidationErrors::new();

        let analysis_type = vocabulary_field::<AnalysisType>(object, "analysisType", &mut errors);
        let data_product = vocabulary_field::<DataProduct>(object, "dataProduct", &mut errors);
        let dataset_ids = dataset_ids(object, &mut errors);
        let time_range = time_range(object, &mut errors);
        let location = location(object, &mut errors);
        let outputs = outputs(object, &mut errors);
        let parameters = parameters(object, &mut errors);

        match (
            analysis_type,
            data_product,
            dataset_ids,
            time_range,
            location,
            outputs,
            parameters,
        ) {
            (
                Some(analysis_type),
                Some(data_product),
                Some(dataset_ids),
                Some(time_range),
                Some(location),
                Some(outputs),
                Some(parameters),
            ) if errors.is_empty() => Ok(AnalysisPlan::from_parts(
                analysis_type,
                data_product,
                dataset_ids,
                time_range,
                location,
                outputs,
                parameters,
            )),
            _ => Err(errors),
        }
    }

    /// Parse a strict `YYYY-MM-DD` calendar date
    #[must_use]
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        if !DATE_FORMAT.is_match(text) {
            return None;
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    }
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, "is required");
            None
        }
        Some(value) => Some(value),
    }
}

fn string_value<'a>(
    value: &'a Value,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match value.as_str() {
        Some(text) => Some(text),
        None => {
            errors.push(field, "must be a string");
            None
        }
    }
}

fn vocabulary_field<T>(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<T>
where
    T: FromStr<Err = crate::model::UnknownVariant>,
{
    let value = required(object, field, errors)?;
    let text = string_value(value, field, errors)?;
    match text.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(field, e.to_string());
            None
        }
    }
}

fn non_empty_array<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a Vec<Value>> {
    let value = required(object, field, errors)?;
    let Some(items) = value.as_array() else {
        errors.push(field, "must be an array");
        return None;
    };
    if items.is_empty() {
        errors.push(field, "must not be empty");
        return None;
    }
    Some(items)
}

fn dataset_ids(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Vec<String>> {
    let items = non_empty_array(object, "datasetIds", errors)?;
    let before = errors.len();
    let mut ids: Vec<String> = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let field = format!("datasetIds[{i}]");
        let Some(text) = string_value(item, &field, errors) else {
            continue;
        };
        let id = text.trim();
        if id.is_empty() {
            errors.push(field, "must not be blank");
        } else if ids.iter().any(|existing| existing == id) {
            errors.push(field, format!("duplicate dataset id '{id}'"));
        } else {
            ids.push(id.to_string());
        }
    }

    (errors.len() == before).then_some(ids)
}

fn date_field(
    range: &Map<String, Value>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let field = format!("timeRange.{key}");
    let Some(value) = range.get(key).filter(|v| !v.is_null()) else {
        errors.push(field, "is required");
        return None;
    };
    let text = string_value(value, &field, errors)?;
    match PlanValidator::parse_date(text) {
        Some(date) => Some(date),
        None => {
            errors.push(field, format!("'{text}' is not a valid YYYY-MM-DD date"));
            None
        }
    }
}

fn time_range(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<TimeRange> {
    let value = required(object, "timeRange", errors)?;
    let Some(range) = value.as_object() else {
        errors.push("timeRange", "must be an object with start and end");
        return None;
    };

    let start = date_field(range, "start", errors);
    let end = date_field(range, "end", errors);

    match TimeRange::new(start?, end?) {
        Ok(range) => Some(range),
        Err(e) => {
            errors.push("timeRange", e.to_string());
            None
        }
    }
}

fn location(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<Location> {
    let value = required(object, "location", errors)?;
    match value {
        Value::String(name) => {
            let name = name.trim();
            if name.is_empty() {
                errors.push("location", "place name must not be blank");
                return None;
            }
            Some(Location::Named(name.to_string()))
        }
        Value::Array(items) => {
            if items.len() != 4 {
                errors.push(
                    "location",
                    format!(
                        "bounding box must have 4 numbers [west, south, east, north], got {}",
                        items.len()
                    ),
                );
                return None;
            }

            let before = errors.len();
            let mut coords = [0.0_f64; 4];
            for (i, item) in items.iter().enumerate() {
                match item.as_f64() {
                    Some(n) => coords[i] = n,
                    None => errors.push(format!("location[{i}]"), "must be a number"),
                }
            }
            if errors.len() != before {
                return None;
            }

            let [west, south, east, north] = coords;
            match BoundingBox::new(west, south, east, north) {
                Ok(bbox) => Some(Location::BBox(bbox)),
                Err(e) => {
                    errors.push("location", e.to_string());
                    None
                }
            }
        }
        _ => {
            errors.push(
                "location",
                "must be a place name or a [west, south, east, north] array",
            );
            None
        }
    }
}

fn outputs(
    object: &Map<String, Value>,
    errors: &mut ValidationErrors,
) -> Option<BTreeSet<OutputKind>> {
    let items = non_empty_array(object, "outputs", errors)?;
    let before = errors.len();
    let mut outputs = BTreeSet::new();

    for (i, item) in items.iter().enumerate() {
        let field = format!("outputs[{i}]");
        let Some(text) = string_value(item, &field, errors) else {
            continue;
        };
        match text.parse::<OutputKind>() {
            Ok(kind) => {
                outputs.insert(kind);
            }
            Err(e) => errors.push(field, e.to_string()),
        }
    }

    (errors.len() == before).then_some(outputs)
}

fn parameters(
    object: &Map<String, Value>,
    errors: &mut ValidationErrors,
) -> Option<AnalysisParameters> {
    let params = match object.get("parameters") {
        None | Some(Value::Null) => return Some(AnalysisParameters::default()),
        Some(Value::Object(params)) => params,
        Some(_) => {
            errors.push("parameters", "must be an object");
            return None;
        }
    };

    let before = errors.len();
    let mut parsed = AnalysisParameters::default();

    for key in params.keys() {
        if !AnalysisParameters::KEYS.contains(&key.as_str()) {
            errors.push(
                format!("parameters.{key}"),
                format!(
                    "unknown parameter; expected one of: {}",
                    AnalysisParameters::KEYS.join(", ")
                ),
            );
        }
    }

    if let Some(value) = params.get("index").filter(|v| !v.is_null()) {
        if let Some(text) = string_value(value, "parameters.index", errors) {
            match text.parse() {
                Ok(index) => parsed.index = Some(index),
                Err(e) => errors.push("parameters.index", e.to_string()),
            }
        }
    }

    if let Some(value) = params.get("band").filter(|v| !v.is_null()) {
        if let Some(text) = string_value(value, "parameters.band", errors) {
            if text.trim().is_empty() {
                errors.push("parameters.band", "must not be blank");
            } else {
                parsed.band = Some(text.trim().to_string());
            }
        }
    }

    if let Some(value) = params.get("reducer").filter(|v| !v.is_null()) {
        if let Some(text) = string_value(value, "parameters.reducer", errors) {
            match text.parse() {
                Ok(reducer) => parsed.reducer = Some(reducer),
                Err(e) => errors.push("parameters.reducer", e.to_string()),
            }
        }
    }

    if let Some(value) = params.get("scale").filter(|v| !v.is_null()) {
        match value.as_f64() {
            Some(scale) if scale.is_finite() && scale > 0.0 => parsed.scale = Some(scale),
            Some(_) => errors.push("parameters.scale", "must be a positive number of meters"),
            None => errors.push("parameters.scale", "must be a number"),
        }
    }

    if let Some(value) = params.get("maxCloudPercent").filter(|v| !v.is_null()) {
        match value.as_f64() {
            Some(pct) if (0.0..=100.0).contains(&pct) => parsed.max_cloud_percent = Some(pct),
            Some(_) => errors.push("parameters.maxCloudPercent", "must be between 0 and 100"),
            None => errors.push("parameters.maxCloudPercent", "must be a number"),
        }
    }

    (errors.len() == before).then_some(parsed)
}
