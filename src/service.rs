use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    catalog::{FIELD_CATALOG, FeatureMapping, PLACEHOLDER_VALUE},
    error::{Result, ServiceError},
    predictor::Predictor,
};

/// A request payload: field name to raw submitted value.
pub type Payload = Map<String, Value>;

/// One echoed input, carrying the value exactly as it was submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedInput {
    pub name: &'static str,
    pub value: Value,
}

/// The outcome of a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: f64,
    pub inputs: Vec<SubmittedInput>,
}

/// Validates payloads, feeds them to the model and shapes the answer.
///
/// Holds no per request state, a single instance serves every request.
#[derive(Clone)]
pub struct PredictionService {
    predictor: Arc<dyn Predictor>,
    mapping: FeatureMapping,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}

impl PredictionService {
    /// Creates a new `PredictionService`.
    ///
    /// # Arguments
    /// * `predictor` - The loaded model.
    /// * `mapping` - The catalog to feature mapping, built once at startup.
    ///
    /// # Returns
    /// A new `PredictionService` instance.
    pub fn new(predictor: Arc<dyn Predictor>, mapping: FeatureMapping) -> Self {
        Self { predictor, mapping }
    }

    /// Runs a single prediction.
    ///
    /// # Arguments
    /// * `payload` - The submitted fields, extra keys are ignored.
    ///
    /// # Returns
    /// The prediction with the echoed inputs, or the reason the request was rejected.
    pub fn handle(&self, payload: &Payload) -> Result<Prediction> {
        let missing = missing_fields(payload);
        if !missing.is_empty() {
            warn!("rejecting payload, {} missing field(s)", missing.len());
            return Err(ServiceError::MissingFields(missing));
        }

        let features = build_features(payload, &self.mapping)
            .and_then(|features| {
                check_unmapped_fields(payload, &self.mapping)?;
                Ok(features)
            })
            .inspect_err(|e| warn!("{e}"))?;
        debug!("feature vector: {features:?}");

        let prediction = self.predictor.predict(&features)?;
        info!("predicted {prediction}");

        Ok(Prediction {
            prediction,
            inputs: echo_inputs(payload),
        })
    }
}

/// Every catalog field absent from `payload`, in catalog order.
pub fn missing_fields(payload: &Payload) -> Vec<&'static str> {
    FIELD_CATALOG
        .iter()
        .copied()
        .filter(|field| !payload.contains_key(*field))
        .collect()
}

/// Builds the model's input vector: the placeholder followed by every mapped field, converted
/// to a number. Stops at the first field that isn't numeric.
///
/// # Errors
/// `ServiceError::InvalidValue` naming the offending field. An absent field counts as invalid.
pub fn build_features(payload: &Payload, mapping: &FeatureMapping) -> Result<Vec<f64>> {
    let mut features = Vec::with_capacity(mapping.vector_len());
    features.push(PLACEHOLDER_VALUE);

    for (name, _) in mapping.features() {
        let value = payload
            .get(name)
            .and_then(to_number)
            .ok_or(ServiceError::InvalidValue(name))?;
        features.push(value);
    }

    Ok(features)
}

/// Checks that the catalog fields the model doesn't consume are numeric too, in catalog order.
///
/// # Errors
/// `ServiceError::InvalidValue` naming the first offending field.
pub fn check_unmapped_fields(payload: &Payload, mapping: &FeatureMapping) -> Result<()> {
    let mapped: Vec<usize> = mapping.features().map(|(_, i)| i).collect();

    FIELD_CATALOG
        .iter()
        .enumerate()
        .filter(|(i, _)| !mapped.contains(i))
        .try_for_each(|(_, &name)| match payload.get(name).and_then(to_number) {
            Some(_) => Ok(()),
            None => Err(ServiceError::InvalidValue(name)),
        })
}

/// The largest magnitude a feature may have. The model evaluates in single precision.
pub const MAX_MAGNITUDE: f64 = f32::MAX as f64;

/// Reads a raw value as a finite number.
///
/// Numbers are taken as is, strings are trimmed and parsed, booleans count as `1` and `0`.
/// Anything else, anything that isn't finite and anything beyond [`MAX_MAGNITUDE`] is rejected.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    (n.is_finite() && n.abs() <= MAX_MAGNITUDE).then_some(n)
}

/// Every catalog field paired with its submitted value, `null` when absent.
pub fn echo_inputs(payload: &Payload) -> Vec<SubmittedInput> {
    FIELD_CATALOG
        .iter()
        .map(|&name| SubmittedInput {
            name,
            value: payload.get(name).cloned().unwrap_or(Value::Null),
        })
        .collect()
}
