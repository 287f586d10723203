pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod predictor;
pub mod service;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use model::Regressor;

pub use error::{PredictError, ServiceError};
pub use predictor::Predictor;
pub use service::{Prediction, PredictionService};

use crate::catalog::FeatureMapping;

/// Loads the model artifact and wires up the prediction service.
///
/// # Errors
/// Fails if the catalog and model features disagree, or if the artifact is missing, corrupt or
/// doesn't take as many features as the catalog maps.
pub fn load_service(model_path: &Path) -> anyhow::Result<PredictionService> {
    let mapping = FeatureMapping::new().context("inconsistent feature catalog")?;

    log::info!("loading model from {}", model_path.display());
    let regressor = Regressor::load(model_path)
        .with_context(|| format!("failed to load model '{}'", model_path.display()))?;

    anyhow::ensure!(
        regressor.input_size() == mapping.vector_len(),
        "model takes {} features but {} are mapped",
        regressor.input_size(),
        mapping.vector_len()
    );

    Ok(PredictionService::new(Arc::new(regressor), mapping))
}
