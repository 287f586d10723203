use model::Regressor;

use crate::error::PredictError;

/// Anything able to turn a feature vector into a single prediction.
///
/// Implementors are shared by every request at once, so `predict` only gets `&self`.
pub trait Predictor: Send + Sync {
    /// Predicts the target for `features`, which are laid out as
    /// [`MODEL_FEATURES`](crate::catalog::MODEL_FEATURES).
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;
}

/// The regressor evaluates in `f32`: features are narrowed, so values beyond `f32::MAX` must be
/// rejected before reaching it (see [`MAX_MAGNITUDE`](crate::service::MAX_MAGNITUDE)) and close
/// values may round.
impl Predictor for Regressor {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        let x: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let y = f64::from(Regressor::predict(self, &x)?);

        if !y.is_finite() {
            return Err(PredictError::NonFinite(y));
        }

        Ok(y)
    }
}
