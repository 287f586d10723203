use std::{error::Error, fmt};

/// The result type of a single prediction request.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failures surfaced by a [`Predictor`](crate::predictor::Predictor).
#[derive(Debug)]
pub enum PredictError {
    /// The model itself failed, e.g. because of a malformed input shape.
    Model(model::ModelErr),
    /// The model produced a value that can't be reported as a number.
    NonFinite(f64),
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(e) => write!(f, "{e}"),
            Self::NonFinite(v) => write!(f, "the model produced a non finite prediction: {v}"),
        }
    }
}

impl Error for PredictError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            Self::NonFinite(_) => None,
        }
    }
}

impl From<model::ModelErr> for PredictError {
    fn from(value: model::ModelErr) -> Self {
        Self::Model(value)
    }
}

/// All errors a prediction request can end in.
#[derive(Debug)]
pub enum ServiceError {
    /// The request body couldn't be read as a payload.
    UnreadableBody(String),
    /// Catalog fields absent from the payload, all of them, in catalog order.
    MissingFields(Vec<&'static str>),
    /// The first model feature whose value couldn't be read as a number.
    InvalidValue(&'static str),
    /// The model failed while predicting.
    Inference(PredictError),
    /// A request handler panicked.
    Internal(String),
}

impl ServiceError {
    /// Whether the caller is to blame for this error.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::UnreadableBody(_) | Self::Inference(_) | Self::Internal(_)
        )
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableBody(msg) => write!(f, "{msg}"),
            Self::MissingFields(fields) => write!(f, "Missing inputs: {}", fields.join(", ")),
            Self::InvalidValue(field) => write!(f, "Invalid value for '{field}'"),
            Self::Inference(e) => write!(f, "{e}"),
            Self::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Inference(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PredictError> for ServiceError {
    fn from(value: PredictError) -> Self {
        Self::Inference(value)
    }
}
