pub mod arch;
pub mod error;
mod regressor;
pub mod spec;

pub use error::{ModelErr, Result};
pub use regressor::Regressor;
pub use spec::{ActFnSpec, Artifact, LayerSpec, ModelSpec, ScalerSpec};
