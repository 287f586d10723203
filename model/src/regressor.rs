use std::{fs, path::Path};

use log::info;
use ndarray::{Array1, Array2};

use crate::{
    ModelErr, Result,
    arch::{Sequential, layers::Layer},
    spec::{Artifact, ModelSpec, ScalerSpec},
};

/// Standardizes every feature as `(x - mean) / scale`.
#[derive(Clone, Debug)]
struct Scaler {
    mean: Array1<f32>,
    scale: Array1<f32>,
}

impl Scaler {
    fn new(spec: ScalerSpec, inputs: usize) -> Result<Self> {
        for (what, len) in [("scaler mean", spec.mean.len()), ("scaler scale", spec.scale.len())] {
            if len != inputs {
                return Err(ModelErr::SizeMismatch {
                    what,
                    got: len,
                    expected: inputs,
                });
            }
        }

        if let Some(index) = spec.scale.iter().position(|&s| s == 0.) {
            return Err(ModelErr::ZeroScale { index });
        }

        Ok(Self {
            mean: Array1::from(spec.mean),
            scale: Array1::from(spec.scale),
        })
    }

    fn apply(&self, x: &mut Array2<f32>) {
        *x -= &self.mean;
        *x /= &self.scale;
    }
}

/// A trained single output regressor. Immutable once built, so it can be shared across threads
/// without any locking.
#[derive(Clone, Debug)]
pub struct Regressor {
    model: Sequential,
    scaler: Option<Scaler>,
    params: Vec<f32>,
    inputs: usize,
}

impl Regressor {
    /// Reads and validates a JSON model artifact.
    ///
    /// # Arguments
    /// * `path` - The location of the artifact.
    ///
    /// # Returns
    /// The loaded regressor or an error if the file is missing, unparseable or inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelErr::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact: Artifact = serde_json::from_str(&content)?;
        let regressor = Self::from_artifact(artifact)?;

        info!(
            "loaded model from {} ({} inputs, {} parameters)",
            path.display(),
            regressor.inputs,
            regressor.params.len()
        );

        Ok(regressor)
    }

    /// Builds a regressor from an already parsed artifact.
    ///
    /// # Arguments
    /// * `artifact` - The model architecture, its parameters and an optional input scaler.
    ///
    /// # Returns
    /// The regressor or an error if the artifact is inconsistent.
    pub fn from_artifact(artifact: Artifact) -> Result<Self> {
        let Artifact {
            model,
            scaler,
            params,
        } = artifact;

        let ModelSpec::Sequential { layers } = model;
        let layers = layers
            .into_iter()
            .map(Layer::try_from)
            .collect::<Result<Vec<_>>>()?;
        let model = Sequential::new(layers)?;

        let (inputs, outputs) = model.check_chain()?;
        if outputs != 1 {
            return Err(ModelErr::SizeMismatch {
                what: "model outputs",
                got: outputs,
                expected: 1,
            });
        }

        if params.len() != model.size() {
            return Err(ModelErr::SizeMismatch {
                what: "model parameters",
                got: params.len(),
                expected: model.size(),
            });
        }

        let scaler = scaler.map(|spec| Scaler::new(spec, inputs)).transpose()?;

        Ok(Self {
            model,
            scaler,
            params,
            inputs,
        })
    }

    /// Returns the amount of features a single prediction takes.
    pub fn input_size(&self) -> usize {
        self.inputs
    }

    /// Predicts the target for a single sample.
    ///
    /// # Arguments
    /// * `x` - Exactly `self.input_size()` features, in training column order.
    ///
    /// # Returns
    /// The predicted value or an error if the sample has the wrong length.
    pub fn predict(&self, x: &[f32]) -> Result<f32> {
        if x.len() != self.inputs {
            return Err(ModelErr::SizeMismatch {
                what: "features",
                got: x.len(),
                expected: self.inputs,
            });
        }

        let mut x = Array2::from_shape_vec((1, self.inputs), x.to_vec()).map_err(|_| {
            ModelErr::SizeMismatch {
                what: "features",
                got: x.len(),
                expected: self.inputs,
            }
        })?;

        if let Some(scaler) = &self.scaler {
            scaler.apply(&mut x);
        }

        let y = self.model.forward(&self.params, x.view())?;
        Ok(y[[0, 0]])
    }
}
