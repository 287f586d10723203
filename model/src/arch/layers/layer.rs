use ndarray::{Array2, ArrayView2};

use super::Dense;
use crate::{ModelErr, Result, arch::activations::ActFn, spec::LayerSpec};

#[derive(Clone, Debug)]
pub enum Layer {
    Dense(Dense),
}
use Layer::*;

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Result<Self> {
        Dense::new(dim, act_fn).map(Dense)
    }

    /// The amount of parameters this layer consumes.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
        }
    }

    /// The `(inputs, outputs)` shape of this layer.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Dense(l) => l.dim(),
        }
    }

    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.forward(params, x),
        }
    }
}

impl TryFrom<LayerSpec> for Layer {
    type Error = ModelErr;

    fn try_from(spec: LayerSpec) -> Result<Self> {
        match spec {
            LayerSpec::Dense { dim, act_fn } => Self::dense(dim, act_fn.map(ActFn::from)),
        }
    }
}
