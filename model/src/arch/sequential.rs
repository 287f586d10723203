use ndarray::{Array2, ArrayView2};

use super::layers::Layer;
use crate::{ModelErr, Result};

/// A sequential model: information flows forward through its layers, the output of each one
/// being the input of the next.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
    size: usize,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance or an error if its parameter count doesn't fit in a `usize`.
    pub fn new<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let size = layers
            .iter()
            .try_fold(0usize, |acc, layer| acc.checked_add(layer.size()))
            .ok_or(ModelErr::TooLarge { what: "model" })?;

        Ok(Self { layers, size })
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Checks that the layers are not empty and that every layer takes as many inputs as the
    /// previous one outputs.
    ///
    /// # Returns
    /// The `(inputs, outputs)` shape of the whole model or an error if it is malformed.
    pub fn check_chain(&self) -> Result<(usize, usize)> {
        let (first, rest) = self.layers.split_first().ok_or(ModelErr::EmptyModel)?;
        let (inputs, mut outputs) = first.dim();

        for (i, layer) in rest.iter().enumerate() {
            let (n, m) = layer.dim();
            if n != outputs {
                return Err(ModelErr::LayerChain {
                    layer: i + 1,
                    got: n,
                    expected: outputs,
                });
            }
            outputs = m;
        }

        Ok((inputs, outputs))
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The parameters of every layer, concatenated in layer order.
    /// * `x` - The input data.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if params.len() != self.size() {
            return Err(ModelErr::SizeMismatch {
                what: "model parameters",
                got: params.len(),
                expected: self.size(),
            });
        }

        let mut rest = params;
        let mut out = x.to_owned();

        for layer in &self.layers {
            let (front, back) = rest.split_at(layer.size());
            out = layer.forward(front, out.view())?;
            rest = back;
        }

        Ok(out)
    }
}
