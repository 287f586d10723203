use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{ModelErr, Result, arch::activations::ActFn};

/// A fully connected layer. Parameters are laid out as the row major `(inputs, outputs)` weight
/// matrix followed by one bias per output.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of inputs and outputs of the layer.
    /// * `act_fn` - An optional activation applied to every output.
    ///
    /// # Returns
    /// A new `Dense` instance or an error if its parameter count doesn't fit in a `usize`.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Result<Self> {
        let size = dim
            .0
            .checked_add(1)
            .and_then(|n| n.checked_mul(dim.1))
            .ok_or(ModelErr::TooLarge {
                what: "dense layer",
            })?;

        Ok(Self { dim, act_fn, size })
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Computes `act_fn(x · w + b)` for every row of `x`.
    ///
    /// # Arguments
    /// * `params` - Exactly `self.size()` parameters.
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The output batch or an error if the shapes don't line up.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(ModelErr::SizeMismatch {
                what: "dense layer input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w) + &b;

        if let Some(act_fn) = &self.act_fn {
            z.mapv_inplace(|v| act_fn.f(v));
        }

        Ok(z)
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(ModelErr::SizeMismatch {
                what: "dense layer parameters",
                got: params.len(),
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let shape_err = |_| ModelErr::SizeMismatch {
            what: "dense layer parameters",
            got: params.len(),
            expected: self.size,
        };
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size]).map_err(shape_err)?;
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..]).map_err(shape_err)?;
        Ok((weights, biases))
    }
}
