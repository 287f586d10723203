pub mod activations;
pub mod layers;
mod sequential;

pub use sequential::Sequential;
