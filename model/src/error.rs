use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The result type used in the entire model module.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// The model module's error type.
#[derive(Debug)]
pub enum ModelErr {
    Read {
        path: PathBuf,
        source: io::Error,
    },
    Parse(serde_json::Error),
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyModel,
    LayerChain {
        layer: usize,
        got: usize,
        expected: usize,
    },
    ZeroScale {
        index: usize,
    },
    TooLarge {
        what: &'static str,
    },
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::Read { path, source } => {
                write!(f, "cannot read model artifact '{}': {source}", path.display())
            }
            ModelErr::Parse(e) => write!(f, "invalid model artifact: {e}"),
            ModelErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            ModelErr::EmptyModel => write!(f, "the model has no layers"),
            ModelErr::LayerChain {
                layer,
                got,
                expected,
            } => write!(
                f,
                "layer {layer} takes {got} inputs but the previous layer outputs {expected}"
            ),
            ModelErr::ZeroScale { index } => {
                write!(f, "scaler has a zero scale at feature {index}")
            }
            ModelErr::TooLarge { what } => {
                write!(f, "the {what} size overflows the addressable range")
            }
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelErr::Read { source, .. } => Some(source),
            ModelErr::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}
