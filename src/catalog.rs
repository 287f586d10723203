//! The fixed pairing between the fields a client submits and the features the model consumes.

use std::{error::Error, fmt};

/// The 19 input fields, in the column order of the training CSV (without its leading index
/// column and without the `Actual PCI` label). Responses echo inputs in this order.
pub const FIELD_CATALOG: [&str; 19] = [
    "Part_length",
    "Carriageway width in m.",
    "Year of construction /upgradation",
    "Study Stretch Chainage",
    "Avg Rain fall",
    "Age of Pavement during Evalution Years ",
    "MDD",
    "OMC",
    "LL",
    "PL",
    "PI",
    "CBR",
    "SCI",
    "SN",
    "MSN",
    "CVPD",
    "evalution_year",
    "evalution_month",
    "evalution_quarter",
];

/// The name of the leading index column the model was trained with.
pub const PLACEHOLDER_FEATURE: &str = "Unnamed: 0";

/// The value always fed to the model for [`PLACEHOLDER_FEATURE`].
pub const PLACEHOLDER_VALUE: f64 = 0.0;

/// The 12 features the model consumes, in training column order.
pub const MODEL_FEATURES: [&str; 12] = [
    PLACEHOLDER_FEATURE,
    "Carriageway width in m.",
    "Year of construction /upgradation",
    "Study Stretch Chainage",
    "Avg Rain fall",
    "Age of Pavement during Evalution Years ",
    "MDD",
    "PI",
    "SCI",
    "MSN",
    "CVPD",
    "evalution_quarter",
];

/// A model feature that isn't part of the field catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownFeature(&'static str),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFeature(name) => {
                write!(f, "model feature '{name}' is not in the field catalog")
            }
        }
    }
}

impl Error for CatalogError {}

/// For every model feature after the placeholder, the position of its field in
/// [`FIELD_CATALOG`]. Built once at startup and shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMapping {
    indices: Vec<usize>,
}

impl FeatureMapping {
    /// Derives the mapping from [`MODEL_FEATURES`] and [`FIELD_CATALOG`].
    ///
    /// # Errors
    /// Returns `CatalogError::UnknownFeature` if the two lists drifted apart.
    pub fn new() -> Result<Self, CatalogError> {
        let indices = MODEL_FEATURES[1..]
            .iter()
            .map(|&feature| {
                FIELD_CATALOG
                    .iter()
                    .position(|&field| field == feature)
                    .ok_or(CatalogError::UnknownFeature(feature))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { indices })
    }

    /// The length of the vector the model expects, placeholder included.
    pub fn vector_len(&self) -> usize {
        self.indices.len() + 1
    }

    /// Iterates the `(field name, catalog index)` of every caller supplied feature, in model order.
    pub fn features(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.indices.iter().map(|&i| (FIELD_CATALOG[i], i))
    }
}
