//! Model architecture variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The model architectures the training subsystem simulates.
///
/// Serializes to the uppercase strings the dashboard API uses
/// (`"CNN"`, `"LSTM"`, `"Transformer"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// Convolutional network.
    #[default]
    #[serde(rename = "CNN")]
    Cnn,
    /// Recurrent network.
    #[serde(rename = "LSTM")]
    Lstm,
    /// Attention-based network.
    #[serde(rename = "Transformer")]
    Transformer,
}

impl ModelType {
    /// The wire string for this model type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cnn => "CNN",
            Self::Lstm => "LSTM",
            Self::Transformer => "Transformer",
        }
    }

    /// Parse a stored model-type string, falling back to [`ModelType::Cnn`]
    /// for anything unrecognized.
    ///
    /// Records may predate the current type list; the simulation constants
    /// for CNN are the documented fallback.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "LSTM" => Self::Lstm,
            "Transformer" => Self::Transformer,
            _ => Self::Cnn,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
