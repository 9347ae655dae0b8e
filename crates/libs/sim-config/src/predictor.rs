//! Branch predictor roster.
//!
//! The roster is a closed set. Each variant resolves to its construction
//! parameters through a static table instead of looking up simulator classes
//! by name at run time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A branch predictor variant under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predictor {
    /// L-TAGE predictor.
    #[serde(rename = "LTAGE")]
    Ltage,
    /// Local history predictor.
    #[serde(rename = "LocalBP")]
    Local,
    /// Tournament predictor.
    #[serde(rename = "TournamentBP")]
    Tournament,
    /// Bi-mode predictor.
    #[serde(rename = "BiModeBP")]
    BiMode,
    /// Perceptron predictor.
    #[serde(rename = "PerceptronBP")]
    Perceptron,
}

/// Construction parameters of a predictor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorParams {
    /// The variant.
    pub predictor: Predictor,
    /// Label passed to the configuration script and used in output paths.
    pub label: &'static str,
}

/// Indexed by `Predictor as usize`.
static ROSTER: [PredictorParams; 5] = [
    PredictorParams {
        predictor: Predictor::Ltage,
        label: "LTAGE",
    },
    PredictorParams {
        predictor: Predictor::Local,
        label: "LocalBP",
    },
    PredictorParams {
        predictor: Predictor::Tournament,
        label: "TournamentBP",
    },
    PredictorParams {
        predictor: Predictor::BiMode,
        label: "BiModeBP",
    },
    PredictorParams {
        predictor: Predictor::Perceptron,
        label: "PerceptronBP",
    },
];

impl Predictor {
    /// Every variant, in roster order.
    pub const ALL: [Predictor; 5] = [
        Predictor::Ltage,
        Predictor::Local,
        Predictor::Tournament,
        Predictor::BiMode,
        Predictor::Perceptron,
    ];

    /// Construction parameters for this variant.
    pub fn params(self) -> &'static PredictorParams {
        &ROSTER[self as usize]
    }

    /// Label passed to the configuration script.
    pub fn label(self) -> &'static str {
        self.params().label
    }
}

impl FromStr for Predictor {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        ROSTER
            .iter()
            .find(|entry| entry.label == value)
            .map(|entry| entry.predictor)
            .ok_or_else(|| Error::UnknownPredictor(String::from(value)))
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_is_indexed_by_discriminant() {
        for predictor in Predictor::ALL {
            assert_eq!(predictor.params().predictor, predictor);
        }
    }

    #[test]
    fn labels_resolve_back_to_variants() -> Result<()> {
        for predictor in Predictor::ALL {
            assert_eq!(predictor.label().parse::<Predictor>()?, predictor);
        }
        Ok(())
    }

    #[test]
    fn perceptron_is_registered() -> Result<()> {
        assert_eq!("PerceptronBP".parse::<Predictor>()?, Predictor::Perceptron);
        assert_eq!(Predictor::Perceptron.to_string(), "PerceptronBP");
        Ok(())
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "GShareBP".parse::<Predictor>().unwrap_err();
        assert!(matches!(err, Error::UnknownPredictor(label) if label == "GShareBP"));
    }

    #[test]
    fn serde_uses_labels() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            predictor: Predictor,
        }
        let out = toml::to_string(&Wrapper {
            predictor: Predictor::BiMode,
        })
        .unwrap();
        assert_eq!(out.trim(), r#"predictor = "BiModeBP""#);
        let back: Wrapper = toml::from_str(r#"predictor = "LocalBP""#).unwrap();
        assert_eq!(back.predictor, Predictor::Local);
    }
}
