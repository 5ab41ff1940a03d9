//! Match classification boundary.
//!
//! The pipeline treats the classifier as an injected capability: anything
//! that can score a [`FeatureVector`] into a boolean match decision. The
//! production implementation is a [`LinearModel`] loaded once from a JSON
//! artifact exported from the offline training run and reused for every
//! classification call in the process.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::matching::{FEATURE_COUNT, FeatureVector};

/// Errors from classifier loading and scoring.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Model artifact could not be read
    #[error("cannot read model artifact '{path}': {source}")]
    Io {
        /// Artifact path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Model artifact could not be decoded
    #[error("cannot decode model artifact '{path}': {source}")]
    Decode {
        /// Artifact path
        path: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// Model artifact has the wrong feature arity
    #[error(
        "model artifact has {actual} weights, expected {expected}: the artifact was trained against a different feature schema"
    )]
    ArityMismatch {
        /// Weights found in the artifact
        actual: usize,
        /// Weights the feature schema requires
        expected: usize,
    },
}

/// Scores a feature vector into a boolean match decision.
pub trait Classifier: Send + Sync {
    /// Returns true when the feature vector describes a matching pair.
    fn predict(&self, features: &FeatureVector) -> bool;
}

/// Linear decision model over the fixed ten-feature schema.
///
/// The artifact carries one weight and one imputation value per feature
/// (not-applicable features take their imputation value before the dot
/// product), an intercept, and the decision threshold on the linear score.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    impute: Vec<f64>,
    intercept: f64,
    threshold: f64,
}

impl LinearModel {
    /// Loads and validates a model artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] when the file cannot be read or decoded,
    /// or when its weight/imputation arity does not match the feature
    /// schema.
    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let raw = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model: Self =
            serde_json::from_str(&raw).map_err(|source| ClassifierError::Decode {
                path: path.display().to_string(),
                source,
            })?;
        model.validate()?;
        debug!(path = %path.display(), "Loaded match classifier artifact");
        Ok(model)
    }

    /// Builds a model from parts, validating arity.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::ArityMismatch`] when `weights` or
    /// `impute` is not exactly one value per feature.
    pub fn from_parts(
        weights: Vec<f64>,
        impute: Vec<f64>,
        intercept: f64,
        threshold: f64,
    ) -> Result<Self, ClassifierError> {
        let model = Self {
            weights,
            impute,
            intercept,
            threshold,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ClassifierError::ArityMismatch {
                actual: self.weights.len(),
                expected: FEATURE_COUNT,
            });
        }
        if self.impute.len() != FEATURE_COUNT {
            return Err(ClassifierError::ArityMismatch {
                actual: self.impute.len(),
                expected: FEATURE_COUNT,
            });
        }
        Ok(())
    }

    /// Linear score of a feature vector, missing values imputed.
    #[must_use]
    pub fn score(&self, features: &FeatureVector) -> f64 {
        features
            .to_values()
            .iter()
            .zip(self.weights.iter().zip(self.impute.iter()))
            .map(|(value, (weight, impute))| weight * value.unwrap_or(*impute))
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LinearModel {
    fn predict(&self, features: &FeatureVector) -> bool {
        self.score(features) >= self.threshold
    }
}
