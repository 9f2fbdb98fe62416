//! Boundary provider contracts and the static-dictionary backend.
//!
//! # Responsibility
//! - Define the interface an authoritative boundary source implements.
//! - Provide the pre-resolved JSON dictionary backend used in place of a
//!   live WFS service.
//!
//! # Invariants
//! - Provider lookups try the canonical code first, then every known
//!   variant; first hit wins.
//! - A missing or unparsable dictionary file degrades to an empty
//!   dictionary with a logged warning, never a startup failure.

use crate::geo::feature::Feature;
use log::warn;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Failure talking to a boundary source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The source is unreachable or timed out.
    Unavailable(String),
    /// The source answered with data that cannot be decoded.
    Malformed(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "boundary provider unavailable: {message}"),
            Self::Malformed(message) => write!(f, "boundary provider payload malformed: {message}"),
        }
    }
}

impl Error for ProviderError {}

/// Source of authoritative boundary features keyed by municipality code.
pub trait BoundaryProvider {
    /// Fetches one feature, trying `code` and then each variant.
    fn fetch_feature(
        &self,
        code: &str,
        variants: &[String],
    ) -> Result<Option<Feature>, ProviderError>;

    /// Fetches many codes at once; the map may be partial and per-code
    /// failures are swallowed, matching the degrade-don't-fail policy.
    fn fetch_batch(&self, codes: &[String]) -> HashMap<String, Feature> {
        let mut found = HashMap::new();
        for code in codes {
            match self.fetch_feature(code, &[]) {
                Ok(Some(feature)) => {
                    found.insert(code.clone(), feature);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        "event=boundary_fetch module=geo status=degraded code={} error={}",
                        code, err
                    );
                }
            }
        }
        found
    }
}

/// Provider with no data; every code falls through to synthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoundaryProvider;

impl BoundaryProvider for NoBoundaryProvider {
    fn fetch_feature(
        &self,
        _code: &str,
        _variants: &[String],
    ) -> Result<Option<Feature>, ProviderError> {
        Ok(None)
    }
}

/// Boundary backend over a pre-resolved code -> feature dictionary file
/// (the optimized `comuni_dict.json` produced offline).
#[derive(Debug, Clone, Default)]
pub struct StaticBoundaryProvider {
    features: HashMap<String, Feature>,
}

impl StaticBoundaryProvider {
    pub fn new(features: HashMap<String, Feature>) -> Self {
        Self { features }
    }

    /// Loads the dictionary file, degrading to an empty dictionary when
    /// the file is missing or unparsable.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(
                    "event=boundary_dict_load module=geo status=degraded path={} error={}",
                    path.display(),
                    err
                );
                return Self::default();
            }
        };

        match serde_json::from_str::<HashMap<String, Feature>>(&content) {
            Ok(features) => Self::new(features),
            Err(err) => {
                warn!(
                    "event=boundary_dict_load module=geo status=degraded path={} error={}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl BoundaryProvider for StaticBoundaryProvider {
    fn fetch_feature(
        &self,
        code: &str,
        variants: &[String],
    ) -> Result<Option<Feature>, ProviderError> {
        if let Some(feature) = self.features.get(code) {
            return Ok(Some(feature.clone()));
        }
        for variant in variants {
            if let Some(feature) = self.features.get(variant) {
                return Ok(Some(feature.clone()));
            }
        }
        Ok(None)
    }
}
