//! Boundary geometry resolution for map rendering.
//!
//! # Responsibility
//! - Turn a set of municipality codes into renderable GeoJSON-like
//!   features, preferring authoritative boundaries and synthesizing
//!   deterministic placeholders otherwise.
//!
//! # Invariants
//! - Geometry resolution never touches the assignment ledger and never
//!   holds its lock.
//! - Provider failures degrade to synthesis; they are never fatal.

mod feature;
mod provider;
mod resolver;

pub use feature::{center_of, Feature, FeatureCollection, FeatureProperties, Geometry};
pub use provider::{BoundaryProvider, NoBoundaryProvider, ProviderError, StaticBoundaryProvider};
pub use resolver::GeometryResolver;
