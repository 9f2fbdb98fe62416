//! Feature resolution with deterministic placeholder synthesis.
//!
//! # Responsibility
//! - Produce one feature per distinct requested code, preferring the
//!   boundary provider and synthesizing a placeholder otherwise.
//!
//! # Invariants
//! - Output order is first-occurrence order of the post-normalization
//!   codes; duplicates collapse.
//! - Synthesis is seeded from an FNV-1a hash of the canonical code, so
//!   repeated renders of the same code are byte-identical. The hash is
//!   an explicit in-crate contract, not `DefaultHasher` behavior.

use crate::directory::MunicipalityDirectory;
use crate::geo::feature::{Feature, FeatureCollection, FeatureProperties, Geometry};
use crate::geo::provider::BoundaryProvider;
use crate::ident::Normalizer;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Bounding region placeholder centers are drawn from (Lecco area).
const SYNTH_LAT_RANGE: (f64, f64) = (45.75, 46.0);
const SYNTH_LON_RANGE: (f64, f64) = (9.25, 9.55);
const SYNTH_RADIUS_RANGE: (f64, f64) = (0.008, 0.018);
const SYNTH_RING_POINTS: usize = 6;

/// Resolves municipality codes into renderable features.
pub struct GeometryResolver<P> {
    provider: P,
    directory: Arc<MunicipalityDirectory>,
    normalizer: Normalizer,
}

impl<P: BoundaryProvider> GeometryResolver<P> {
    pub fn new(provider: P, directory: Arc<MunicipalityDirectory>, normalizer: Normalizer) -> Self {
        Self {
            provider,
            directory,
            normalizer,
        }
    }

    /// Resolves one feature per distinct input code.
    ///
    /// Never fails as a whole: provider errors degrade to synthesized
    /// geometry for the affected codes only.
    pub fn resolve(&self, codes: &[String]) -> FeatureCollection {
        let mut features = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut synthesized = 0usize;

        for raw in codes {
            let normalized = self.normalizer.normalize(raw);
            if !seen.insert(normalized.canonical.clone()) {
                continue;
            }

            let display_name = self
                .directory
                .resolve(&normalized)
                .map(|record| record.name.clone())
                .unwrap_or_else(|| format!("Municipality {}", normalized.canonical));

            let provider_hit = match self
                .provider
                .fetch_feature(&normalized.canonical, &normalized.variants)
            {
                Ok(hit) => hit,
                Err(err) => {
                    warn!(
                        "event=boundary_fetch module=geo status=degraded code={} error={}",
                        normalized.canonical, err
                    );
                    None
                }
            };

            let feature = match provider_hit {
                Some(mut feature) => {
                    feature.properties = FeatureProperties {
                        id: normalized.canonical.clone(),
                        name: display_name,
                        synthetic: false,
                    };
                    feature
                }
                None => {
                    synthesized += 1;
                    Feature::new(
                        FeatureProperties {
                            id: normalized.canonical.clone(),
                            name: display_name,
                            synthetic: true,
                        },
                        synthesize_polygon(&normalized.canonical),
                    )
                }
            };
            features.push(feature);
        }

        info!(
            "event=geometry_resolve module=geo status=ok features={} synthesized={}",
            features.len(),
            synthesized
        );
        FeatureCollection::new(features)
    }
}

/// Deterministic placeholder polygon for one canonical code.
///
/// Same code, same polygon: the generator is seeded from the code alone.
fn synthesize_polygon(canonical: &str) -> Geometry {
    let mut rng = StdRng::seed_from_u64(fnv1a_64(canonical.as_bytes()));

    let center_lat = rng.gen_range(SYNTH_LAT_RANGE.0..SYNTH_LAT_RANGE.1);
    let center_lon = rng.gen_range(SYNTH_LON_RANGE.0..SYNTH_LON_RANGE.1);
    let radius = rng.gen_range(SYNTH_RADIUS_RANGE.0..SYNTH_RADIUS_RANGE.1);

    let mut ring = Vec::with_capacity(SYNTH_RING_POINTS + 1);
    for step in 0..SYNTH_RING_POINTS {
        let angle = (step as f64) * (360.0 / SYNTH_RING_POINTS as f64);
        let lat = center_lat + radius * angle.to_radians().cos();
        let lon = center_lon + radius * angle.to_radians().sin();
        ring.push([lon, lat]);
    }
    ring.push(ring[0]);

    Geometry::Polygon {
        coordinates: vec![ring],
    }
}

/// FNV-1a 64-bit. Kept in-crate so the same-code-same-polygon guarantee
/// does not depend on std hash internals.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::{fnv1a_64, synthesize_polygon};
    use crate::geo::feature::Geometry;

    #[test]
    fn fnv_hash_matches_reference_vectors() {
        // Reference values for the 64-bit FNV-1a parameters.
        assert_eq!(fnv1a_64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn synthesis_is_deterministic_per_code() {
        assert_eq!(synthesize_polygon("097042"), synthesize_polygon("097042"));
        assert_ne!(synthesize_polygon("097042"), synthesize_polygon("097001"));
    }

    #[test]
    fn synthesized_ring_is_closed() {
        let Geometry::Polygon { coordinates } = synthesize_polygon("097042") else {
            panic!("synthesis must emit a polygon");
        };
        let ring = &coordinates[0];
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), super::SYNTH_RING_POINTS + 1);
    }
}
