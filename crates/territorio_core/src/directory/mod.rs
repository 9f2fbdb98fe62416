//! Read-only municipality directory.
//!
//! # Responsibility
//! - Hold the code -> (name, province, region) table loaded once at
//!   process start.
//! - Answer exact-match lookups by canonical code and sorted listings
//!   for region/province/municipality pickers.
//!
//! # Invariants
//! - The table is an immutable snapshot; an update is a reconstruction,
//!   never in-place invalidation.
//! - Records are keyed by the canonical code built through the
//!   normalizer at load time, so lookups are exact-match O(1).

mod loader;

use crate::ident::{NormalizedCode, Normalizer};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use loader::{
    CsvDirectoryLoader, DirectoryError, DirectoryLoader, DirectoryRow, StaticDirectoryLoader,
};

/// One municipality as known by the static directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityRecord {
    /// Canonical 6-character ISTAT code, the stable key.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Province the municipality belongs to.
    pub province: String,
    /// Region the province belongs to.
    pub region: String,
}

/// Immutable lookup table over the municipality dataset.
#[derive(Debug)]
pub struct MunicipalityDirectory {
    by_code: HashMap<String, MunicipalityRecord>,
    provinces_by_region: BTreeMap<String, BTreeSet<String>>,
    codes_by_province: BTreeMap<String, Vec<String>>,
}

impl MunicipalityDirectory {
    /// Builds the directory snapshot from a loader.
    ///
    /// Row codes are canonicalized through `normalizer` before keying;
    /// duplicate canonical codes keep the first row seen, matching the
    /// legacy dataset's dedup behavior.
    pub fn load(
        loader: &dyn DirectoryLoader,
        normalizer: &Normalizer,
    ) -> Result<Self, DirectoryError> {
        let rows = loader.load()?;

        let mut by_code = HashMap::new();
        let mut provinces_by_region: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut codes_by_province: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for row in rows {
            let canonical = normalizer.normalize(&row.code).canonical;
            if by_code.contains_key(&canonical) {
                warn!(
                    "event=directory_load module=directory status=duplicate code={}",
                    canonical
                );
                continue;
            }

            provinces_by_region
                .entry(row.region.clone())
                .or_default()
                .insert(row.province.clone());
            codes_by_province
                .entry(row.province.clone())
                .or_default()
                .push(canonical.clone());

            by_code.insert(
                canonical.clone(),
                MunicipalityRecord {
                    code: canonical,
                    name: row.name,
                    province: row.province,
                    region: row.region,
                },
            );
        }

        info!(
            "event=directory_load module=directory status=ok municipalities={}",
            by_code.len()
        );

        Ok(Self {
            by_code,
            provinces_by_region,
            codes_by_province,
        })
    }

    /// Exact-match lookup by canonical code.
    pub fn lookup(&self, code: &str) -> Option<&MunicipalityRecord> {
        self.by_code.get(code)
    }

    /// Resolves a normalized identifier, trying the canonical form first
    /// and then each variant. First hit wins.
    pub fn resolve(&self, normalized: &NormalizedCode) -> Option<&MunicipalityRecord> {
        normalized
            .candidates()
            .find_map(|candidate| self.by_code.get(candidate))
    }

    /// Region names, sorted lexicographically.
    pub fn regions(&self) -> Vec<&str> {
        self.provinces_by_region.keys().map(String::as_str).collect()
    }

    /// Provinces of one region, sorted lexicographically.
    pub fn provinces(&self, region: &str) -> Vec<&str> {
        self.provinces_by_region
            .get(region)
            .map(|provinces| provinces.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Municipalities of one province, sorted by display name.
    pub fn municipalities(&self, province: &str) -> Vec<&MunicipalityRecord> {
        let mut records: Vec<&MunicipalityRecord> = self
            .codes_by_province
            .get(province)
            .into_iter()
            .flatten()
            .filter_map(|code| self.by_code.get(code))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Number of loaded municipalities.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
