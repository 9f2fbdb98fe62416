//! Municipality identifier normalization.
//!
//! # Responsibility
//! - Reconcile the incompatible code encodings used by upstream datasets
//!   (6-digit zero-padded, 5-digit, bare in-province suffix,
//!   province-prefixed with or without the leading zero).
//!
//! # Invariants
//! - Normalization is pure and never fails; "not found" handling belongs
//!   to the caller.
//! - Leading zeros are semantically significant; codes are opaque text,
//!   never numbers.

mod normalizer;

pub use normalizer::{NormalizedCode, Normalizer};
