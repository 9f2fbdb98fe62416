//! Canonicalization rules for ISTAT municipality codes.
//!
//! # Responsibility
//! - Map a raw identifier to its canonical 6-character form plus every
//!   acceptable legacy variant.
//!
//! # Invariants
//! - The variant list preserves first-occurrence order and holds no
//!   duplicates; the canonical form is always the first entry.
//! - Ambiguous short inputs expand to one candidate per configured
//!   province prefix; no single "correct" prefix is assumed, because
//!   guessing wrong silently drops units from the map.

use once_cell::sync::Lazy;
use regex::Regex;

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").expect("digit pattern is valid")
});

/// Province prefixes tried for short in-province suffixes.
///
/// Covers the operating region (Lecco and neighbouring Lombardy
/// provinces). Callers with a different catchment area pass their own
/// list to [`Normalizer::new`].
pub const DEFAULT_PROVINCE_PREFIXES: &[&str] = &["097", "013", "015", "016", "014", "108"];

/// Outcome of normalizing one raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCode {
    /// Best-effort canonical 6-character form.
    pub canonical: String,
    /// Every acceptable encoding, canonical first, first-occurrence order.
    pub variants: Vec<String>,
}

impl NormalizedCode {
    /// Lookup candidates in priority order: canonical first, then the
    /// remaining variants.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(String::as_str)
    }
}

/// Identifier normalizer with an explicit candidate-province list.
#[derive(Debug, Clone)]
pub struct Normalizer {
    province_prefixes: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PROVINCE_PREFIXES.iter().map(|p| p.to_string()))
    }
}

impl Normalizer {
    /// Creates a normalizer trying the given province prefixes for short
    /// suffix inputs. Prefixes are zero-padded to 3 digits.
    pub fn new(province_prefixes: impl IntoIterator<Item = String>) -> Self {
        let province_prefixes = province_prefixes
            .into_iter()
            .map(|prefix| pad_left(prefix.trim(), 3))
            .collect();
        Self { province_prefixes }
    }

    /// Maps a raw identifier to canonical form plus acceptable variants.
    ///
    /// Never errors: malformed input comes back as itself, so the caller
    /// can report it unresolvable after a failed directory lookup.
    pub fn normalize(&self, raw: &str) -> NormalizedCode {
        let trimmed = raw.trim();

        if !DIGITS_RE.is_match(trimmed) {
            return NormalizedCode {
                canonical: trimmed.to_string(),
                variants: vec![trimmed.to_string()],
            };
        }

        match trimmed.len() {
            6 => {
                let mut variants = vec![trimmed.to_string()];
                // Some providers key features on the unpadded 5-digit form.
                if let Some(short) = trimmed.strip_prefix('0') {
                    push_unique(&mut variants, short.to_string());
                }
                NormalizedCode {
                    canonical: trimmed.to_string(),
                    variants,
                }
            }
            5 => {
                let canonical = format!("0{trimmed}");
                let mut variants = vec![canonical.clone()];
                push_unique(&mut variants, trimmed.to_string());
                NormalizedCode { canonical, variants }
            }
            1..=3 => {
                let suffix = pad_left(trimmed, 3);
                let mut variants = Vec::new();
                for prefix in &self.province_prefixes {
                    push_unique(&mut variants, format!("{prefix}{suffix}"));
                }
                if variants.is_empty() {
                    push_unique(&mut variants, suffix.clone());
                }
                NormalizedCode {
                    canonical: variants[0].clone(),
                    variants,
                }
            }
            _ => NormalizedCode {
                canonical: trimmed.to_string(),
                variants: vec![trimmed.to_string()],
            },
        }
    }

    /// Convenience accessor for the full variant set of a raw identifier.
    pub fn variants(&self, raw: &str) -> Vec<String> {
        self.normalize(raw).variants
    }
}

fn pad_left(value: &str, width: usize) -> String {
    if value.len() >= width {
        value.to_string()
    } else {
        format!("{}{}", "0".repeat(width - value.len()), value)
    }
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::Normalizer;

    #[test]
    fn six_digit_code_is_already_canonical() {
        let normalizer = Normalizer::default();
        let normalized = normalizer.normalize(" 097042 ");
        assert_eq!(normalized.canonical, "097042");
        assert_eq!(normalized.variants, vec!["097042", "97042"]);
    }

    #[test]
    fn five_digit_code_gains_leading_zero() {
        let normalizer = Normalizer::default();
        let normalized = normalizer.normalize("97042");
        assert_eq!(normalized.canonical, "097042");
        assert!(normalized.variants.contains(&"97042".to_string()));
    }

    #[test]
    fn short_suffix_expands_across_configured_provinces() {
        let normalizer = Normalizer::new(vec!["97".to_string(), "13".to_string()]);
        let normalized = normalizer.normalize("42");
        assert_eq!(normalized.canonical, "097042");
        assert_eq!(normalized.variants, vec!["097042", "013042"]);
    }

    #[test]
    fn short_prefix_is_zero_padded_before_concatenation() {
        let normalizer = Normalizer::new(vec!["97".to_string()]);
        let normalized = normalizer.normalize("1");
        assert_eq!(normalized.canonical, "097001");
    }

    #[test]
    fn malformed_input_never_errors() {
        let normalizer = Normalizer::default();
        let normalized = normalizer.normalize("abc123");
        assert_eq!(normalized.canonical, "abc123");
        assert_eq!(normalized.variants, vec!["abc123"]);

        let four = normalizer.normalize("1234");
        assert_eq!(four.canonical, "1234");
    }

    #[test]
    fn variants_contain_no_duplicates() {
        let normalizer = Normalizer::new(vec!["097".to_string(), "97".to_string()]);
        let normalized = normalizer.normalize("42");
        assert_eq!(normalized.variants, vec!["097042"]);
    }
}
