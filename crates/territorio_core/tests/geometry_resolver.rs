use std::collections::HashMap;
use std::sync::Arc;
use territorio_core::{
    BoundaryProvider, Feature, FeatureProperties, Geometry, GeometryResolver,
    MunicipalityDirectory, NoBoundaryProvider, Normalizer, ProviderError, StaticBoundaryProvider,
    StaticDirectoryLoader,
};

struct UnreachableProvider;

impl BoundaryProvider for UnreachableProvider {
    fn fetch_feature(
        &self,
        _code: &str,
        _variants: &[String],
    ) -> Result<Option<Feature>, ProviderError> {
        Err(ProviderError::Unavailable("connection refused".to_string()))
    }
}

struct FlakyProvider;

impl BoundaryProvider for FlakyProvider {
    fn fetch_feature(
        &self,
        code: &str,
        _variants: &[String],
    ) -> Result<Option<Feature>, ProviderError> {
        match code {
            "097042" => Ok(Some(authoritative_feature("097042"))),
            "097001" => Err(ProviderError::Unavailable("timeout".to_string())),
            _ => Ok(None),
        }
    }
}

fn directory() -> Arc<MunicipalityDirectory> {
    Arc::new(
        MunicipalityDirectory::load(&StaticDirectoryLoader::builtin(), &Normalizer::default())
            .unwrap(),
    )
}

fn authoritative_feature(code: &str) -> Feature {
    Feature::new(
        FeatureProperties {
            id: code.to_string(),
            name: String::new(),
            synthetic: false,
        },
        Geometry::Polygon {
            coordinates: vec![vec![
                [9.380, 45.830],
                [9.410, 45.835],
                [9.430, 45.850],
                [9.380, 45.830],
            ]],
        },
    )
}

fn raw(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn synthesized_geometry_is_byte_identical_across_calls() {
    let resolver = GeometryResolver::new(NoBoundaryProvider, directory(), Normalizer::default());

    let first = serde_json::to_vec(&resolver.resolve(&raw(&["097042"]))).unwrap();
    let second = serde_json::to_vec(&resolver.resolve(&raw(&["097042"]))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn provider_hit_yields_authoritative_feature_with_directory_name() {
    let mut dict = HashMap::new();
    dict.insert("097042".to_string(), authoritative_feature("097042"));
    let resolver = GeometryResolver::new(
        StaticBoundaryProvider::new(dict),
        directory(),
        Normalizer::default(),
    );

    let collection = resolver.resolve(&raw(&["097042", "097001"]));
    assert_eq!(collection.features.len(), 2);

    let lecco = &collection.features[0];
    assert!(!lecco.properties.synthetic);
    assert_eq!(lecco.properties.id, "097042");
    assert_eq!(lecco.properties.name, "Lecco");

    let abbadia = &collection.features[1];
    assert!(abbadia.properties.synthetic);
    assert_eq!(abbadia.properties.name, "Abbadia Lariana");
}

#[test]
fn provider_dictionary_is_consulted_with_variants() {
    // Dictionary keyed on the unpadded 5-digit form; request uses the
    // canonical 6-digit form.
    let mut dict = HashMap::new();
    dict.insert("97042".to_string(), authoritative_feature("97042"));
    let resolver = GeometryResolver::new(
        StaticBoundaryProvider::new(dict),
        directory(),
        Normalizer::default(),
    );

    let collection = resolver.resolve(&raw(&["097042"]));
    assert!(!collection.features[0].properties.synthetic);
    assert_eq!(collection.features[0].properties.id, "097042");
}

#[test]
fn unreachable_provider_degrades_to_synthesis_without_failing() {
    let resolver = GeometryResolver::new(UnreachableProvider, directory(), Normalizer::default());

    let collection = resolver.resolve(&raw(&["097042", "097001"]));
    assert_eq!(collection.features.len(), 2);
    assert!(collection
        .features
        .iter()
        .all(|feature| feature.properties.synthetic));
}

#[test]
fn duplicate_and_variant_inputs_yield_one_feature_in_first_occurrence_order() {
    let resolver = GeometryResolver::new(NoBoundaryProvider, directory(), Normalizer::default());

    let collection = resolver.resolve(&raw(&["097001", "097042", "97042", "097001"]));
    let ids: Vec<&str> = collection
        .features
        .iter()
        .map(|feature| feature.properties.id.as_str())
        .collect();
    assert_eq!(ids, vec!["097001", "097042"]);
}

#[test]
fn unknown_code_gets_generated_label() {
    let resolver = GeometryResolver::new(NoBoundaryProvider, directory(), Normalizer::default());

    let collection = resolver.resolve(&raw(&["999999"]));
    assert_eq!(collection.features[0].properties.name, "Municipality 999999");
    assert!(collection.features[0].properties.synthetic);
}

#[test]
fn fetch_batch_returns_partial_map_and_swallows_per_code_errors() {
    let found = FlakyProvider.fetch_batch(&raw(&["097042", "097001", "999999"]));

    // One hit, one provider failure, one miss: only the hit lands.
    assert_eq!(found.len(), 1);
    assert_eq!(found["097042"].properties.id, "097042");
    assert!(!found.contains_key("097001"));
    assert!(!found.contains_key("999999"));
}

#[test]
fn missing_dictionary_file_degrades_to_empty_provider() {
    let provider = StaticBoundaryProvider::from_path("/nonexistent/comuni_dict.json");
    assert!(provider.is_empty());
}
