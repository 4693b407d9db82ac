//! Sanitizer options loaded from JSON configuration
#![cfg(feature = "serde")]

use markup_rewriter::transform::transform_sync;
use markup_rewriter::transformers::{SanitizeOptions, sanitize};

#[test]
fn test_camel_case_options_deserialize() {
    let options: SanitizeOptions = serde_json::from_str(
        r#"{
            "blockElements": ["div"],
            "dropAttributes": { "class": ["*"] },
            "allowCustomElements": true
        }"#,
    )
    .unwrap();

    assert_eq!(options.block_elements, vec!["div".to_string()]);
    assert!(options.allow_custom_elements);
    assert!(!options.allow_components);
    assert!(options.allow_elements.is_empty());

    let out = transform_sync(
        "<div class=\"a\"><x-card class=\"b\">hi</x-card></div>",
        &[sanitize(options)],
    )
    .unwrap();
    assert_eq!(out, "<x-card>hi</x-card>");
}

#[test]
fn test_empty_object_is_default() {
    let options: SanitizeOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, SanitizeOptions::default());
}

#[test]
fn test_options_serialize_in_camel_case() {
    let mut options = SanitizeOptions::default();
    options.allow_attributes.insert("href".to_string(), vec!["a".to_string()]);
    let json = serde_json::to_value(&options).unwrap();
    assert_eq!(json["allowAttributes"]["href"][0], "a");
    assert_eq!(json["allowComments"], false);
}
