//! Tests for the configuration module.
//!
//! All loading paths go through `Config::from_lookup` with a closure over a
//! slice, so required-variable and expansion behavior is covered without
//! unsafe environment variable manipulation.

use proptest::prelude::*;

use crate::config::{Config, DEFAULT_IMAGE_MODEL};
use crate::error::ConfigError;

/// Build a lookup function over a fixed set of variables.
fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[cfg(test)]
mod loading_tests {
    use super::*;

    #[test]
    fn loads_required_values() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "test-key-123"),
            ("OUTPUT_DIR", "/tmp/generated-images"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "test-key-123");
        assert_eq!(config.output_dir.to_str().unwrap(), "/tmp/generated-images");
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Config::from_lookup(lookup(&[("OUTPUT_DIR", "/tmp/out")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "GEMINI_API_KEY"));
    }

    #[test]
    fn missing_output_dir_is_rejected() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "key")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "OUTPUT_DIR"));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "   "),
            ("OUTPUT_DIR", "/tmp/out"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "GEMINI_API_KEY"));
    }

    #[test]
    fn empty_output_dir_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("OUTPUT_DIR", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "OUTPUT_DIR"));
    }

    #[test]
    fn tilde_prefix_expands_against_home() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("OUTPUT_DIR", "~/images"),
            ("HOME", "/home/tester"),
        ]))
        .unwrap();

        assert_eq!(config.output_dir.to_str().unwrap(), "/home/tester/images");
    }

    #[test]
    fn bare_tilde_expands_to_home() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("OUTPUT_DIR", "~"),
            ("HOME", "/home/tester"),
        ]))
        .unwrap();

        assert_eq!(config.output_dir.to_str().unwrap(), "/home/tester");
    }

    #[test]
    fn relative_output_dir_becomes_absolute() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("OUTPUT_DIR", "generated/images"),
        ]))
        .unwrap();

        assert!(config.output_dir.is_absolute());
        assert!(config.output_dir.ends_with("generated/images"));
    }

    #[test]
    fn model_override_is_used() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("GEMINI_IMAGE_MODEL", "gemini-3.0-image-preview"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-3.0-image-preview");
    }

    #[test]
    fn empty_model_override_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("GEMINI_IMAGE_MODEL", ""),
        ]))
        .unwrap();

        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn config_is_cloneable() {
        let config = Config {
            api_key: "key".to_string(),
            output_dir: "/tmp/out".into(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
        };

        let cloned = config.clone();
        assert_eq!(config.api_key, cloned.api_key);
        assert_eq!(config.output_dir, cloned.output_dir);
        assert_eq!(config.model, cloned.model);
    }
}

/// Property-based tests over the loading seam.
#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating plausible API keys
    fn api_key_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{20,40}".prop_map(|s| s)
    }

    /// Strategy for generating model identifiers
    fn model_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9.-]{3,40}".prop_map(|s| s)
    }

    /// Strategy for generating absolute output directories
    fn output_dir_strategy() -> impl Strategy<Value = String> {
        "(/[a-z][a-z0-9_-]{0,11}){1,4}".prop_map(|s| s)
    }

    proptest! {
        /// Any non-empty API key is preserved exactly.
        #[test]
        fn api_key_is_preserved(api_key in api_key_strategy(), dir in output_dir_strategy()) {
            let vars = [
                ("GEMINI_API_KEY", api_key.as_str()),
                ("OUTPUT_DIR", dir.as_str()),
            ];
            let config = Config::from_lookup(lookup(&vars)).unwrap();
            prop_assert_eq!(config.api_key, api_key);
        }

        /// An absolute output directory is preserved exactly.
        #[test]
        fn absolute_output_dir_is_preserved(api_key in api_key_strategy(), dir in output_dir_strategy()) {
            let vars = [
                ("GEMINI_API_KEY", api_key.as_str()),
                ("OUTPUT_DIR", dir.as_str()),
            ];
            let config = Config::from_lookup(lookup(&vars)).unwrap();
            prop_assert_eq!(config.output_dir.to_str().unwrap(), dir.as_str());
            prop_assert!(config.output_dir.is_absolute());
        }

        /// Any non-empty model override is preserved exactly.
        #[test]
        fn model_override_is_preserved(
            api_key in api_key_strategy(),
            dir in output_dir_strategy(),
            model in model_strategy()
        ) {
            let vars = [
                ("GEMINI_API_KEY", api_key.as_str()),
                ("OUTPUT_DIR", dir.as_str()),
                ("GEMINI_IMAGE_MODEL", model.as_str()),
            ];
            let config = Config::from_lookup(lookup(&vars)).unwrap();
            prop_assert_eq!(config.model, model);
        }
    }
}
