// Data-driven engine configuration.
//
// Every tunable the engine reads (the harmony rule table and the guitar
// scoring weights) can be supplied as JSON. Missing sections and fields fall
// back to the built-in defaults, so a config file only needs to name what it
// changes:
//
//   { "rules": { "params": { "history_size": 16 } } }
//
// The one exception is a difficulty template: its defaults depend on the
// difficulty, so a template that is named must be given in full.
//
// Loaded configs are validated before use so the generator's totality
// guarantees hold for custom tables too. The built-in defaults always pass.

use crate::error::FretwiseError;
use crate::guitar::GuitarWeights;
use crate::harmony::{CadenceKind, Difficulty, HarmonyRules, ScaleDegree, is_valid_degree};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: HarmonyRules,
    pub guitar: GuitarWeights,
}

impl EngineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, FretwiseError> {
        let data = std::fs::read_to_string(path).map_err(|source| FretwiseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&data)?;
        debug!("loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, FretwiseError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the generator relies on.
    pub fn validate(&self) -> Result<(), FretwiseError> {
        let rules = &self.rules;

        for (name, pool) in [
            ("tonic", &rules.pools.tonic),
            ("predominant", &rules.pools.predominant),
            ("dominant", &rules.pools.dominant),
        ] {
            check_degrees(&format!("{name} pool"), pool)?;
        }

        for difficulty in Difficulty::ALL {
            let template = rules.template(difficulty);
            if template.min_length == 0 || template.min_length > template.max_length {
                return Err(invalid(format!(
                    "{difficulty} template length {}..{} is not a non-empty range",
                    template.min_length, template.max_length
                )));
            }
            if template.functions.is_empty() {
                return Err(invalid(format!("{difficulty} template has no functions")));
            }
        }

        for cadence in &rules.cadences {
            check_degrees(&format!("{:?} cadence", cadence.kind), &cadence.degrees)?;
        }
        let has_authentic = rules
            .cadence(CadenceKind::Authentic)
            .is_some_and(|c| Difficulty::ALL.iter().all(|&d| c.allows(d)));
        if !has_authentic {
            return Err(invalid(
                "an authentic cadence allowed at every difficulty is required".to_string(),
            ));
        }

        let params = &rules.params;
        if params.history_size == 0 {
            return Err(invalid("history_size must be at least 1".to_string()));
        }
        if params.max_attempts == 0 {
            return Err(invalid("max_attempts must be at least 1".to_string()));
        }
        for (name, p) in [
            ("repeat_probability", params.repeat_probability),
            ("deceptive_probability", params.deceptive_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{name} {p} is outside [0, 1]")));
            }
        }

        // A NaN weight would make every shape comparison false.
        let g = &self.guitar;
        for (name, w) in [
            ("chord_tone", g.chord_tone),
            ("sounding_string", g.sounding_string),
            ("root_in_bass", g.root_in_bass),
            ("third_present", g.third_present),
            ("third_missing", g.third_missing),
            ("perfect_fifth", g.perfect_fifth),
            ("altered_fifth", g.altered_fifth),
            ("seventh", g.seventh),
            ("wide_span", g.wide_span),
            ("fret_height", g.fret_height),
            ("open_string", g.open_string),
            ("missing_extension", g.missing_extension),
        ] {
            if !w.is_finite() {
                return Err(invalid(format!("guitar weight {name} {w} is not finite")));
            }
        }

        Ok(())
    }
}

fn check_degrees(what: &str, degrees: &[ScaleDegree]) -> Result<(), FretwiseError> {
    if degrees.is_empty() {
        return Err(invalid(format!("{what} is empty")));
    }
    if let Some(bad) = degrees.iter().find(|&&d| !is_valid_degree(d)) {
        return Err(invalid(format!("{what} contains degree {bad} outside 1-7")));
    }
    Ok(())
}

fn invalid(message: String) -> FretwiseError {
    FretwiseError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config =
            EngineConfig::from_json_str(r#"{ "rules": { "params": { "history_size": 16 } } }"#)
                .unwrap();
        let defaults = HarmonyRules::default();
        assert_eq!(config.rules.params.history_size, 16);
        assert_eq!(config.rules.params.max_attempts, defaults.params.max_attempts);
        assert_eq!(
            config.rules.params.deceptive_probability,
            defaults.params.deceptive_probability
        );
        assert_eq!(config.rules.pools, defaults.pools);
        assert_eq!(config.guitar, GuitarWeights::default());
    }

    #[test]
    fn partial_sections_keep_sibling_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "rules": { "pools": { "tonic": [1, 6] } }, "guitar": { "open_string": 2.0 } }"#,
        )
        .unwrap();
        let defaults = HarmonyRules::default();
        assert_eq!(config.rules.pools.tonic, vec![1, 6]);
        assert_eq!(config.rules.pools.predominant, defaults.pools.predominant);
        assert_eq!(config.rules.pools.dominant, defaults.pools.dominant);
        assert_eq!(config.guitar.open_string, 2.0);
        assert_eq!(config.guitar.chord_tone, GuitarWeights::default().chord_tone);
    }

    #[test]
    fn named_template_replaces_only_that_difficulty() {
        let config = EngineConfig::from_json_str(
            r#"{ "rules": { "templates": { "easy": { "min_length": 4, "max_length": 4,
                 "functions": ["tonic", "predominant", "dominant", "tonic"],
                 "allow_repeats": false, "allow_deceptive": false } } } }"#,
        )
        .unwrap();
        let defaults = HarmonyRules::default();
        assert_eq!(config.rules.templates.easy.min_length, 4);
        assert_eq!(config.rules.templates.medium, defaults.templates.medium);
        assert_eq!(config.rules.templates.hard, defaults.templates.hard);
    }

    #[test]
    fn partial_template_is_a_parse_error() {
        let err = EngineConfig::from_json_str(
            r#"{ "rules": { "templates": { "hard": { "max_length": 6 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, FretwiseError::Json(_)), "{err}");
    }

    #[test]
    fn rejects_non_finite_guitar_weights() {
        let mut config = EngineConfig::default();
        config.guitar.third_missing = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("third_missing"), "{err}");

        config.guitar.third_missing = -12.0;
        config.guitar.fret_height = f64::NEG_INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn rejects_out_of_range_degrees() {
        let err = EngineConfig::from_json_str(
            r#"{ "rules": { "pools": { "tonic": [1, 8], "predominant": [2, 4], "dominant": [5, 7] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, FretwiseError::InvalidConfig(_)), "{err}");
        assert!(err.to_string().contains("degree 8"));
    }

    #[test]
    fn rejects_inverted_template() {
        let mut config = EngineConfig::default();
        config.rules.templates.hard.min_length = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn requires_authentic_cadence() {
        let mut config = EngineConfig::default();
        config.rules.cadences.retain(|c| c.kind != CadenceKind::Authentic);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("authentic"));
    }

    #[test]
    fn rejects_bad_probability() {
        let mut config = EngineConfig::default();
        config.rules.params.deceptive_probability = 1.5;
        assert!(config.validate().is_err());
        config.rules.params.deceptive_probability = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, FretwiseError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/fretwise.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fretwise.json"));
    }
}
