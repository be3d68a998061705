//! Shell parameter resolution.
//!
//! A parameter value is either used verbatim or, when the *whole* value is
//! `${key}`, replaced by the value `key` resolves to through the step's
//! [`ValueLookup`]. Embedded references such as `v${key}` are not
//! interpolated.
//!
//! # Example
//!
//! ```
//! use shell_step::steps::{resolve_parameters, ParamValue};
//! use std::collections::BTreeMap;
//!
//! assert_eq!(ParamValue::parse("${version}"), ParamValue::Reference("version".into()));
//! assert_eq!(ParamValue::parse("v${version}"), ParamValue::Literal("v${version}".into()));
//!
//! let lookup = |key: &str| (key == "version").then(|| serde_yaml::Value::from("1.2.0"));
//! let raw = BTreeMap::from([("VERSION".to_string(), "${version}".to_string())]);
//! let resolved = resolve_parameters(&raw, &lookup).unwrap();
//! assert_eq!(resolved["VERSION"], "1.2.0");
//! ```

use crate::config::lookup::ValueLookup;
use crate::error::{Result, ShellStepError};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Whole-string `${key}` reference.
static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{(?P<key>\S+)\}$").expect("REFERENCE_REGEX must compile")
});

/// Parameter name to final value.
pub type ResolvedParameters = BTreeMap<String, String>;

/// A raw parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Used as-is.
    Literal(String),
    /// Looked up by key: `${key}`.
    Reference(String),
}

impl ParamValue {
    /// Classify a raw parameter value.
    pub fn parse(raw: &str) -> Self {
        match REFERENCE_REGEX.captures(raw) {
            Some(caps) => ParamValue::Reference(caps["key"].to_string()),
            None => ParamValue::Literal(raw.to_string()),
        }
    }

    /// Produce the final value for parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedParameter` if a reference resolves to nothing.
    pub fn resolve(self, name: &str, lookup: &dyn ValueLookup) -> Result<String> {
        match self {
            ParamValue::Literal(value) => Ok(value),
            ParamValue::Reference(key) => {
                lookup
                    .get_string(&key)
                    .ok_or(ShellStepError::UnresolvedParameter {
                        parameter: name.to_string(),
                        key,
                    })
            }
        }
    }
}

/// Resolve every raw parameter.
///
/// Every input name appears in the output, or the whole resolution fails on
/// the first unresolved reference.
pub fn resolve_parameters(
    raw: &BTreeMap<String, String>,
    lookup: &dyn ValueLookup,
) -> Result<ResolvedParameters> {
    raw.iter()
        .map(|(name, value)| {
            let resolved = ParamValue::parse(value).resolve(name, lookup)?;
            tracing::debug!("Resolved parameter {}", name);
            Ok((name.clone(), resolved))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn empty_lookup(_: &str) -> Option<Value> {
        None
    }

    #[test]
    fn parse_whole_reference() {
        assert_eq!(
            ParamValue::parse("${app-version}"),
            ParamValue::Reference("app-version".to_string())
        );
    }

    #[test]
    fn parse_embedded_reference_is_literal() {
        assert_eq!(
            ParamValue::parse("prefix-${key}"),
            ParamValue::Literal("prefix-${key}".to_string())
        );
        assert_eq!(
            ParamValue::parse("${key}-suffix"),
            ParamValue::Literal("${key}-suffix".to_string())
        );
    }

    #[test]
    fn parse_rejects_empty_and_whitespace_keys() {
        assert!(matches!(ParamValue::parse("${}"), ParamValue::Literal(_)));
        assert!(matches!(ParamValue::parse("${a b}"), ParamValue::Literal(_)));
    }

    #[test]
    fn parse_plain_values_are_literal() {
        assert_eq!(
            ParamValue::parse("hello"),
            ParamValue::Literal("hello".to_string())
        );
        assert_eq!(ParamValue::parse("$HOME"), ParamValue::Literal("$HOME".to_string()));
    }

    #[test]
    fn literals_pass_through_verbatim() {
        let raw = params(&[("A", "one"), ("B", "  spaced  "), ("C", "")]);
        let resolved = resolve_parameters(&raw, &empty_lookup).unwrap();
        assert_eq!(resolved, raw);
    }

    #[test]
    fn references_use_looked_up_value() {
        let lookup = |key: &str| match key {
            "image-tag" => Some(Value::String("app:1.2".to_string())),
            "replicas" => Some(Value::from(3)),
            _ => None,
        };
        let raw = params(&[("TAG", "${image-tag}"), ("COUNT", "${replicas}"), ("X", "x")]);

        let resolved = resolve_parameters(&raw, &lookup).unwrap();

        assert_eq!(resolved["TAG"], "app:1.2");
        assert_eq!(resolved["COUNT"], "3");
        assert_eq!(resolved["X"], "x");
    }

    #[test]
    fn unresolved_reference_names_parameter_and_key() {
        let raw = params(&[("TAG", "${missing-key}")]);

        let err = resolve_parameters(&raw, &empty_lookup).unwrap_err();

        match err {
            ShellStepError::UnresolvedParameter { parameter, key } => {
                assert_eq!(parameter, "TAG");
                assert_eq!(key, "missing-key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_lookup_counts_as_unresolved() {
        let lookup = |_: &str| Some(Value::Null);
        let raw = params(&[("TAG", "${k}")]);
        assert!(resolve_parameters(&raw, &lookup).is_err());
    }
}
