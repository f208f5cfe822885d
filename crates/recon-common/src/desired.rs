//! Desired-State Descriptor.
//!
//! Each plugin declares a static [`ParamSchema`]: the closed set of keys it
//! accepts, their kinds and defaults, and the combination rules between
//! them. [`DesiredState::from_params`] validates caller input against the
//! schema once; the resulting record is never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, ReconResult};
use crate::fields::FieldValues;

/// Name of the parameter carrying the requested operation.
pub const STATE_PARAM: &str = "state";

/// Requested end state for a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// The resource should exist.
    #[default]
    Present,
    /// The resource should not exist.
    Absent,
}

impl Operation {
    /// Returns the operation token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Present => "present",
            Operation::Absent => "absent",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Operation::Present),
            "absent" => Ok(Operation::Absent),
            other => Err(ReconError::validation(
                STATE_PARAM,
                format!("must be one of: present, absent (got '{}')", other),
            )),
        }
    }
}

/// Value kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free-form string.
    Str,
    /// Signed integer.
    Int,
    /// One of a fixed set of tokens.
    Choice(&'static [&'static str]),
}

/// Declaration of one accepted parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: &'static str,
    /// Value kind.
    pub kind: ParamKind,
    /// Whether the caller must supply a value.
    pub required: bool,
    /// Value used when the caller supplies none.
    pub default: Option<&'static str>,
    /// Whether the value must be kept out of logs.
    pub secret: bool,
}

impl ParamSpec {
    /// Declares an optional string parameter.
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Str,
            required: false,
            default: None,
            secret: false,
        }
    }

    /// Declares an optional integer parameter.
    pub const fn int(name: &'static str) -> Self {
        Self {
            kind: ParamKind::Int,
            ..Self::string(name)
        }
    }

    /// Declares an optional choice parameter.
    pub const fn choice(name: &'static str, choices: &'static [&'static str]) -> Self {
        Self {
            kind: ParamKind::Choice(choices),
            ..Self::string(name)
        }
    }

    /// Marks the parameter as required.
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Sets the default value.
    pub const fn default_value(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    /// Marks the parameter as secret.
    pub const fn secret(self) -> Self {
        Self {
            secret: true,
            ..self
        }
    }

    /// The standard `state` parameter (present|absent, default present).
    pub const fn state() -> Self {
        Self::choice(STATE_PARAM, &["present", "absent"]).default_value("present")
    }
}

/// Conditional requirement: when `field == value`, every key in `requires`
/// must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredIf {
    /// Parameter whose value triggers the rule.
    pub field: &'static str,
    /// Triggering value.
    pub value: &'static str,
    /// Parameters required when triggered.
    pub requires: &'static [&'static str],
}

/// Closed parameter set of one plugin.
#[derive(Debug)]
pub struct ParamSchema {
    /// Plugin name, used in messages.
    pub plugin: &'static str,
    /// Accepted parameters.
    pub params: &'static [ParamSpec],
    /// Groups that must be supplied all together or not at all.
    pub required_together: &'static [&'static [&'static str]],
    /// Conditional requirements.
    pub required_if: &'static [RequiredIf],
}

impl ParamSchema {
    /// Looks up a parameter declaration.
    pub fn spec(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Validated, immutable desired state of one resource.
#[derive(Clone)]
pub struct DesiredState {
    schema: &'static ParamSchema,
    values: BTreeMap<&'static str, String>,
}

impl DesiredState {
    /// Validates caller parameters against `schema`.
    ///
    /// Empty values are treated as not supplied. Defaults are applied before
    /// the combination rules are checked.
    pub fn from_params(schema: &'static ParamSchema, params: FieldValues) -> ReconResult<Self> {
        let mut values = BTreeMap::new();

        for (key, value) in params {
            let spec = schema.spec(&key).ok_or_else(|| {
                ReconError::validation(
                    key.as_str(),
                    format!("unsupported parameter for {}", schema.plugin),
                )
            })?;
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            if values.insert(spec.name, value).is_some() {
                return Err(ReconError::validation(spec.name, "given more than once"));
            }
        }

        for spec in schema.params {
            if !values.contains_key(spec.name) {
                match spec.default {
                    Some(default) => {
                        values.insert(spec.name, default.to_string());
                    }
                    None if spec.required => {
                        return Err(ReconError::validation(spec.name, "is required"));
                    }
                    None => {}
                }
            }
        }

        for (name, value) in &values {
            if let Some(spec) = schema.spec(name) {
                check_kind(spec, value)?;
            }
        }

        for group in schema.required_together {
            let given = group.iter().filter(|k| values.contains_key(**k)).count();
            if given > 0 && given < group.len() {
                let missing = group
                    .iter()
                    .find(|k| !values.contains_key(**k))
                    .copied()
                    .unwrap_or_default();
                return Err(ReconError::validation(
                    missing,
                    format!("must be given together with {}", group.join(", ")),
                ));
            }
        }

        for rule in schema.required_if {
            if values.get(rule.field).map(String::as_str) != Some(rule.value) {
                continue;
            }
            if let Some(missing) = rule.requires.iter().find(|k| !values.contains_key(**k)) {
                return Err(ReconError::validation(
                    *missing,
                    format!("is required when {} is {}", rule.field, rule.value),
                ));
            }
        }

        Ok(Self { schema, values })
    }

    /// Returns the plugin this state was validated for.
    pub fn plugin(&self) -> &'static str {
        self.schema.plugin
    }

    /// Gets a parameter value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Gets an integer parameter value.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Gets a parameter value, failing with a planning error when it is unset.
    pub fn require(&self, name: &str) -> ReconResult<&str> {
        self.get(name).ok_or_else(ReconError::missing_fields)
    }

    /// Checks if a parameter has a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the requested operation carried by the `state` parameter.
    pub fn operation(&self) -> Operation {
        match self.get(STATE_PARAM) {
            Some("absent") => Operation::Absent,
            _ => Operation::Present,
        }
    }

    /// Returns the parameters with secret values masked.
    pub fn redacted(&self) -> FieldValues {
        self.values
            .iter()
            .map(|(name, value)| {
                let secret = self.schema.spec(name).is_some_and(|s| s.secret);
                let shown = if secret { "********" } else { value.as_str() };
                (name.to_string(), shown.to_string())
            })
            .collect()
    }
}

impl fmt::Debug for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesiredState")
            .field("plugin", &self.schema.plugin)
            .field("values", &self.redacted())
            .finish()
    }
}

fn check_kind(spec: &ParamSpec, value: &str) -> ReconResult<()> {
    match spec.kind {
        ParamKind::Str => Ok(()),
        ParamKind::Int => value.parse::<i64>().map(|_| ()).map_err(|_| {
            ReconError::validation(
                spec.name,
                format!("expected an integer, got '{}'", value),
            )
        }),
        ParamKind::Choice(choices) if choices.contains(&value) => Ok(()),
        ParamKind::Choice(choices) => Err(ReconError::validation(
            spec.name,
            format!("must be one of: {} (got '{}')", choices.join(", "), value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_values;
    use pretty_assertions::assert_eq;

    static SCHEMA: ParamSchema = ParamSchema {
        plugin: "test_plugin",
        params: &[
            ParamSpec::state(),
            ParamSpec::string("name").required(),
            ParamSpec::choice("level", &["none", "readonly", "all"]).default_value("all"),
            ParamSpec::int("count"),
            ParamSpec::string("lif_a"),
            ParamSpec::string("lif_b"),
            ParamSpec::string("secret").secret(),
            ParamSpec::string("peer"),
        ],
        required_together: &[&["lif_a", "lif_b", "secret"]],
        required_if: &[RequiredIf {
            field: "state",
            value: "absent",
            requires: &["peer"],
        }],
    };

    #[test]
    fn test_defaults_applied() {
        let state = DesiredState::from_params(&SCHEMA, field_values! { "name" => "ops" }).unwrap();
        assert_eq!(state.get("level"), Some("all"));
        assert_eq!(state.operation(), Operation::Present);
        assert_eq!(state.plugin(), "test_plugin");
        assert!(!state.is_set("count"));
    }

    #[test]
    fn test_missing_required() {
        let err = DesiredState::from_params(&SCHEMA, Vec::new()).unwrap_err();
        assert_eq!(err, ReconError::validation("name", "is required"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "colour" => "blue" },
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::Validation { ref field, .. } if field == "colour"));
    }

    #[test]
    fn test_choice_and_int_checked() {
        let err = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "level" => "root" },
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be one of: none, readonly, all"));

        let err = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "count" => "ten" },
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected an integer"));

        let state = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "count" => "10" },
        )
        .unwrap();
        assert_eq!(state.get_int("count"), Some(10));
    }

    #[test]
    fn test_required_together() {
        let err = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "lif_a" => "1.2.3.4" },
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::Validation { ref field, .. } if field == "lif_b"));

        let state = DesiredState::from_params(
            &SCHEMA,
            field_values! {
                "name" => "ops",
                "lif_a" => "1.2.3.4",
                "lif_b" => "5.6.7.8",
                "secret" => "xyz",
            },
        );
        assert!(state.is_ok());
    }

    #[test]
    fn test_required_if() {
        let err = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "state" => "absent" },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReconError::validation("peer", "is required when state is absent")
        );

        let state = DesiredState::from_params(
            &SCHEMA,
            field_values! { "name" => "ops", "state" => "absent", "peer" => "east" },
        )
        .unwrap();
        assert_eq!(state.operation(), Operation::Absent);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let err = DesiredState::from_params(&SCHEMA, field_values! { "name" => "  " }).unwrap_err();
        assert_eq!(err, ReconError::validation("name", "is required"));
    }

    #[test]
    fn test_secret_redacted() {
        let state = DesiredState::from_params(
            &SCHEMA,
            field_values! {
                "name" => "ops",
                "lif_a" => "1.2.3.4",
                "lif_b" => "5.6.7.8",
                "secret" => "hunter2",
            },
        )
        .unwrap();
        let shown = format!("{:?}", state);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("********"));
        assert_eq!(state.get("secret"), Some("hunter2"));
    }

    #[test]
    fn test_operation_from_str() {
        assert_eq!("present".parse::<Operation>().unwrap(), Operation::Present);
        assert_eq!("absent".parse::<Operation>().unwrap(), Operation::Absent);
        assert!("gone".parse::<Operation>().is_err());
    }
}
