// src/transform/mod.rs
// =============================================================================
// This module turns one fetched module document into a ModuleRecord.
//
// The Node.js docs do not agree on where a module's stability lives. Some
// documents put it under `modules`, some at the top level, some under
// `miscs` (sometimes nested one level deeper), some under `globals`.
// The rules in rules.rs are tried in a fixed order and the first one whose
// shape matches decides. Nothing matching is not an error: the record just
// gets Stability::Unknown.
//
// Submodules:
// - rules: the ordered (predicate, extractor) rule table
// =============================================================================

mod rules;

use crate::error::TransformError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use rules::{Rule, RuleInput, RULES};

/// Stability classification of a module.
///
/// Ordering puts numbered levels first (ascending) and Unknown last, which
/// is also the order groups are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stability {
    /// Stability index as published in the docs (0 = deprecated ... 3 = legacy)
    Level(u32),
    /// No rule could find a stability value
    Unknown,
}

impl Stability {
    /// Reads a level out of a raw JSON value.
    ///
    /// Accepts integers, floats (truncated to the major level, so `1.1` is
    /// level 1) and strings holding either. Everything else is a miss.
    pub fn from_json(value: &Value) -> Option<Stability> {
        match value {
            Value::Number(n) => {
                if let Some(level) = n.as_u64() {
                    u32::try_from(level).ok().map(Stability::Level)
                } else {
                    n.as_f64().and_then(level_from_f64)
                }
            }
            Value::String(s) => s.parse::<Stability>().ok(),
            _ => None,
        }
    }
}

fn level_from_f64(value: f64) -> Option<Stability> {
    if value.is_finite() && value >= 0.0 && value < f64::from(u32::MAX) {
        Some(Stability::Level(value.trunc() as u32))
    } else {
        None
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stability::Level(level) => write!(f, "{}", level),
            Stability::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Stability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(Stability::Unknown);
        }
        if let Ok(level) = s.parse::<u32>() {
            return Ok(Stability::Level(level));
        }
        s.parse::<f64>()
            .ok()
            .and_then(level_from_f64)
            .ok_or_else(|| format!("'{}' is not a stability level", s))
    }
}

// Serialized as a string so it can be used as a JSON object key
impl Serialize for Stability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Stability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StabilityVisitor;

        impl<'de> Visitor<'de> for StabilityVisitor {
            type Value = Stability;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a stability level number or \"unknown\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Stability, E> {
                u32::try_from(v)
                    .map(Stability::Level)
                    .map_err(|_| E::custom(format!("stability level {} is too large", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Stability, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("stability level {} is negative", v)))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Stability, E> {
                level_from_f64(v).ok_or_else(|| E::custom(format!("invalid stability {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Stability, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(StabilityVisitor)
    }
}

/// One transformed module: its name and where it sits on the stability index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRecord {
    pub name: String,
    pub stability: Stability,
}

/// Turns module documents into records, consulting name overrides first.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    overrides: BTreeMap<String, Stability>,
}

impl Transformer {
    pub fn new(overrides: BTreeMap<String, Stability>) -> Self {
        Self { overrides }
    }

    /// Parses `content` as JSON and classifies it.
    ///
    /// Only non-JSON content fails. A document in none of the known shapes
    /// still yields a record with `Stability::Unknown`.
    pub fn transform(&self, name: &str, content: &str) -> Result<ModuleRecord, TransformError> {
        let doc: Value =
            serde_json::from_str(content).map_err(|e| TransformError::MalformedDocument {
                message: e.to_string(),
            })?;

        Ok(ModuleRecord {
            name: name.to_string(),
            stability: self.classify(name, &doc),
        })
    }

    /// Runs the rule table against an already-parsed document.
    pub fn classify(&self, name: &str, doc: &Value) -> Stability {
        let input = RuleInput {
            name,
            doc,
            overrides: &self.overrides,
        };

        let Some(rule) = RULES.iter().find(|rule| (rule.applies)(&input)) else {
            tracing::debug!(module = name, "no stability rule applies");
            return Stability::Unknown;
        };

        match (rule.extract)(&input) {
            Ok(stability) => stability,
            Err(err) => {
                tracing::debug!(module = name, rule = rule.name, %err, "stability field unreadable");
                Stability::Unknown
            }
        }
    }
}
