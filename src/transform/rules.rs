// src/transform/rules.rs
// =============================================================================
// The stability rule table.
//
// Each rule is a pair of plain functions:
// - applies: does the document have the shape this rule knows about?
// - extract: read the stability value out of that shape
//
// Rules are checked top to bottom and the FIRST rule that applies decides.
// If its extractor cannot read a value (wrong types, empty arrays, ...) the
// result is UnrecognizedSchema, which the Transformer turns into Unknown.
// Later rules are not consulted in that case: a document with a `modules`
// section is judged by that section alone.
// =============================================================================

use super::Stability;
use crate::error::TransformError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything a rule gets to look at.
pub struct RuleInput<'a> {
    /// Module name, as derived from the task address
    pub name: &'a str,
    /// The parsed module document
    pub doc: &'a Value,
    /// Name -> stability overrides from the configuration
    pub overrides: &'a BTreeMap<String, Stability>,
}

/// One entry of the rule table.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&RuleInput<'_>) -> bool,
    pub extract: fn(&RuleInput<'_>) -> Result<Stability, TransformError>,
}

/// The rule table, in priority order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "override",
        applies: |input| input.overrides.contains_key(input.name),
        extract: |input| {
            input
                .overrides
                .get(input.name)
                .copied()
                .ok_or(TransformError::UnrecognizedSchema)
        },
    },
    Rule {
        name: "modules",
        applies: |input| input.doc.get("modules").is_some(),
        extract: |input| first_stability(input.doc, "modules"),
    },
    Rule {
        name: "stability",
        applies: |input| input.doc.get("stability").is_some(),
        extract: |input| read_stability(input.doc),
    },
    Rule {
        name: "miscs",
        applies: |input| input.doc.get("miscs").is_some(),
        // Some misc pages keep the marker one section further down
        extract: |input| {
            first_stability(input.doc, "miscs").or_else(|_| {
                first_entry(input.doc, "miscs")
                    .ok_or(TransformError::UnrecognizedSchema)
                    .and_then(|misc| first_stability(misc, "miscs"))
            })
        },
    },
    Rule {
        name: "globals",
        applies: |input| input.doc.get("globals").is_some(),
        extract: |input| first_stability(input.doc, "globals"),
    },
];

// `doc[key][0]`, if `doc[key]` is a non-empty array
fn first_entry<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get(key)?.as_array()?.first()
}

// `doc[key][0].stability`
fn first_stability(doc: &Value, key: &str) -> Result<Stability, TransformError> {
    first_entry(doc, key)
        .ok_or(TransformError::UnrecognizedSchema)
        .and_then(read_stability)
}

// `section.stability`
fn read_stability(section: &Value) -> Result<Stability, TransformError> {
    section
        .get("stability")
        .and_then(Stability::from_json)
        .ok_or(TransformError::UnrecognizedSchema)
}
