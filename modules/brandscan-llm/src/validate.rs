//! Generic JSON repair/validation engine (C10). Per-key field shape lives in
//! a [`ValidationSpec`] the caller (the Analyzer) supplies; this module only
//! knows how to repair near-JSON text, coerce/clamp numbers, truncate
//! oversize strings, and prune invalid array items — the same operations
//! regardless of which of the six schemas is being validated.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// A numeric field (by key name, wherever it's nested) to coerce from a
/// stringified number and clamp into `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub name: &'static str,
    pub min: i64,
    pub max: i64,
}

/// A string field (by key name) to truncate to `max_chars`.
#[derive(Debug, Clone, Copy)]
pub struct StringLenField {
    pub name: &'static str,
    pub max_chars: usize,
}

/// A top-level array field whose items are pruned when they're missing any
/// of `item_required_fields`, and which fails validation altogether if
/// fewer than `min_items` survive.
#[derive(Debug, Clone, Copy)]
pub struct ArrayField {
    pub name: &'static str,
    pub min_items: usize,
    pub item_required_fields: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSpec {
    pub numeric_fields: &'static [NumericField],
    pub string_len_fields: &'static [StringLenField],
    pub array_fields: &'static [ArrayField],
}

static TRAILING_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Step 2: string-level repairs for the common ways an LLM's near-JSON
/// deviates from strict JSON — single quotes used as string delimiters, a
/// trailing comma before a closing brace or bracket.
pub fn repair_json_syntax(raw: &str) -> String {
    let single_quotes_fixed = raw.replace('\'', "\"");
    TRAILING_COMMA_RE.replace_all(&single_quotes_fixed, "$1").to_string()
}

/// Parses `raw` as JSON, retrying once with [`repair_json_syntax`] if the
/// first parse fails.
pub fn parse_with_repair(raw: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_str(&repair_json_syntax(raw)),
    }
}

/// Step 3/4: numeric coercion/clamping, string truncation, and array-item
/// pruning, applied recursively regardless of nesting depth. Returns
/// `false` when pruning left any `ArrayField` below its `min_items` floor —
/// the caller should treat that as a validation failure.
pub fn coerce_and_prune(value: &mut Value, spec: &ValidationSpec) -> bool {
    walk_numeric_and_string_fields(value, spec);
    prune_arrays(value, spec)
}

fn walk_numeric_and_string_fields(value: &mut Value, spec: &ValidationSpec) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if let Some(field) = spec.numeric_fields.iter().find(|f| f.name == key) {
                    coerce_and_clamp_number(v, field);
                }
                if let Some(field) = spec.string_len_fields.iter().find(|f| f.name == key) {
                    truncate_string(v, field.max_chars);
                }
                walk_numeric_and_string_fields(v, spec);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                walk_numeric_and_string_fields(item, spec);
            }
        }
        _ => {}
    }
}

fn coerce_and_clamp_number(value: &mut Value, field: &NumericField) {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if let Some(n) = parsed {
        let clamped = n.clamp(field.min, field.max);
        *value = Value::Number(clamped.into());
    }
}

fn truncate_string(value: &mut Value, max_chars: usize) {
    if let Value::String(s) = value {
        if s.chars().count() > max_chars {
            *s = s.chars().take(max_chars).collect();
        }
    }
}

fn prune_arrays(value: &mut Value, spec: &ValidationSpec) -> bool {
    let Value::Object(map) = value else { return true };
    for field in spec.array_fields {
        let Some(Value::Array(items)) = map.get_mut(field.name) else {
            continue;
        };
        items.retain(|item| item_has_required_fields(item, field.item_required_fields));
        if items.len() < field.min_items {
            return false;
        }
    }
    true
}

fn item_has_required_fields(item: &Value, required: &[&str]) -> bool {
    let Value::Object(map) = item else { return false };
    required.iter().all(|f| map.contains_key(*f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_single_quotes_and_trailing_commas() {
        let raw = "{'a': 1, 'b': [1, 2,],}";
        let repaired = repair_json_syntax(raw);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], serde_json::json!([1, 2]));
    }

    #[test]
    fn parse_with_repair_falls_back_on_malformed_input() {
        let raw = r#"{"confidence": "92",}"#;
        let value = parse_with_repair(raw).unwrap();
        assert_eq!(value["confidence"], "92");
    }

    #[test]
    fn coerces_stringified_confidence_and_clamps_range() {
        let mut value = serde_json::json!({"confidence": "150"});
        let spec = ValidationSpec {
            numeric_fields: &[NumericField { name: "confidence", min: 0, max: 100 }],
            ..Default::default()
        };
        coerce_and_prune(&mut value, &spec);
        assert_eq!(value["confidence"], 100);
    }

    #[test]
    fn coerces_nested_confidence_fields() {
        let mut value = serde_json::json!({
            "primary_tone": {"tone": "playful", "confidence": "-5"}
        });
        let spec = ValidationSpec {
            numeric_fields: &[NumericField { name: "confidence", min: 0, max: 100 }],
            ..Default::default()
        };
        coerce_and_prune(&mut value, &spec);
        assert_eq!(value["primary_tone"]["confidence"], 0);
    }

    #[test]
    fn truncates_oversize_strings() {
        let mut value = serde_json::json!({"message": "x".repeat(300)});
        let spec = ValidationSpec {
            string_len_fields: &[StringLenField { name: "message", max_chars: 200 }],
            ..Default::default()
        };
        coerce_and_prune(&mut value, &spec);
        assert_eq!(value["message"].as_str().unwrap().len(), 200);
    }

    #[test]
    fn prunes_invalid_array_items_and_keeps_valid_ones() {
        let mut value = serde_json::json!({
            "themes": [
                {"theme": "Reliability", "description": "x", "evidence_quotes": ["q"], "confidence": 80},
                {"theme": "Missing fields"},
            ]
        });
        let spec = ValidationSpec {
            array_fields: &[ArrayField {
                name: "themes",
                min_items: 1,
                item_required_fields: &["theme", "description", "evidence_quotes", "confidence"],
            }],
            ..Default::default()
        };
        let ok = coerce_and_prune(&mut value, &spec);
        assert!(ok);
        assert_eq!(value["themes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn fails_when_pruning_drops_below_minimum() {
        let mut value = serde_json::json!({"themes": [{"theme": "only a name"}]});
        let spec = ValidationSpec {
            array_fields: &[ArrayField {
                name: "themes",
                min_items: 1,
                item_required_fields: &["theme", "description"],
            }],
            ..Default::default()
        };
        assert!(!coerce_and_prune(&mut value, &spec));
    }
}
