//! Deep merging of plain documents.
//!
//! Merging is used to layer configurations, e.g. a base configuration with environment-specific overrides
//! on top. The rules are as follows:
//!
//! - If both documents have an object at a certain key, the objects are merged recursively.
//! - Otherwise, the override value replaces the base value wholly. This includes replacing a scalar
//!   with an object, an object with a scalar, or an object with `null`.
//! - Arrays are never merged element-wise; an override array fully replaces the base array.
//!
//! # Examples
//!
//! ```
//! use garlic_config::merge;
//! use serde_json::json;
//!
//! let base = json!({ "server": { "port": 8080, "hosts": ["a", "b"] }, "debug": true });
//! let overrides = json!({ "server": { "hosts": ["c"] }, "debug": false });
//! let merged = merge(&base, &overrides)?;
//! assert_eq!(
//!     merged,
//!     json!({ "server": { "port": 8080, "hosts": ["c"] }, "debug": false })
//! );
//! # anyhow::Ok(())
//! ```

use std::fmt;

use crate::value::{describe_plain, JsonObject};

/// Operand of a merge operation that has failed type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MergeOperand {
    /// Base document.
    Base,
    /// Override document.
    Override,
    /// Layer with the specified 0-based index.
    Layer(usize),
}

impl fmt::Display for MergeOperand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => formatter.write_str("base document"),
            Self::Override => formatter.write_str("override document"),
            Self::Layer(idx) => write!(formatter, "layer #{idx}"),
        }
    }
}

/// Error merging plain documents: one of the operands is not an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeError {
    operand: MergeOperand,
    actual: String,
}

impl fmt::Display for MergeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "expected an object for {}, got {}",
            self.operand, self.actual
        )
    }
}

impl std::error::Error for MergeError {}

impl MergeError {
    fn new(operand: MergeOperand, actual: &serde_json::Value) -> Self {
        Self {
            operand,
            actual: describe_plain(actual),
        }
    }

    /// Returns the operand that has failed type checks.
    pub fn operand(&self) -> MergeOperand {
        self.operand
    }
}

/// Deep-merges two plain documents. Neither of the inputs is mutated.
///
/// See the [module docs](self) for the merging rules.
///
/// # Errors
///
/// Returns an error if either of the documents is not an object.
pub fn merge(
    base: &serde_json::Value,
    overrides: &serde_json::Value,
) -> Result<serde_json::Value, MergeError> {
    let serde_json::Value::Object(base) = base else {
        return Err(MergeError::new(MergeOperand::Base, base));
    };
    let serde_json::Value::Object(overrides) = overrides else {
        return Err(MergeError::new(MergeOperand::Override, overrides));
    };

    let mut merged = base.clone();
    deep_merge(&mut merged, overrides.clone());
    Ok(merged.into())
}

/// Deep-merges a sequence of plain documents in order; later layers take precedence over earlier ones.
/// An empty sequence produces an empty object.
///
/// # Errors
///
/// Returns an error if any of the layers is not an object.
pub fn merge_layers<'a>(
    layers: impl IntoIterator<Item = &'a serde_json::Value>,
) -> Result<serde_json::Value, MergeError> {
    let mut merged = JsonObject::new();
    let mut layer_count = 0;
    for (i, layer) in layers.into_iter().enumerate() {
        let serde_json::Value::Object(layer) = layer else {
            return Err(MergeError::new(MergeOperand::Layer(i), layer));
        };
        deep_merge(&mut merged, layer.clone());
        layer_count += 1;
    }
    tracing::debug!(layer_count, keys = merged.len(), "Merged document layers");
    Ok(merged.into())
}

fn deep_merge(dest: &mut JsonObject, src: JsonObject) {
    for (key, value) in src {
        if let Some(existing) = dest.get_mut(&key) {
            if let Some(existing_map) = existing.as_object_mut() {
                if let serde_json::Value::Object(value) = value {
                    deep_merge(existing_map, value);
                } else {
                    *existing = value;
                }
            } else {
                *existing = value;
            }
        } else {
            dest.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn override_wins_for_scalars() {
        let merged = merge(&json!({ "x": 1 }), &json!({ "x": 2 })).unwrap();
        assert_eq!(merged, json!({ "x": 2 }));
    }

    #[test]
    fn nested_objects_are_merged() {
        let merged = merge(&json!({ "s": { "a": 1 } }), &json!({ "s": { "b": 2 } })).unwrap();
        assert_eq!(merged, json!({ "s": { "a": 1, "b": 2 } }));
    }

    #[test]
    fn arrays_are_replaced() {
        let merged = merge(&json!({ "n": [1, 2] }), &json!({ "n": [3] })).unwrap();
        assert_eq!(merged, json!({ "n": [3] }));
    }

    #[test]
    fn override_wins_where_structures_diverge() {
        let base = json!({ "a": 1, "b": { "c": true }, "d": [1], "e": { "f": 1 } });
        let overrides = json!({ "a": { "nested": 1 }, "b": "text", "d": { "x": 1 }, "e": null });
        let merged = merge(&base, &overrides).unwrap();
        assert_eq!(
            merged,
            json!({ "a": { "nested": 1 }, "b": "text", "d": { "x": 1 }, "e": null })
        );
    }

    #[test]
    fn new_keys_are_added() {
        let merged = merge(&json!({}), &json!({ "a": { "b": 1 } })).unwrap();
        assert_eq!(merged, json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn merging_non_objects() {
        let err = merge(&json!([1]), &json!({})).unwrap_err();
        assert_eq!(err.operand(), MergeOperand::Base);
        assert_eq!(err.to_string(), "expected an object for base document, got array");

        let err = merge(&json!({}), &json!("test")).unwrap_err();
        assert_eq!(err.operand(), MergeOperand::Override);

        let err = merge_layers(&[json!({}), json!(1)]).unwrap_err();
        assert_matches!(err.operand(), MergeOperand::Layer(1));
    }

    #[test]
    fn merging_layers() {
        let layers = [
            json!({ "a": 1, "s": { "x": 1 } }),
            json!({ "s": { "y": 2 } }),
            json!({ "a": 3 }),
        ];
        let merged = merge_layers(&layers).unwrap();
        assert_eq!(merged, json!({ "a": 3, "s": { "x": 1, "y": 2 } }));

        assert_eq!(merge_layers([]).unwrap(), json!({}));
    }

    fn arb_document() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            "[a-z]{0,5}".prop_map(serde_json::Value::from),
        ];
        let value = leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
                prop::collection::btree_map("[a-c]", inner, 0..4)
                    .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("[a-d]", value, 0..5)
            .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
    }

    fn assert_contains(merged: &serde_json::Value, overrides: &serde_json::Value) {
        let serde_json::Value::Object(overrides) = overrides else {
            unreachable!();
        };
        for (key, value) in overrides {
            let merged_value = &merged[key];
            if let serde_json::Value::Object(_) = value {
                assert_contains(merged_value, value);
            } else {
                assert_eq!(merged_value, value);
            }
        }
    }

    proptest! {
        #[test]
        fn merge_does_not_mutate_inputs(base in arb_document(), overrides in arb_document()) {
            let (base_copy, overrides_copy) = (base.clone(), overrides.clone());
            merge(&base, &overrides).unwrap();
            prop_assert_eq!(base, base_copy);
            prop_assert_eq!(overrides, overrides_copy);
        }

        #[test]
        fn merged_document_contains_overrides(base in arb_document(), overrides in arb_document()) {
            let merged = merge(&base, &overrides).unwrap();
            assert_contains(&merged, &overrides);
        }

        #[test]
        fn merging_with_empty_document(document in arb_document()) {
            let empty = serde_json::json!({});
            prop_assert_eq!(merge(&document, &empty).unwrap(), document.clone());
            prop_assert_eq!(merge(&empty, &document).unwrap(), document);
        }

        #[test]
        fn merging_is_idempotent(document in arb_document()) {
            prop_assert_eq!(merge(&document, &document).unwrap(), document);
        }
    }
}
