//! Variant resolver - turns a raw lookup payload into a [`LookupResult`]

use pos_client::{ClientError, ClientResult};
use serde_json::Value;
use shared::lookup::VariantsPayload;
use shared::{LookupResult, Product};

/// Classifies barcode lookup payloads
///
/// | Payload | Result |
/// |---------|--------|
/// | absent, `null`, `false`, `{}`, `[]` | `NotFound` |
/// | `variants` with 0 entries | `NotFound` |
/// | `variants` with 1 entry | `SingleProduct` (id, name, attributes only) |
/// | `variants` with 2+ entries | `MultipleVariants` |
/// | any other object | `SingleProduct` |
///
/// Anything else is malformed.
pub struct VariantResolver;

impl VariantResolver {
    pub fn classify(raw: Option<&Value>) -> ClientResult<LookupResult> {
        let Some(raw) = raw else {
            return Ok(LookupResult::NotFound);
        };

        match raw {
            Value::Null | Value::Bool(false) => Ok(LookupResult::NotFound),
            Value::Array(items) if items.is_empty() => Ok(LookupResult::NotFound),
            Value::Object(fields) if fields.is_empty() => Ok(LookupResult::NotFound),
            Value::Object(fields) if has_variants(fields) => {
                let payload: VariantsPayload = serde_json::from_value(raw.clone())?;
                Ok(Self::from_variants(payload))
            }
            Value::Object(fields) if flags_multiple(fields) => Err(ClientError::InvalidResponse(
                "multiple_variants payload without variants".to_string(),
            )),
            Value::Object(_) => {
                let product: Product = serde_json::from_value(raw.clone())?;
                Ok(LookupResult::SingleProduct(product))
            }
            other => Err(ClientError::InvalidResponse(format!(
                "unexpected barcode lookup payload: {other}"
            ))),
        }
    }

    /// Whether `raw` is a variants answer rather than a product record
    pub fn is_variants_payload(raw: &Value) -> bool {
        raw.as_object().is_some_and(has_variants)
    }

    fn from_variants(payload: VariantsPayload) -> LookupResult {
        let VariantsPayload {
            product_tmpl_id,
            mut variants,
            ..
        } = payload;

        match variants.len() {
            0 => LookupResult::NotFound,
            1 => {
                let only = variants.remove(0);
                let mut product =
                    Product::new(only.id, only.name).with_attribute_values(only.attribute_values);
                product.product_tmpl_id = product_tmpl_id;
                LookupResult::SingleProduct(product)
            }
            _ => LookupResult::MultipleVariants {
                template: product_tmpl_id,
                candidates: variants,
            },
        }
    }
}

fn has_variants(fields: &serde_json::Map<String, Value>) -> bool {
    fields.get("variants").is_some_and(|v| !v.is_null())
}

fn flags_multiple(fields: &serde_json::Map<String, Value>) -> bool {
    fields.get("multiple_variants").and_then(Value::as_bool) == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_payloads_are_not_found() {
        for raw in [json!(null), json!(false), json!({}), json!([])] {
            assert!(VariantResolver::classify(Some(&raw)).unwrap().is_not_found());
        }
        assert!(VariantResolver::classify(None).unwrap().is_not_found());
    }

    #[test]
    fn test_plain_product_record() {
        for raw in [
            json!({"id": 42, "name": "Widget", "barcode": "5012345"}),
            json!({"multiple_variants": false, "id": 42, "name": "Widget"}),
        ] {
            match VariantResolver::classify(Some(&raw)).unwrap() {
                LookupResult::SingleProduct(product) => assert_eq!(product.id, 42),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_single_variant_is_unwrapped() {
        let raw = json!({
            "multiple_variants": true,
            "product_tmpl_id": [9, "Shirt"],
            "variants": [{"id": 1, "name": "Shirt", "combination_name": ["Red", "S"]}]
        });

        match VariantResolver::classify(Some(&raw)).unwrap() {
            LookupResult::SingleProduct(product) => {
                assert_eq!(product.id, 1);
                assert_eq!(product.template_id(), Some(9));
                assert_eq!(product.attribute_values, vec!["Red", "S"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_variants_payload_detection() {
        assert!(VariantResolver::is_variants_payload(&json!({"variants": []})));
        assert!(!VariantResolver::is_variants_payload(&json!({"variants": null, "id": 1})));
        assert!(!VariantResolver::is_variants_payload(&json!({"id": 42, "name": "Widget"})));
        assert!(!VariantResolver::is_variants_payload(&json!([])));
    }

    #[test]
    fn test_multiple_variants_keep_order() {
        let raw = json!({
            "multiple_variants": true,
            "variants": [
                {"id": 3, "name": "Shirt", "combination_name": ["Green", "L"]},
                {"id": 1, "name": "Shirt", "combination_name": ["Red", "S"]},
                {"id": 2, "name": "Shirt", "combination_name": ["Blue", "M"]}
            ]
        });

        match VariantResolver::classify(Some(&raw)).unwrap() {
            LookupResult::MultipleVariants {
                template,
                candidates,
            } => {
                assert!(template.is_none());
                let ids: Vec<_> = candidates.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![3, 1, 2]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_variants_is_not_found() {
        let raw = json!({"multiple_variants": true, "variants": []});
        assert!(VariantResolver::classify(Some(&raw)).unwrap().is_not_found());
    }

    #[test]
    fn test_malformed_payloads() {
        for raw in [
            json!("5012345"),
            json!(17),
            json!([{"id": 1}]),
            json!({"multiple_variants": true}),
            json!({"name": "no id"}),
            json!({"variants": [{"name": "no id"}]}),
        ] {
            let err = VariantResolver::classify(Some(&raw)).unwrap_err();
            assert!(err.is_malformed(), "{raw} should be malformed, got {err:?}");
        }
    }
}
