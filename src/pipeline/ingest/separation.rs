//! Pseudonymization separation guard.
//!
//! An asset declaring a `mapping_locator` is pseudonymized. It passes when
//! any one of the three separation controls in `separated_by` is declared.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Attributes, PseudonymizationGuard};

pub const SEPARATED_REASON: &str = "Separated from mapping by account, KMS key or network boundary";
pub const NOT_SEPARATED_REASON: &str = "Insufficient separation evidence";

/// Declared separation controls between pseudonymized data and its mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeparationEvidence {
    pub different_account: bool,
    pub different_kms_key: bool,
    pub network_boundary: bool,
}

impl SeparationEvidence {
    /// Read the `separated_by` object. Only JSON `true` counts for an
    /// indicator; a missing or non-object value yields no evidence.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let flag = |key: &str| matches!(map.get(key), Some(Value::Bool(true)));
        Self {
            different_account: flag("different_account"),
            different_kms_key: flag("different_kms_key"),
            network_boundary: flag("network_boundary"),
        }
    }

    /// Any single control suffices.
    pub fn is_separated(&self) -> bool {
        self.different_account || self.different_kms_key || self.network_boundary
    }
}

pub fn separation_reason(separated: bool) -> &'static str {
    if separated {
        SEPARATED_REASON
    } else {
        NOT_SEPARATED_REASON
    }
}

/// Outcome of evaluating one asset's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardEvaluation {
    pub mapping_locator: String,
    pub evidence: SeparationEvidence,
}

impl GuardEvaluation {
    pub fn separated(&self) -> bool {
        self.evidence.is_separated()
    }

    pub fn into_guard(self, object_id: Uuid, checked_at: DateTime<Utc>) -> PseudonymizationGuard {
        let separated = self.separated();
        PseudonymizationGuard {
            object_id,
            is_pseudonymized: true,
            mapping_locator: Some(self.mapping_locator),
            separated: Some(separated),
            separation_reason: Some(separation_reason(separated).to_string()),
            checked_at,
        }
    }
}

/// `None` when the attributes declare no mapping locator: the asset is not
/// pseudonymized and gets no guard row.
pub fn evaluate_guard(attrs: &Attributes) -> Option<GuardEvaluation> {
    let mapping_locator = mapping_locator(attrs.get("mapping_locator"))?;
    Some(GuardEvaluation {
        mapping_locator,
        evidence: SeparationEvidence::from_value(attrs.get("separated_by")),
    })
}

/// Falsy values (null, false, 0, "", [], {}) declare nothing.
fn mapping_locator(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn no_mapping_locator_means_no_guard() {
        assert!(evaluate_guard(&attrs(json!({}))).is_none());
        assert!(evaluate_guard(&attrs(json!({"separated_by": {"different_account": true}}))).is_none());
    }

    #[test]
    fn falsy_mapping_locator_means_no_guard() {
        for falsy in [json!(null), json!(false), json!(""), json!(0), json!([]), json!({})] {
            let a = attrs(json!({ "mapping_locator": falsy }));
            assert!(evaluate_guard(&a).is_none(), "{a:?}");
        }
    }

    #[test]
    fn single_control_is_sufficient() {
        for key in ["different_account", "different_kms_key", "network_boundary"] {
            let mut separated_by = Attributes::new();
            separated_by.insert(key.to_string(), json!(true));
            let a = attrs(json!({
                "mapping_locator": "s3://map/m",
                "separated_by": separated_by
            }));
            let eval = evaluate_guard(&a).unwrap();
            assert!(eval.separated(), "{key} alone should pass");
        }
    }

    #[test]
    fn empty_separated_by_fails() {
        let a = attrs(json!({"mapping_locator": "s3://map/m", "separated_by": {}}));
        let eval = evaluate_guard(&a).unwrap();
        assert!(!eval.separated());
        assert_eq!(eval.mapping_locator, "s3://map/m");
    }

    #[test]
    fn missing_separated_by_fails() {
        let a = attrs(json!({"mapping_locator": "s3://map/m"}));
        assert!(!evaluate_guard(&a).unwrap().separated());
    }

    #[test]
    fn only_json_true_counts_as_evidence() {
        let evidence = SeparationEvidence::from_value(Some(&json!({
            "different_account": "true",
            "different_kms_key": 1,
            "network_boundary": false
        })));
        assert_eq!(evidence, SeparationEvidence::default());
        assert!(!evidence.is_separated());
    }

    #[test]
    fn non_object_separated_by_is_empty() {
        assert_eq!(
            SeparationEvidence::from_value(Some(&json!(["different_account"]))),
            SeparationEvidence::default()
        );
    }

    #[test]
    fn non_string_mapping_locator_is_rendered() {
        let a = attrs(json!({"mapping_locator": 12345}));
        assert_eq!(evaluate_guard(&a).unwrap().mapping_locator, "12345");
    }

    #[test]
    fn guard_row_reason_follows_separated() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let pass = evaluate_guard(&attrs(json!({
            "mapping_locator": "s3://map/m",
            "separated_by": {"network_boundary": true}
        })))
        .unwrap()
        .into_guard(id, now);
        assert!(pass.is_pseudonymized);
        assert_eq!(pass.separated, Some(true));
        assert_eq!(pass.separation_reason.as_deref(), Some(SEPARATED_REASON));
        assert_eq!(pass.mapping_locator.as_deref(), Some("s3://map/m"));

        let fail = evaluate_guard(&attrs(json!({"mapping_locator": "s3://map/m"})))
            .unwrap()
            .into_guard(id, now);
        assert_eq!(fail.separated, Some(false));
        assert_eq!(fail.separation_reason.as_deref(), Some(NOT_SEPARATED_REASON));
    }
}
