//! Validator list entries (`chains/<chain>/validators/list.json`).
//!
//! Unknown keys are carried through `extra` so that rewriting a list never
//! drops data the tool does not know about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys every validator entry must carry as strings.
pub const REQUIRED_VALIDATOR_KEYS: [&str; 4] = ["id", "name", "description", "website"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout: Option<Payout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking: Option<Staking>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ValidatorStatus>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub payout_delay: u32,
    #[serde(default)]
    pub payout_period: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staking {
    #[serde(default)]
    pub min_delegation: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorStatus {
    pub disabled: bool,
    pub note: String,
}

/// Required keys that are absent from `entry` or not strings.
pub fn missing_validator_keys(entry: &Value) -> Vec<&'static str> {
    REQUIRED_VALIDATOR_KEYS
        .iter()
        .copied()
        .filter(|key| !entry.get(*key).is_some_and(Value::is_string))
        .collect()
}

/// The `id` of a raw validator entry, if it is a string.
pub fn validator_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_reported() {
        let entry = json!({"id": "v1", "name": "V", "website": 3});
        assert_eq!(missing_validator_keys(&entry), vec!["description", "website"]);
        assert_eq!(validator_id(&entry), Some("v1"));
        assert_eq!(validator_id(&json!({"id": 7})), None);
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let entry = json!({
            "id": "tz1",
            "name": "Baker",
            "description": "d",
            "website": "https://b.io",
            "payout": {"commission": 5.0, "payoutDelay": 6, "payoutPeriod": 1, "rewards": "x"},
            "staking": {"minDelegation": 10.0},
            "custom": true
        });
        let model: ValidatorModel = serde_json::from_value(entry.clone()).unwrap();
        assert_eq!(model.extra.get("custom"), Some(&json!(true)));
        let payout = model.payout.as_ref().unwrap();
        assert_eq!(payout.payout_delay, 6);
        assert_eq!(payout.extra.get("rewards"), Some(&json!("x")));

        let back = serde_json::to_value(&model).unwrap();
        assert_eq!(back, entry);
    }
}
