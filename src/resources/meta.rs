use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Condition status value meaning the condition holds.
pub const CONDITION_TRUE: &str = "True";

/// Condition status value meaning the condition explicitly does not hold.
pub const CONDITION_FALSE: &str = "False";

/// Object identity and the label/annotation maps the engine cares about.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    /// Empty for cluster-scoped resources (DRPolicy).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }
}

/// One entry of a resource's status.conditions list.
///
/// Status is kept as the wire string ("True"/"False"/"Unknown") rather than a
/// bool: an absent or "Unknown" condition is meaningful to the readiness
/// predicates and must not collapse into false-the-bool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
}

impl Condition {
    pub fn new(condition_type: &str, status: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
        }
    }

    /// True iff this condition's status is exactly "True".
    pub fn is_true(&self) -> bool {
        self.status == CONDITION_TRUE
    }
}

/// Find a condition by type in a conditions list.
pub fn find_condition<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_is_true() {
        assert!(Condition::new("Available", CONDITION_TRUE).is_true());
        assert!(!Condition::new("Available", CONDITION_FALSE).is_true());
        assert!(!Condition::new("Available", "Unknown").is_true());
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![
            Condition::new("Available", CONDITION_TRUE),
            Condition::new("PeerReady", CONDITION_FALSE),
        ];

        assert!(find_condition(&conditions, "Available").unwrap().is_true());
        assert!(!find_condition(&conditions, "PeerReady").unwrap().is_true());
        assert!(find_condition(&conditions, "Missing").is_none());
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = ObjectMeta::namespaced("w1-drpc", "ns1");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "w1-drpc");
        assert_eq!(json["namespace"], "ns1");
        // empty maps are omitted from the wire form
        assert!(json.get("labels").is_none());
    }
}
