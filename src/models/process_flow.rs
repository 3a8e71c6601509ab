use serde::{Deserialize, Serialize};

/// One operation in an item's process flow
/// (`GET /fetch-process-flows?item_master_id=`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessFlow {
    #[serde(default)]
    pub id: i64,
    pub item_master_id: i64,
    pub operation: String,
    #[serde(default)]
    pub description: String,
    /// Machine type id; display name resolution happens in the UI
    pub machine_type: i64,
    #[serde(default)]
    pub cycle_time_sec: i64,
    #[serde(default)]
    pub yield_percentage: f64,
    #[serde(default)]
    pub operator_count: f64,
}

/// Payload for `POST /create-process-flow`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProcessFlow {
    pub item_master_id: i64,
    pub operation: String,
    pub description: String,
    pub machine_type: i64,
    pub cycle_time_sec: i64,
    pub yield_percentage: f64,
    pub operator_count: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flow_row() {
        let json = r#"{"id": 4, "item_master_id": 12, "operation": "OP-20",
            "description": "Rough turning", "machine_type": 2,
            "cycle_time_sec": 95, "yield_percentage": 98.5, "operator_count": 0.5}"#;
        let flow: ProcessFlow = serde_json::from_str(json).expect("parse flow");
        assert_eq!(flow.operation, "OP-20");
        assert_eq!(flow.cycle_time_sec, 95);
        assert_eq!(flow.operator_count, 0.5);
    }
}
