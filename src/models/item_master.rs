use serde::{Deserialize, Serialize};

/// Item master record: the part being costed. Field set mirrors the
/// backend's `item_master` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemMaster {
    #[serde(default)]
    pub id: i64,
    pub part_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub uom: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub min_order_qty: i64,
    #[serde(default)]
    pub annual_volume: i64,
    #[serde(default)]
    pub lifetime_volume: i64,
    #[serde(default)]
    pub compliance_standards: String,
    #[serde(default)]
    pub lifecycle_stage: String,
    #[serde(default)]
    pub drawing_number: String,
    #[serde(default)]
    pub revision_number: i64,
}

/// Dropdown entry (`GET /fetch-item-masters-dropdown`): just enough to
/// pick a part.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemMasterRef {
    pub id: i64,
    pub part_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_row() {
        let json = r#"{"id": 12, "part_number": "BRKT-0042",
            "description": "Mounting bracket", "material": "AL6061",
            "annual_volume": 120000}"#;
        let item: ItemMaster = serde_json::from_str(json).expect("parse item");
        assert_eq!(item.part_number, "BRKT-0042");
        assert_eq!(item.annual_volume, 120_000);
        assert_eq!(item.revision_number, 0);
    }
}
