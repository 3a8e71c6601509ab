use serde::{Deserialize, Serialize};

/// Material handling share applied on top of the aggregate cost (2%)
const MATERIAL_HANDLING_RATE: f64 = 0.02;

/// Overheads share (7.5%)
const OVERHEADS_RATE: f64 = 0.075;

/// Profit share (7.5%)
const PROFIT_RATE: f64 = 0.075;

/// Cost aggregate row (`GET /fetch-cost-aggregates?item_master_id=`),
/// joined with its process flow operation and carrying the backend's
/// derived cost columns.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CostAggregate {
    #[serde(default)]
    pub id: i64,
    pub operation: String,
    #[serde(default)]
    pub machine_type: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cycle_time_sec: f64,
    #[serde(default)]
    pub yield_percentage: f64,
    #[serde(default)]
    pub operator_count: f64,
    #[serde(default)]
    pub machine_rate: f64,
    #[serde(default)]
    pub labor_rate: f64,
    #[serde(default)]
    pub input_material_cost: f64,
    #[serde(default)]
    pub consumables_cost: f64,
    #[serde(default)]
    pub total_labor_cost: f64,
    #[serde(default)]
    pub total_machine_cost: f64,
    #[serde(default)]
    pub total_operating_cost: f64,
    #[serde(default)]
    pub cumulative_operating_cost: f64,
    #[serde(default)]
    pub yield_loss_cost: f64,
    /// Running total through this operation
    #[serde(default)]
    pub total_cost: f64,
}

/// Payload for `POST /create-cost-aggregate`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCostAggregate {
    pub item_master_id: i64,
    pub operation: String,
    pub machine_type: i64,
    pub machine_rate: f64,
    pub labor_rate: f64,
    pub input_material_cost: f64,
    pub consumables_cost: f64,
}

/// Backend response for `GET /cost-aggregate/final-cost/{item_master_id}`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FinalCost {
    #[serde(default)]
    pub base_total_cost: f64,
    #[serde(default)]
    pub material_handling: f64,
    #[serde(default)]
    pub overheads: f64,
    #[serde(default)]
    pub profit: f64,
    #[serde(default)]
    pub final_total_cost: f64,
}

/// Client-side additional-cost breakdown, derived from the final
/// operation's running total so the table renders without another
/// round trip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdditionalCosts {
    pub material_handling: f64,
    pub overheads: f64,
    pub profit: f64,
    pub total_cost: f64,
}

impl AdditionalCosts {
    /// The last aggregate's `total_cost` already accumulates every
    /// preceding operation, so only that row feeds the breakdown.
    pub fn from_aggregates(rows: &[CostAggregate]) -> Self {
        let base = rows.last().map(|row| row.total_cost).unwrap_or(0.0);
        let material_handling = base * MATERIAL_HANDLING_RATE;
        let overheads = base * OVERHEADS_RATE;
        let profit = base * PROFIT_RATE;
        Self {
            material_handling,
            overheads,
            profit,
            total_cost: base + material_handling + overheads + profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(total_cost: f64) -> CostAggregate {
        CostAggregate {
            total_cost,
            ..Default::default()
        }
    }

    #[test]
    fn breakdown_uses_last_running_total() {
        let rows = vec![aggregate(40.0), aggregate(100.0)];
        let costs = AdditionalCosts::from_aggregates(&rows);

        assert_eq!(costs.material_handling, 2.0);
        assert_eq!(costs.overheads, 7.5);
        assert_eq!(costs.profit, 7.5);
        assert_eq!(costs.total_cost, 117.0);
    }

    #[test]
    fn empty_aggregates_yield_zero_breakdown() {
        let costs = AdditionalCosts::from_aggregates(&[]);
        assert_eq!(costs, AdditionalCosts::default());
    }

    #[test]
    fn parses_aggregate_row() {
        let json = r#"{"id": 9, "operation": "OP-30", "machine_type": 2,
            "description": "Finish turning", "cycle_time_sec": 120.0,
            "yield_percentage": 97.0, "operator_count": 1.0,
            "machine_rate": 18.43, "labor_rate": 6.0,
            "input_material_cost": 1.1, "consumables_cost": 0.2,
            "total_labor_cost": 0.2, "total_machine_cost": 0.614,
            "total_operating_cost": 2.114, "cumulative_operating_cost": 5.4,
            "yield_loss_cost": 0.167, "total_cost": 5.567}"#;
        let row: CostAggregate = serde_json::from_str(json).expect("parse aggregate");
        assert_eq!(row.operation, "OP-30");
        assert_eq!(row.total_cost, 5.567);
    }
}
