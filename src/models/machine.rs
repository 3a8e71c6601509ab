use serde::{Deserialize, Serialize};

/// Machine type reference row (`GET /fetch-machine-types`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MachineType {
    pub id: i64,
    pub name: String,
}

/// Payload for `POST /add-machine-type`. The backend names the field
/// after the column, not the entity.
#[derive(Debug, Clone, Serialize)]
pub struct NewMachineType {
    pub machine_type: String,
}

/// Machine make reference row (`GET /fetch-makes`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Make {
    pub id: i64,
    pub make: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMake {
    pub make: String,
}

/// Model/size reference row (`GET /fetch-model-sizes`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelSize {
    pub id: i64,
    pub model_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewModelSize {
    pub model_name: String,
}

/// Machine rate row as returned by `GET /machine-rate-data`. The backend
/// resolves the type/make ids to display names and appends the derived
/// per-hour figures for the requested country.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MachineRate {
    pub id: i64,
    #[serde(default)]
    pub machine_type: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model_size: String,
    #[serde(default)]
    pub purchase_dollar: f64,
    #[serde(default)]
    pub res_value: f64,
    #[serde(default)]
    pub useful_life: f64,
    #[serde(default)]
    pub utilization: f64,
    #[serde(default)]
    pub maintenance: f64,
    #[serde(default)]
    pub power_kw_hr: f64,
    #[serde(default)]
    pub power_spec: f64,
    #[serde(default)]
    pub area_m2: f64,
    #[serde(default)]
    pub water_m3_hr: f64,
    #[serde(default)]
    pub consumables: f64,
    /// Derived total rate in local currency per hour
    #[serde(default)]
    pub total_dollar_hr: f64,
}

/// Payload for `POST /create-machine-rate`; type and make go by id here.
#[derive(Debug, Clone, Serialize)]
pub struct NewMachineRate {
    pub machine_type: i64,
    pub make: i64,
    pub model_size: String,
    pub purchase_dollar: f64,
    pub res_value: f64,
    pub useful_life: f64,
    pub utilization: f64,
    pub maintenance: f64,
    pub power_kw_hr: f64,
    pub power_spec: f64,
    pub area_m2: f64,
    pub water_m3_hr: f64,
    pub consumables: f64,
}

/// Single-field edit for `PUT /update-machine-rate/{id}` and the edit
/// approval workflow. The backend maps the display `field` key to its
/// column and rejects keys it does not know.
#[derive(Debug, Clone, Serialize)]
pub struct MachineRateEdit {
    pub field: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_machine_rate_row() {
        let json = r#"{"id": 7, "machine_type": "CNC Lathe", "make": "Haas",
            "model_size": "ST-20", "purchase_dollar": 64500.0, "res_value": 10.0,
            "useful_life": 10.0, "utilization": 85.0, "maintenance": 5.0,
            "power_kw_hr": 12.5, "power_spec": 0.8, "area_m2": 6.0,
            "water_m3_hr": 0.0, "consumables": 1.2, "total_dollar_hr": 18.43}"#;
        let rate: MachineRate = serde_json::from_str(json).expect("parse rate");
        assert_eq!(rate.machine_type, "CNC Lathe");
        assert_eq!(rate.total_dollar_hr, 18.43);
    }

    #[test]
    fn tolerates_missing_derived_fields() {
        // Rows created before the backend added derived columns
        let json = r#"{"id": 1, "machine_type": "Press", "make": "Schuler"}"#;
        let rate: MachineRate = serde_json::from_str(json).expect("parse rate");
        assert_eq!(rate.total_dollar_hr, 0.0);
    }
}
