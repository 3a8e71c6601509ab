use serde::{Deserialize, Serialize};

/// Reference country with its cost-driver rates. Rates are expressed in
/// local currency; the backend owns all conversion.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Country {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub currency_symbol: String,
    #[serde(default)]
    pub labor_rate: f64,
    #[serde(default)]
    pub electricity_rate: f64,
    #[serde(default)]
    pub water_rate: f64,
    #[serde(default)]
    pub space_rental_rate: f64,
    /// Exchange rate to USD
    #[serde(default)]
    pub exchange_rate: f64,
}

/// Payload for `POST /create-country`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCountry {
    pub name: String,
    pub currency_symbol: String,
    pub labor_rate: f64,
    pub electricity_rate: f64,
    pub water_rate: f64,
    pub space_rental_rate: f64,
    pub exchange_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_row() {
        let json = r#"{"id": 3, "name": "India", "currency_symbol": "₹",
            "labor_rate": 1.85, "electricity_rate": 0.1, "water_rate": 0.02,
            "space_rental_rate": 4.5, "exchange_rate": 83.2}"#;
        let country: Country = serde_json::from_str(json).expect("parse country");
        assert_eq!(country.name, "India");
        assert_eq!(country.exchange_rate, 83.2);
    }
}
