//! API client for the cost-estimation backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the backend's REST API: login, reference data CRUD,
//! process flows, machine rates and cost aggregates. The backend performs
//! all calculation and persistence; the client only moves JSON.

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    CostAggregate, Country, FinalCost, ItemMaster, ItemMasterRef, MachineRate, MachineRateEdit,
    MachineType, Make, ModelSize, NewCostAggregate, NewCountry, NewMachineRate, NewMachineType,
    NewMake, NewModelSize, NewProcessFlow, ProcessFlow,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow cost recalculations while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response to `POST /login`. The refresh token and token type also come
/// back but the client does not use them; sessions end at expiry.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// API client for the cost-estimation backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (logout). Subsequent protected calls will be
    /// rejected by the backend.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Bulk-delete body shared by every ids-list delete endpoint.
    fn ids_body(ids: &[i64]) -> serde_json::Value {
        serde_json::json!({ "ids": ids })
    }

    /// Authenticate and return the issued credential and role label.
    /// A 401 maps to `ApiError::AuthRejected`; transport failures map to
    /// `ApiError::NetworkError`. Neither mutates any client state.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .client
            .post(self.url("login"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .context("Failed to parse login response")
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send PUT request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Reference Data =====

    pub async fn fetch_countries(&self) -> Result<Vec<Country>> {
        self.get("fetch-countries").await
    }

    pub async fn create_country(&self, country: &NewCountry) -> Result<()> {
        let _: serde_json::Value = self.post("create-country", country).await?;
        Ok(())
    }

    pub async fn update_country(&self, id: i64, country: &NewCountry) -> Result<()> {
        let _: serde_json::Value = self
            .put(&format!("update-country/{}", id), country)
            .await?;
        Ok(())
    }

    pub async fn delete_countries(&self, ids: &[i64]) -> Result<()> {
        let body = Self::ids_body(ids);
        let url = self.url("delete-countries");
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn fetch_machine_types(&self) -> Result<Vec<MachineType>> {
        self.get("fetch-machine-types").await
    }

    pub async fn add_machine_type(&self, machine_type: &NewMachineType) -> Result<()> {
        let _: serde_json::Value = self.post("add-machine-type", machine_type).await?;
        Ok(())
    }

    pub async fn delete_machine_type(&self, id: i64) -> Result<()> {
        self.delete(&format!("delete-machine-type/{}", id)).await
    }

    pub async fn fetch_makes(&self) -> Result<Vec<Make>> {
        self.get("fetch-makes").await
    }

    pub async fn add_make(&self, make: &NewMake) -> Result<()> {
        let _: serde_json::Value = self.post("add-make", make).await?;
        Ok(())
    }

    pub async fn delete_make(&self, id: i64) -> Result<()> {
        self.delete(&format!("delete-make/{}", id)).await
    }

    pub async fn fetch_model_sizes(&self) -> Result<Vec<ModelSize>> {
        self.get("fetch-model-sizes").await
    }

    pub async fn create_model_size(&self, model: &NewModelSize) -> Result<()> {
        let _: serde_json::Value = self.post("create-model-size", model).await?;
        Ok(())
    }

    pub async fn update_model_size(&self, id: i64, model: &NewModelSize) -> Result<()> {
        let _: serde_json::Value = self
            .put(&format!("update-model-size/{}", id), model)
            .await?;
        Ok(())
    }

    pub async fn delete_model_size(&self, id: i64) -> Result<()> {
        self.delete(&format!("delete-model-size/{}", id)).await
    }

    // ===== Item Masters =====

    pub async fn fetch_item_masters(&self) -> Result<Vec<ItemMaster>> {
        self.get("fetch-item-masters").await
    }

    pub async fn fetch_item_masters_dropdown(&self) -> Result<Vec<ItemMasterRef>> {
        self.get("fetch-item-masters-dropdown").await
    }

    pub async fn create_item_master(&self, item: &ItemMaster) -> Result<()> {
        let _: serde_json::Value = self.post("create-item-master", item).await?;
        Ok(())
    }

    pub async fn delete_item_master(&self, id: i64) -> Result<()> {
        self.delete(&format!("delete-item-master/{}", id)).await
    }

    // ===== Process Flows =====

    pub async fn fetch_process_flows(&self, item_master_id: i64) -> Result<Vec<ProcessFlow>> {
        self.get(&format!("fetch-process-flows?item_master_id={}", item_master_id))
            .await
    }

    pub async fn create_process_flow(&self, flow: &NewProcessFlow) -> Result<()> {
        let _: serde_json::Value = self.post("create-process-flow", flow).await?;
        Ok(())
    }

    pub async fn delete_process_flows(&self, ids: &[i64]) -> Result<()> {
        let _: serde_json::Value = self
            .post("delete-process-flow", &Self::ids_body(ids))
            .await?;
        Ok(())
    }

    // ===== Machine Rates =====

    pub async fn fetch_machine_rates(
        &self,
        item_master_id: i64,
        country: &str,
    ) -> Result<Vec<MachineRate>> {
        self.get(&format!(
            "machine-rate-data?item_master_id={}&country={}",
            item_master_id, country
        ))
        .await
    }

    pub async fn create_machine_rate(
        &self,
        item_master_id: i64,
        country: &str,
        rate: &NewMachineRate,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .post(
                &format!(
                    "create-machine-rate?item_master_id={}&country={}",
                    item_master_id, country
                ),
                rate,
            )
            .await?;
        Ok(())
    }

    /// Direct single-field update (Admin path). Managers go through
    /// `request_machine_rate_edit` instead.
    pub async fn update_machine_rate(&self, id: i64, edit: &MachineRateEdit) -> Result<()> {
        let _: serde_json::Value = self
            .put(&format!("update-machine-rate/{}", id), edit)
            .await?;
        Ok(())
    }

    /// File a machine-rate edit for Admin approval.
    pub async fn request_machine_rate_edit(&self, id: i64, edit: &MachineRateEdit) -> Result<()> {
        let _: serde_json::Value = self
            .post(&format!("request-edit-machine-rate?id={}", id), edit)
            .await?;
        Ok(())
    }

    /// Resolve a pending edit request; `status` is the backend's literal
    /// resolution string (Approved / Rejected).
    pub async fn approve_edit(&self, approval_id: i64, status: &str) -> Result<()> {
        let _: serde_json::Value = self
            .post(
                &format!("approve-edit?approval_id={}&status={}", approval_id, status),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_machine_rates(&self, ids: &[i64]) -> Result<()> {
        let _: serde_json::Value = self
            .post("delete-machine-rate", &Self::ids_body(ids))
            .await?;
        Ok(())
    }

    // ===== Cost Aggregates =====

    pub async fn fetch_cost_aggregates(&self, item_master_id: i64) -> Result<Vec<CostAggregate>> {
        let rows: Vec<CostAggregate> = self
            .get(&format!(
                "fetch-cost-aggregates?item_master_id={}",
                item_master_id
            ))
            .await?;
        debug!(count = rows.len(), "Cost aggregates fetched");
        Ok(rows)
    }

    pub async fn create_cost_aggregate(&self, cost: &NewCostAggregate) -> Result<()> {
        let _: serde_json::Value = self.post("create-cost-aggregate", cost).await?;
        Ok(())
    }

    pub async fn update_cost_aggregate(&self, id: i64, cost: &NewCostAggregate) -> Result<()> {
        let _: serde_json::Value = self
            .put(&format!("update-cost-aggregate/{}", id), cost)
            .await?;
        Ok(())
    }

    pub async fn fetch_final_cost(&self, item_master_id: i64) -> Result<FinalCost> {
        self.get(&format!("cost-aggregate/final-cost/{}", item_master_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_response() {
        // Backend also returns refresh_token and token_type; both ignored
        let json = r#"{"access_token": "head.payload.sig",
            "refresh_token": "r.t.s", "token_type": "bearer", "role": "Manager"}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("parse login");
        assert_eq!(resp.access_token, "head.payload.sig");
        assert_eq!(resp.role, "Manager");
    }

    #[test]
    fn bulk_delete_body_wraps_ids_in_a_list() {
        // The delete endpoints validate an `ids` list; a bare id is
        // rejected before the handler runs
        let body = ApiClient::ids_body(&[7]);
        assert_eq!(body.to_string(), r#"{"ids":[7]}"#);

        let body = ApiClient::ids_body(&[3, 4, 5]);
        assert_eq!(body["ids"].as_array().map(|a| a.len()), Some(3));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let api = ApiClient::new("http://127.0.0.1:8000/".to_string()).expect("client");
        assert_eq!(api.url("login"), "http://127.0.0.1:8000/login");

        let api = ApiClient::new("http://127.0.0.1:8000".to_string()).expect("client");
        assert_eq!(api.url("fetch-countries"), "http://127.0.0.1:8000/fetch-countries");
    }
}
