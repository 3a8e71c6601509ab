//! Application state management for costbench.
//!
//! This module contains the core `App` struct that manages all application
//! state: the session guard, the API client, per-view cached data, the
//! login and create-form overlays, and background task coordination.

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{
    Capability, CredentialStore, FileStore, MemoryStore, Role, SessionGuard, SessionState,
    StateStore, Validity, REDIRECT_DELAY_MS,
};
use crate::config::Config;
use crate::models::{
    AdditionalCosts, CostAggregate, Country, FinalCost, ItemMaster, ItemMasterRef, MachineRate,
    MachineRateEdit, MachineType, Make, ModelSize, NewCostAggregate, NewCountry, NewMachineRate,
    NewMachineType, NewMake, NewModelSize, NewProcessFlow, ProcessFlow,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is sufficient for a full refresh (~6 API calls) with headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Current time in milliseconds since the Unix epoch. The single place
/// the app layer reads the clock; the guard itself is time-parameterised.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs, one per protected view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Countries,
    MachineTypes,
    Makes,
    ModelSizes,
    ItemMasters,
    ProcessFlows,
    MachineRates,
    CostAggregates,
}

impl Tab {
    pub const ALL: [Tab; 8] = [
        Tab::Countries,
        Tab::MachineTypes,
        Tab::Makes,
        Tab::ModelSizes,
        Tab::ItemMasters,
        Tab::ProcessFlows,
        Tab::MachineRates,
        Tab::CostAggregates,
    ];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Countries => "Countries",
            Tab::MachineTypes => "Machine Types",
            Tab::Makes => "Makes",
            Tab::ModelSizes => "Model/Sizes",
            Tab::ItemMasters => "Item Masters",
            Tab::ProcessFlows => "Process Flows",
            Tab::MachineRates => "Machine Rates",
            Tab::CostAggregates => "Cost Aggregates",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Capability required to create or delete rows on this tab. The
    /// backend enforces the real authorisation; this only decides which
    /// actions the UI offers.
    pub fn mutate_capability(&self) -> Capability {
        match self {
            Tab::Countries | Tab::MachineTypes | Tab::Makes | Tab::ModelSizes => {
                Capability::ManageReferenceData
            }
            Tab::ItemMasters | Tab::ProcessFlows | Tab::MachineRates | Tab::CostAggregates => {
                Capability::EditRates
            }
        }
    }

    /// Whether this tab is scoped to a selected item master.
    pub fn needs_item(&self) -> bool {
        matches!(
            self,
            Tab::ProcessFlows | Tab::MachineRates | Tab::CostAggregates
        )
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    /// A create/edit/approval form overlay is open
    Editing,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Severity of a status-bar notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Transient toast-style message shown in the status bar
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// One input field of the form overlay
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }

    fn with_value(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// What the form overlay submits to on Enter
#[derive(Debug, Clone)]
pub enum FormKind {
    Create(Tab),
    /// Inline edit of an existing row (tab, row id)
    Edit(Tab, i64),
    /// Resolve a pending machine-rate edit request
    Approval,
}

/// Form overlay state, one field list per operation
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub active: usize,
    pub error: Option<String>,
}

impl EntryForm {
    /// Overlay title describing the pending operation.
    pub fn title(&self) -> String {
        match self.kind {
            FormKind::Create(tab) => format!("New {}", tab.title()),
            FormKind::Edit(tab, _) => format!("Edit {}", tab.title()),
            FormKind::Approval => "Resolve edit request".to_string(),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background refresh tasks.
///
/// These variants are sent through an MPSC channel from the background
/// refresh task back to the main application.
enum RefreshResult {
    Countries(Vec<Country>),
    MachineTypes(Vec<MachineType>),
    Makes(Vec<Make>),
    ModelSizes(Vec<ModelSize>),
    ItemMasters(Vec<ItemMaster>),
    ItemRefs(Vec<ItemMasterRef>),
    /// Process flows for a specific item master (item_master_id, rows)
    ProcessFlows(i64, Vec<ProcessFlow>),
    MachineRates(i64, Vec<MachineRate>),
    CostAggregates(i64, Vec<CostAggregate>),
    FinalCost(i64, FinalCost),
    /// A background mutation finished; carries the success message and
    /// the tab whose data should be reloaded
    Mutated(Tab, String),
    /// Signal that all refresh tasks have completed
    RefreshComplete,
    /// An error occurred during refresh
    Error(String),
}

/// A write against the backend, executed off the UI thread. Parsing and
/// capability checks happen before one of these is built; the task only
/// moves JSON.
enum Mutation {
    CreateCountry(NewCountry),
    UpdateCountry(i64, NewCountry),
    DeleteCountries(Vec<i64>),
    CreateMachineType(NewMachineType),
    DeleteMachineType(i64),
    CreateMake(NewMake),
    DeleteMake(i64),
    CreateModelSize(NewModelSize),
    UpdateModelSize(i64, NewModelSize),
    DeleteModelSize(i64),
    CreateItemMaster(ItemMaster),
    DeleteItemMaster(i64),
    CreateProcessFlow(NewProcessFlow),
    DeleteProcessFlows(Vec<i64>),
    CreateMachineRate {
        item_id: i64,
        country: String,
        rate: NewMachineRate,
    },
    UpdateMachineRate(i64, MachineRateEdit),
    RequestMachineRateEdit(i64, MachineRateEdit),
    DeleteMachineRates(Vec<i64>),
    CreateCostAggregate(NewCostAggregate),
    UpdateCostAggregate(i64, NewCostAggregate),
    ApproveEdit {
        approval_id: i64,
        status: String,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub guard: SessionGuard,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Form overlay (create / edit / approval)
    pub form: Option<EntryForm>,

    // Selection indices
    pub countries_selection: usize,
    pub types_selection: usize,
    pub makes_selection: usize,
    pub sizes_selection: usize,
    pub items_selection: usize,
    pub flows_selection: usize,
    pub rates_selection: usize,
    pub aggregates_selection: usize,

    // Item scoping for process flows / rates / aggregates
    pub selected_item: Option<ItemMasterRef>,
    pub country_index: usize,

    // Cached data
    pub countries: Vec<Country>,
    pub machine_types: Vec<MachineType>,
    pub makes: Vec<Make>,
    pub model_sizes: Vec<ModelSize>,
    pub item_masters: Vec<ItemMaster>,
    pub item_refs: Vec<ItemMasterRef>,
    pub process_flows: Vec<ProcessFlow>,
    pub machine_rates: Vec<MachineRate>,
    pub cost_aggregates: Vec<CostAggregate>,
    pub final_cost: Option<FinalCost>,
    pub additional_costs: AdditionalCosts,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status notice and pending redirect to the login view
    pub notice: Option<Notice>,
    redirect_at_ms: Option<i64>,

    pub refreshing: bool,
}

impl App {
    /// Create a new application instance. With `ephemeral` set, session
    /// state lives only in memory and dies with the process.
    pub fn new(ephemeral: bool) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let store: Box<dyn StateStore> = if ephemeral {
            Box::new(MemoryStore::new())
        } else {
            let state_dir = config
                .state_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("./state"));
            Box::new(FileStore::open(state_dir))
        };
        let guard = SessionGuard::new(store);

        let mut api = ApiClient::new(config.resolve_api_base_url())?;

        // If a session survived the restart, resume it on the API client;
        // validity is checked before anything protected renders.
        if let Some(session) = guard.session() {
            api.set_token(session.token);
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var("COSTBENCH_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var("COSTBENCH_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            guard,
            api,

            state: AppState::Normal,
            current_tab: Tab::Countries,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            form: None,

            countries_selection: 0,
            types_selection: 0,
            makes_selection: 0,
            sizes_selection: 0,
            items_selection: 0,
            flows_selection: 0,
            rates_selection: 0,
            aggregates_selection: 0,

            selected_item: None,
            country_index: 0,

            countries: Vec::new(),
            machine_types: Vec::new(),
            makes: Vec::new(),
            model_sizes: Vec::new(),
            item_masters: Vec::new(),
            item_refs: Vec::new(),
            process_flows: Vec::new(),
            machine_rates: Vec::new(),
            cost_aggregates: Vec::new(),
            final_cost: None,
            additional_costs: AdditionalCosts::default(),

            refresh_rx: Some(rx),
            refresh_tx: tx,

            notice: None,
            redirect_at_ms: None,

            refreshing: false,
        })
    }

    pub fn role(&self) -> Role {
        self.guard.role()
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Protected-view entry check. Returns false when the session is dead,
    /// after arranging the notice/redirect so no protected content renders.
    pub fn enter_protected(&mut self) -> bool {
        match self.guard.check_validity(now_ms()) {
            Validity::Valid => true,
            Validity::Expired => {
                self.api.clear_token();
                if self.guard.state() == SessionState::Expired {
                    // A live session actually died; show why, then redirect
                    self.notice = Some(Notice::warn("Session expired! Redirecting to login..."));
                    self.redirect_at_ms = Some(now_ms() + REDIRECT_DELAY_MS);
                } else {
                    // Nothing was stored; straight to the login view
                    self.start_login();
                }
                false
            }
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;

        // Offer the stored password for the remembered username
        if self.login_password.is_empty() && CredentialStore::has_credentials(&self.login_username)
        {
            if let Ok(password) = CredentialStore::get_password(&self.login_username) {
                self.login_password = password;
            }
        }
    }

    /// Forget the saved password for the current username (login view
    /// action). Clears the prefilled field and the keychain entry.
    pub fn forget_saved_password(&mut self) {
        self.login_password.clear();
        if self.login_username.is_empty() {
            return;
        }
        match CredentialStore::forget(&self.login_username) {
            Ok(()) => self.notice = Some(Notice::info("Saved password forgotten")),
            // Nothing stored is the common case; not worth a toast
            Err(e) => debug!(error = %e, "No saved password to forget"),
        }
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;
        self.guard.begin_login();

        let response = match self.api.login(&username, &password).await {
            Ok(response) => response,
            Err(e) => {
                self.guard.cancel_login();
                error!(error = %e, "Login failed");
                match e.downcast_ref::<ApiError>() {
                    // Bad credentials are user-correctable: inline error
                    Some(ApiError::AuthRejected) => {
                        self.login_error = Some("Invalid username or password".to_string());
                    }
                    Some(ApiError::NetworkError(_)) | None => {
                        self.notice = Some(Notice::error(
                            "Unable to connect to server. Check your connection.",
                        ));
                    }
                    Some(other) => {
                        self.notice = Some(Notice::error(format!("Login failed: {}", other)));
                    }
                }
                return;
            }
        };

        match self
            .guard
            .install(&response.access_token, &response.role, now_ms())
        {
            Ok(session) => {
                self.api.set_token(session.token.clone());

                if let Err(e) = CredentialStore::store(&username, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.notice = Some(Notice::info("Login successful"));
                info!("Login successful");
                self.refresh_all_background();
            }
            Err(e) => {
                // Undecodable or already-past expiry claim: fail closed
                error!(error = %e, "Rejected credential from login response");
                self.login_error = Some(format!("Login failed: {}", e));
            }
        }
    }

    /// Explicit logout: clear the session and return to the login view.
    pub fn logout(&mut self) {
        self.guard.logout();
        self.api.clear_token();
        self.redirect_at_ms = None;
        self.notice = Some(Notice::info("Logged out"));
        self.start_login();
    }

    /// Event-loop tick: drive the guard's expiry/inactivity detection and
    /// the delayed redirect to the login view. Safe to call when a
    /// redirect has already happened; the action is idempotent.
    pub fn tick(&mut self, now_ms: i64) {
        if let Some(notice) = self.guard.poll(now_ms) {
            self.api.clear_token();
            self.notice = Some(Notice::warn(notice.message()));
            self.redirect_at_ms = Some(now_ms + REDIRECT_DELAY_MS);
        }

        if let Some(at) = self.redirect_at_ms {
            if now_ms >= at {
                self.redirect_at_ms = None;
                self.guard.resolve_expired();
                if self.state != AppState::LoggingIn {
                    self.start_login();
                }
            }
        }
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all reference data
    pub fn refresh_all_background(&mut self) {
        let token = match self.guard.token() {
            Some(t) => t,
            None => {
                warn!("No token available for refresh");
                return;
            }
        };

        info!("Starting background refresh of reference data");
        let api = self.api.with_token(token);
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            Self::execute_reference_refresh(tx, api).await;
        });

        self.refreshing = true;
        self.notice = Some(Notice::info("Refreshing data..."));
    }

    /// Fetch everything scoped to the selected item master: process
    /// flows, machine rates (for the selected country), cost aggregates
    /// and the final cost rollup.
    pub fn refresh_item_background(&mut self) {
        let item = match &self.selected_item {
            Some(item) => item.clone(),
            None => return,
        };
        let token = match self.guard.token() {
            Some(t) => t,
            None => return,
        };
        let country = self
            .countries
            .get(self.country_index)
            .map(|c| c.name.clone());

        let api = self.api.with_token(token);
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            Self::execute_item_refresh(tx, api, item.id, country).await;
        });

        self.refreshing = true;
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    async fn execute_reference_refresh(tx: mpsc::Sender<RefreshResult>, api: ApiClient) {
        debug!("Reference refresh task started");

        let (countries, types, makes, sizes, items, refs) = tokio::join!(
            api.fetch_countries(),
            api.fetch_machine_types(),
            api.fetch_makes(),
            api.fetch_model_sizes(),
            api.fetch_item_masters(),
            api.fetch_item_masters_dropdown(),
        );

        Self::send_fetch_result(&tx, "Countries", countries, RefreshResult::Countries).await;
        Self::send_fetch_result(&tx, "Machine types", types, RefreshResult::MachineTypes).await;
        Self::send_fetch_result(&tx, "Makes", makes, RefreshResult::Makes).await;
        Self::send_fetch_result(&tx, "Model sizes", sizes, RefreshResult::ModelSizes).await;
        Self::send_fetch_result(&tx, "Item masters", items, RefreshResult::ItemMasters).await;
        Self::send_fetch_result(&tx, "Item list", refs, RefreshResult::ItemRefs).await;

        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
        debug!("Reference refresh complete");
    }

    async fn execute_item_refresh(
        tx: mpsc::Sender<RefreshResult>,
        api: ApiClient,
        item_id: i64,
        country: Option<String>,
    ) {
        debug!(item_id, "Item-scoped refresh task started");

        let (flows, aggregates, final_cost) = tokio::join!(
            api.fetch_process_flows(item_id),
            api.fetch_cost_aggregates(item_id),
            api.fetch_final_cost(item_id),
        );

        Self::send_fetch_result(&tx, "Process flows", flows, |data| {
            RefreshResult::ProcessFlows(item_id, data)
        })
        .await;
        Self::send_fetch_result(&tx, "Cost aggregates", aggregates, |data| {
            RefreshResult::CostAggregates(item_id, data)
        })
        .await;
        match final_cost {
            Ok(data) => Self::send_result(&tx, RefreshResult::FinalCost(item_id, data)).await,
            // Items without aggregates have no final cost yet; not an error
            Err(e) => debug!(error = %e, "Final cost unavailable"),
        }

        if let Some(country) = country {
            match api.fetch_machine_rates(item_id, &country).await {
                Ok(rates) => {
                    Self::send_result(&tx, RefreshResult::MachineRates(item_id, rates)).await;
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Machine rates: {}", e)))
                        .await;
                }
            }
        }

        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
        debug!(item_id, "Item-scoped refresh complete");
    }

    /// Helper to send a successful fetch result or an error
    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<RefreshResult>,
        name: &str,
        result: Result<T>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> RefreshResult,
    {
        match result {
            Ok(data) => {
                debug!("{} fetched successfully", name);
                Self::send_result(tx, wrapper(data)).await;
            }
            Err(e) => {
                error!(error = %e, "{} fetch failed", name);
                Self::send_result(tx, RefreshResult::Error(format!("{}: {}", name, e))).await;
            }
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let results: Vec<RefreshResult> = {
            if let Some(ref mut rx) = self.refresh_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Process a single refresh result from a background task, updating
    /// the corresponding cached data.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Countries(data) => {
                self.country_index = self.country_index.min(data.len().saturating_sub(1));
                self.countries = data;
            }
            RefreshResult::MachineTypes(data) => self.machine_types = data,
            RefreshResult::Makes(data) => self.makes = data,
            RefreshResult::ModelSizes(data) => self.model_sizes = data,
            RefreshResult::ItemMasters(data) => self.item_masters = data,
            RefreshResult::ItemRefs(data) => self.item_refs = data,
            RefreshResult::ProcessFlows(item_id, data) => {
                if self.is_selected_item(item_id) {
                    self.process_flows = data;
                }
            }
            RefreshResult::MachineRates(item_id, data) => {
                if self.is_selected_item(item_id) {
                    self.machine_rates = data;
                }
            }
            RefreshResult::CostAggregates(item_id, data) => {
                if self.is_selected_item(item_id) {
                    self.additional_costs = AdditionalCosts::from_aggregates(&data);
                    self.cost_aggregates = data;
                }
            }
            RefreshResult::FinalCost(item_id, data) => {
                if self.is_selected_item(item_id) {
                    self.final_cost = Some(data);
                }
            }
            RefreshResult::Mutated(tab, message) => {
                self.notice = Some(Notice::info(message));
                if tab.needs_item() {
                    self.refresh_item_background();
                } else {
                    self.refresh_all_background();
                }
            }
            RefreshResult::RefreshComplete => {
                self.refreshing = false;
                // Only clear progress messages, preserve errors and warnings
                if let Some(ref notice) = self.notice {
                    if notice.level == NoticeLevel::Info {
                        self.notice = None;
                    }
                }
            }
            RefreshResult::Error(msg) => {
                error!(error = %msg, "Background task error");
                let user_message = if msg.to_lowercase().contains("username or password") {
                    "Session expired. Please log in again.".to_string()
                } else if msg.to_lowercase().contains("network")
                    || msg.to_lowercase().contains("connect")
                {
                    "Network error. Check your connection.".to_string()
                } else {
                    format!("Error: {}", msg)
                };
                self.notice = Some(Notice::error(user_message));
            }
        }
    }

    fn is_selected_item(&self, item_id: i64) -> bool {
        self.selected_item.as_ref().map(|i| i.id) == Some(item_id)
    }

    // =========================================================================
    // Selection and Navigation
    // =========================================================================

    pub fn row_count(&self, tab: Tab) -> usize {
        match tab {
            Tab::Countries => self.countries.len(),
            Tab::MachineTypes => self.machine_types.len(),
            Tab::Makes => self.makes.len(),
            Tab::ModelSizes => self.model_sizes.len(),
            Tab::ItemMasters => self.item_masters.len(),
            Tab::ProcessFlows => self.process_flows.len(),
            Tab::MachineRates => self.machine_rates.len(),
            Tab::CostAggregates => self.cost_aggregates.len(),
        }
    }

    pub fn selection(&self, tab: Tab) -> usize {
        match tab {
            Tab::Countries => self.countries_selection,
            Tab::MachineTypes => self.types_selection,
            Tab::Makes => self.makes_selection,
            Tab::ModelSizes => self.sizes_selection,
            Tab::ItemMasters => self.items_selection,
            Tab::ProcessFlows => self.flows_selection,
            Tab::MachineRates => self.rates_selection,
            Tab::CostAggregates => self.aggregates_selection,
        }
    }

    fn selection_mut(&mut self, tab: Tab) -> &mut usize {
        match tab {
            Tab::Countries => &mut self.countries_selection,
            Tab::MachineTypes => &mut self.types_selection,
            Tab::Makes => &mut self.makes_selection,
            Tab::ModelSizes => &mut self.sizes_selection,
            Tab::ItemMasters => &mut self.items_selection,
            Tab::ProcessFlows => &mut self.flows_selection,
            Tab::MachineRates => &mut self.rates_selection,
            Tab::CostAggregates => &mut self.aggregates_selection,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let tab = self.current_tab;
        let count = self.row_count(tab);
        if count == 0 {
            return;
        }
        let sel = self.selection_mut(tab);
        let new = (*sel as isize + delta).clamp(0, count as isize - 1);
        *sel = new as usize;
    }

    /// Select the highlighted item master and pull its scoped data.
    pub fn select_current_item(&mut self) {
        if let Some(item) = self.item_masters.get(self.items_selection) {
            self.selected_item = Some(ItemMasterRef {
                id: item.id,
                part_number: item.part_number.clone(),
            });
            self.process_flows.clear();
            self.machine_rates.clear();
            self.cost_aggregates.clear();
            self.final_cost = None;
            self.additional_costs = AdditionalCosts::default();
            self.refresh_item_background();
        }
    }

    /// Cycle the country used for machine-rate figures.
    pub fn cycle_country(&mut self) {
        if self.countries.is_empty() {
            return;
        }
        self.country_index = (self.country_index + 1) % self.countries.len();
        self.refresh_item_background();
    }

    pub fn current_country_name(&self) -> Option<&str> {
        self.countries
            .get(self.country_index)
            .map(|c| c.name.as_str())
    }

    // =========================================================================
    // Login form editing
    // =========================================================================

    pub fn push_login_char(&mut self, c: char) {
        match self.login_focus {
            LoginFocus::Username => {
                if self.login_username.len() < MAX_USERNAME_LENGTH {
                    self.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if self.login_password.len() < MAX_PASSWORD_LENGTH {
                    self.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        }
    }

    pub fn pop_login_char(&mut self) {
        match self.login_focus {
            LoginFocus::Username => {
                self.login_username.pop();
            }
            LoginFocus::Password => {
                self.login_password.pop();
            }
            LoginFocus::Button => {}
        }
    }

    // =========================================================================
    // Create / Edit / Delete
    // =========================================================================

    /// Open the create-form overlay for the current tab, if the role
    /// allows it and any required item scope is present.
    pub fn open_create_form(&mut self) {
        let tab = self.current_tab;
        if !self.role().can(tab.mutate_capability()) {
            self.notice = Some(Notice::warn(format!(
                "Role {} cannot modify {}",
                self.role(),
                tab.title()
            )));
            return;
        }
        if tab.needs_item() && self.selected_item.is_none() {
            self.notice = Some(Notice::warn("Select an item master first (Enter on Item Masters)"));
            return;
        }

        let labels: &[&'static str] = match tab {
            Tab::Countries => &[
                "Name",
                "Currency symbol",
                "Labor rate",
                "Electricity rate",
                "Water rate",
                "Space rental rate",
                "Exchange rate",
            ],
            Tab::MachineTypes => &["Machine type"],
            Tab::Makes => &["Make"],
            Tab::ModelSizes => &["Model name"],
            Tab::ItemMasters => &[
                "Part number",
                "Description",
                "Category",
                "Model",
                "UOM",
                "Material",
                "Weight",
                "Supplier",
                "Cost per unit",
                "Annual volume",
            ],
            Tab::ProcessFlows => &[
                "Operation",
                "Description",
                "Machine type id",
                "Cycle time (sec)",
                "Yield %",
                "Operator count",
            ],
            Tab::MachineRates => &[
                "Machine type id",
                "Make id",
                "Model/size",
                "Purchase price",
                "Residual value %",
                "Useful life (yr)",
                "Utilization %",
                "Maintenance %",
                "Power (kW/hr)",
                "Power spec",
                "Area (m2)",
                "Water (m3/hr)",
                "Consumables",
            ],
            Tab::CostAggregates => &[
                "Operation",
                "Machine type id",
                "Machine rate",
                "Labor rate",
                "Input material cost",
                "Consumables cost",
            ],
        };

        self.form = Some(EntryForm {
            kind: FormKind::Create(tab),
            fields: labels.iter().map(|l| FormField::new(l)).collect(),
            active: 0,
            error: None,
        });
        self.state = AppState::Editing;
    }

    /// Open the edit-form overlay prefilled from the selected row. Only
    /// the tabs whose backend exposes an update endpoint are editable.
    pub fn open_edit_form(&mut self) {
        let tab = self.current_tab;
        if !self.role().can(tab.mutate_capability()) {
            self.notice = Some(Notice::warn(format!(
                "Role {} cannot modify {}",
                self.role(),
                tab.title()
            )));
            return;
        }

        let form = match tab {
            Tab::Countries => self.countries.get(self.countries_selection).map(|row| {
                EntryForm {
                    kind: FormKind::Edit(tab, row.id),
                    fields: vec![
                        FormField::with_value("Name", row.name.clone()),
                        FormField::with_value("Currency symbol", row.currency_symbol.clone()),
                        FormField::with_value("Labor rate", row.labor_rate.to_string()),
                        FormField::with_value("Electricity rate", row.electricity_rate.to_string()),
                        FormField::with_value("Water rate", row.water_rate.to_string()),
                        FormField::with_value(
                            "Space rental rate",
                            row.space_rental_rate.to_string(),
                        ),
                        FormField::with_value("Exchange rate", row.exchange_rate.to_string()),
                    ],
                    active: 0,
                    error: None,
                }
            }),
            Tab::ModelSizes => self.model_sizes.get(self.sizes_selection).map(|row| {
                EntryForm {
                    kind: FormKind::Edit(tab, row.id),
                    fields: vec![FormField::with_value("Model name", row.model_name.clone())],
                    active: 0,
                    error: None,
                }
            }),
            // Single-field edits only; Admins apply directly, Managers
            // file an edit request for approval
            Tab::MachineRates => self.machine_rates.get(self.rates_selection).map(|row| {
                EntryForm {
                    kind: FormKind::Edit(tab, row.id),
                    fields: vec![FormField::new("Field"), FormField::new("New value")],
                    active: 0,
                    error: None,
                }
            }),
            Tab::CostAggregates => {
                self.cost_aggregates
                    .get(self.aggregates_selection)
                    .map(|row| EntryForm {
                        kind: FormKind::Edit(tab, row.id),
                        fields: vec![
                            FormField::with_value("Operation", row.operation.clone()),
                            FormField::with_value("Machine type id", row.machine_type.to_string()),
                            FormField::with_value("Machine rate", row.machine_rate.to_string()),
                            FormField::with_value("Labor rate", row.labor_rate.to_string()),
                            FormField::with_value(
                                "Input material cost",
                                row.input_material_cost.to_string(),
                            ),
                            FormField::with_value(
                                "Consumables cost",
                                row.consumables_cost.to_string(),
                            ),
                        ],
                        active: 0,
                        error: None,
                    })
            }
            Tab::MachineTypes | Tab::Makes | Tab::ItemMasters | Tab::ProcessFlows => {
                self.notice = Some(Notice::warn("Rows on this tab are not editable inline"));
                return;
            }
        };

        match form {
            Some(form) => {
                self.form = Some(form);
                self.state = AppState::Editing;
            }
            None => {
                self.notice = Some(Notice::warn("No row selected"));
            }
        }
    }

    /// Open the approval form for resolving a pending machine-rate edit
    /// request. Admin only.
    pub fn open_approval_form(&mut self) {
        if !self.role().can(Capability::ApproveEdits) {
            self.notice = Some(Notice::warn(format!(
                "Role {} cannot resolve edit requests",
                self.role()
            )));
            return;
        }
        self.form = Some(EntryForm {
            kind: FormKind::Approval,
            fields: vec![
                FormField::new("Approval id"),
                FormField::with_value("Status", "Approved".to_string()),
            ],
            active: 0,
            error: None,
        });
        self.state = AppState::Editing;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Submit the form overlay: parse the field values, close the form
    /// and hand the write to a background task. Parse errors keep the
    /// form open.
    pub fn submit_form(&mut self) {
        let form = match self.form.clone() {
            Some(form) => form,
            None => return,
        };

        match self.build_mutation(&form) {
            Ok((mutation, done)) => {
                self.close_form();
                self.run_mutation(mutation, done);
            }
            Err(msg) => {
                if let Some(ref mut f) = self.form {
                    f.error = Some(msg);
                }
            }
        }
    }

    /// Parse a completed form into the mutation to run and the notice to
    /// show once it lands.
    fn build_mutation(
        &self,
        form: &EntryForm,
    ) -> std::result::Result<(Mutation, String), String> {
        let text = |i: usize| -> std::result::Result<String, String> {
            let value = form.fields[i].value.trim().to_string();
            if value.is_empty() {
                Err(format!("{} is required", form.fields[i].label))
            } else {
                Ok(value)
            }
        };
        let num = |i: usize| -> std::result::Result<f64, String> {
            let raw = form.fields[i].value.trim();
            if raw.is_empty() {
                return Ok(0.0);
            }
            raw.parse()
                .map_err(|_| format!("{} must be a number", form.fields[i].label))
        };
        let int = |i: usize| -> std::result::Result<i64, String> {
            let raw = form.fields[i].value.trim();
            if raw.is_empty() {
                return Ok(0);
            }
            raw.parse()
                .map_err(|_| format!("{} must be an integer", form.fields[i].label))
        };
        let item_scope = || {
            self.selected_item
                .as_ref()
                .map(|i| i.id)
                .ok_or_else(|| "No item master selected".to_string())
        };

        match form.kind {
            FormKind::Create(Tab::Countries) => {
                let country = NewCountry {
                    name: text(0)?,
                    currency_symbol: text(1)?,
                    labor_rate: num(2)?,
                    electricity_rate: num(3)?,
                    water_rate: num(4)?,
                    space_rental_rate: num(5)?,
                    exchange_rate: num(6)?,
                };
                Ok((
                    Mutation::CreateCountry(country),
                    "Country created".to_string(),
                ))
            }
            FormKind::Create(Tab::MachineTypes) => Ok((
                Mutation::CreateMachineType(NewMachineType {
                    machine_type: text(0)?,
                }),
                "Machine type created".to_string(),
            )),
            FormKind::Create(Tab::Makes) => Ok((
                Mutation::CreateMake(NewMake { make: text(0)? }),
                "Make created".to_string(),
            )),
            FormKind::Create(Tab::ModelSizes) => Ok((
                Mutation::CreateModelSize(NewModelSize {
                    model_name: text(0)?,
                }),
                "Model/size created".to_string(),
            )),
            FormKind::Create(Tab::ItemMasters) => {
                let item = ItemMaster {
                    part_number: text(0)?,
                    description: text(1)?,
                    category: form.fields[2].value.trim().to_string(),
                    model: form.fields[3].value.trim().to_string(),
                    uom: form.fields[4].value.trim().to_string(),
                    material: form.fields[5].value.trim().to_string(),
                    weight: num(6)?,
                    supplier: form.fields[7].value.trim().to_string(),
                    cost_per_unit: num(8)?,
                    annual_volume: int(9)?,
                    ..Default::default()
                };
                Ok((
                    Mutation::CreateItemMaster(item),
                    "Item master created".to_string(),
                ))
            }
            FormKind::Create(Tab::ProcessFlows) => {
                let flow = NewProcessFlow {
                    item_master_id: item_scope()?,
                    operation: text(0)?,
                    description: form.fields[1].value.trim().to_string(),
                    machine_type: int(2)?,
                    cycle_time_sec: int(3)?,
                    yield_percentage: num(4)?,
                    operator_count: num(5)?,
                };
                Ok((
                    Mutation::CreateProcessFlow(flow),
                    "Process flow created".to_string(),
                ))
            }
            FormKind::Create(Tab::MachineRates) => {
                let item_id = item_scope()?;
                let country = self
                    .current_country_name()
                    .ok_or_else(|| "No country available".to_string())?
                    .to_string();
                let rate = NewMachineRate {
                    machine_type: int(0)?,
                    make: int(1)?,
                    model_size: text(2)?,
                    purchase_dollar: num(3)?,
                    res_value: num(4)?,
                    useful_life: num(5)?,
                    utilization: num(6)?,
                    maintenance: num(7)?,
                    power_kw_hr: num(8)?,
                    power_spec: num(9)?,
                    area_m2: num(10)?,
                    water_m3_hr: num(11)?,
                    consumables: num(12)?,
                };
                Ok((
                    Mutation::CreateMachineRate {
                        item_id,
                        country,
                        rate,
                    },
                    "Machine rate created".to_string(),
                ))
            }
            FormKind::Create(Tab::CostAggregates) => {
                let cost = NewCostAggregate {
                    item_master_id: item_scope()?,
                    operation: text(0)?,
                    machine_type: int(1)?,
                    machine_rate: num(2)?,
                    labor_rate: num(3)?,
                    input_material_cost: num(4)?,
                    consumables_cost: num(5)?,
                };
                Ok((
                    Mutation::CreateCostAggregate(cost),
                    "Cost aggregate created".to_string(),
                ))
            }
            FormKind::Edit(Tab::Countries, id) => {
                let country = NewCountry {
                    name: text(0)?,
                    currency_symbol: text(1)?,
                    labor_rate: num(2)?,
                    electricity_rate: num(3)?,
                    water_rate: num(4)?,
                    space_rental_rate: num(5)?,
                    exchange_rate: num(6)?,
                };
                Ok((
                    Mutation::UpdateCountry(id, country),
                    "Country updated".to_string(),
                ))
            }
            FormKind::Edit(Tab::ModelSizes, id) => Ok((
                Mutation::UpdateModelSize(
                    id,
                    NewModelSize {
                        model_name: text(0)?,
                    },
                ),
                "Model/size updated".to_string(),
            )),
            FormKind::Edit(Tab::MachineRates, id) => {
                let edit = MachineRateEdit {
                    field: text(0)?,
                    value: text(1)?,
                };
                // Admins write the column directly; Managers go through
                // the approval queue
                if self.role().can(Capability::ApproveEdits) {
                    Ok((
                        Mutation::UpdateMachineRate(id, edit),
                        "Machine rate updated".to_string(),
                    ))
                } else {
                    Ok((
                        Mutation::RequestMachineRateEdit(id, edit),
                        "Edit request submitted for approval".to_string(),
                    ))
                }
            }
            FormKind::Edit(Tab::CostAggregates, id) => {
                let cost = NewCostAggregate {
                    item_master_id: item_scope()?,
                    operation: text(0)?,
                    machine_type: int(1)?,
                    machine_rate: num(2)?,
                    labor_rate: num(3)?,
                    input_material_cost: num(4)?,
                    consumables_cost: num(5)?,
                };
                Ok((
                    Mutation::UpdateCostAggregate(id, cost),
                    "Cost aggregate updated".to_string(),
                ))
            }
            FormKind::Edit(_, _) => Err("Rows on this tab are not editable inline".to_string()),
            FormKind::Approval => {
                let approval_id: i64 = text(0)?
                    .parse()
                    .map_err(|_| "Approval id must be an integer".to_string())?;
                let status = text(1)?;
                Ok((
                    Mutation::ApproveEdit {
                        approval_id,
                        status,
                    },
                    "Edit request resolved".to_string(),
                ))
            }
        }
    }

    /// Hand a mutation to a background task; the result comes back
    /// through the refresh channel as `Mutated` or `Error`.
    fn run_mutation(&mut self, mutation: Mutation, done: String) {
        let token = match self.guard.token() {
            Some(t) => t,
            None => {
                warn!("No token available for mutation");
                return;
            }
        };
        let api = self.api.with_token(token);
        let tx = self.refresh_tx.clone();
        let tab = self.current_tab;

        tokio::spawn(async move {
            match Self::execute_mutation(&api, mutation).await {
                Ok(()) => Self::send_result(&tx, RefreshResult::Mutated(tab, done)).await,
                Err(e) => {
                    error!(error = %e, "Mutation failed");
                    Self::send_result(&tx, RefreshResult::Error(e.to_string())).await;
                }
            }
        });

        self.refreshing = true;
    }

    async fn execute_mutation(api: &ApiClient, mutation: Mutation) -> Result<()> {
        match mutation {
            Mutation::CreateCountry(country) => api.create_country(&country).await,
            Mutation::UpdateCountry(id, country) => api.update_country(id, &country).await,
            Mutation::DeleteCountries(ids) => api.delete_countries(&ids).await,
            Mutation::CreateMachineType(body) => api.add_machine_type(&body).await,
            Mutation::DeleteMachineType(id) => api.delete_machine_type(id).await,
            Mutation::CreateMake(body) => api.add_make(&body).await,
            Mutation::DeleteMake(id) => api.delete_make(id).await,
            Mutation::CreateModelSize(body) => api.create_model_size(&body).await,
            Mutation::UpdateModelSize(id, body) => api.update_model_size(id, &body).await,
            Mutation::DeleteModelSize(id) => api.delete_model_size(id).await,
            Mutation::CreateItemMaster(item) => api.create_item_master(&item).await,
            Mutation::DeleteItemMaster(id) => api.delete_item_master(id).await,
            Mutation::CreateProcessFlow(flow) => api.create_process_flow(&flow).await,
            Mutation::DeleteProcessFlows(ids) => api.delete_process_flows(&ids).await,
            Mutation::CreateMachineRate {
                item_id,
                country,
                rate,
            } => api.create_machine_rate(item_id, &country, &rate).await,
            Mutation::UpdateMachineRate(id, edit) => api.update_machine_rate(id, &edit).await,
            Mutation::RequestMachineRateEdit(id, edit) => {
                api.request_machine_rate_edit(id, &edit).await
            }
            Mutation::DeleteMachineRates(ids) => api.delete_machine_rates(&ids).await,
            Mutation::CreateCostAggregate(cost) => api.create_cost_aggregate(&cost).await,
            Mutation::UpdateCostAggregate(id, cost) => api.update_cost_aggregate(id, &cost).await,
            Mutation::ApproveEdit {
                approval_id,
                status,
            } => api.approve_edit(approval_id, &status).await,
        }
    }

    /// Delete the selected row on the current tab, capability-gated. The
    /// request itself runs on a background task.
    pub fn delete_selected(&mut self) {
        let tab = self.current_tab;
        if !self.role().can(tab.mutate_capability()) {
            self.notice = Some(Notice::warn(format!(
                "Role {} cannot modify {}",
                self.role(),
                tab.title()
            )));
            return;
        }

        let mutation = match tab {
            Tab::Countries => self
                .countries
                .get(self.countries_selection)
                .map(|row| Mutation::DeleteCountries(vec![row.id])),
            Tab::MachineTypes => self
                .machine_types
                .get(self.types_selection)
                .map(|row| Mutation::DeleteMachineType(row.id)),
            Tab::Makes => self
                .makes
                .get(self.makes_selection)
                .map(|row| Mutation::DeleteMake(row.id)),
            Tab::ModelSizes => self
                .model_sizes
                .get(self.sizes_selection)
                .map(|row| Mutation::DeleteModelSize(row.id)),
            Tab::ItemMasters => self
                .item_masters
                .get(self.items_selection)
                .map(|row| Mutation::DeleteItemMaster(row.id)),
            Tab::ProcessFlows => self
                .process_flows
                .get(self.flows_selection)
                .map(|row| Mutation::DeleteProcessFlows(vec![row.id])),
            Tab::MachineRates => self
                .machine_rates
                .get(self.rates_selection)
                .map(|row| Mutation::DeleteMachineRates(vec![row.id])),
            // Aggregates are regenerated from process flows; no row delete
            Tab::CostAggregates => None,
        };

        if let Some(mutation) = mutation {
            self.move_selection(-1);
            self.run_mutation(mutation, "Deleted".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::make_token;
    use crate::auth::INACTIVITY_THRESHOLD_MS;

    #[test]
    fn tab_cycle_wraps_both_ways() {
        assert_eq!(Tab::Countries.next(), Tab::MachineTypes);
        assert_eq!(Tab::CostAggregates.next(), Tab::Countries);
        assert_eq!(Tab::Countries.prev(), Tab::CostAggregates);
    }

    #[test]
    fn mutate_capabilities_split_reference_and_rates() {
        assert_eq!(
            Tab::Countries.mutate_capability(),
            Capability::ManageReferenceData
        );
        assert_eq!(Tab::MachineRates.mutate_capability(), Capability::EditRates);
        assert!(Role::Manager.can(Tab::CostAggregates.mutate_capability()));
        assert!(!Role::Manager.can(Tab::Countries.mutate_capability()));
        assert!(!Role::Viewer.can(Tab::Makes.mutate_capability()));
    }

    #[test]
    fn item_scoped_tabs_need_an_item() {
        assert!(Tab::ProcessFlows.needs_item());
        assert!(Tab::MachineRates.needs_item());
        assert!(Tab::CostAggregates.needs_item());
        assert!(!Tab::ItemMasters.needs_item());
    }

    const NOW_MS: i64 = 1_700_000_000_000;

    /// Ephemeral app with a live session installed at `NOW_MS`. The
    /// password field is prefilled so the login view never consults the
    /// OS keychain during tests.
    fn app_with_session(role: &str, exp_offset_secs: i64) -> App {
        let mut app = App::new(true).expect("app");
        app.login_password = "hunter2".to_string();
        let token = make_token(NOW_MS / 1000 + exp_offset_secs);
        app.guard
            .install(&token, role, NOW_MS)
            .expect("install session");
        app
    }

    #[test]
    fn inactivity_notice_then_delayed_redirect_to_login() {
        let mut app = app_with_session("Admin", 7200);
        assert_eq!(app.state, AppState::Normal);

        // Inactivity deadline passes: notice now, redirect later
        let timeout_at = NOW_MS + INACTIVITY_THRESHOLD_MS + 1;
        app.tick(timeout_at);
        assert_eq!(app.guard.state(), SessionState::Expired);
        assert_eq!(app.state, AppState::Normal);
        let notice = app.notice.as_ref().expect("timeout notice");
        assert_eq!(notice.level, NoticeLevel::Warn);

        // Still inside the redirect delay
        app.tick(timeout_at + REDIRECT_DELAY_MS - 1);
        assert_eq!(app.state, AppState::Normal);

        // Delay elapsed: login view, transient state resolved
        app.tick(timeout_at + REDIRECT_DELAY_MS);
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.guard.state(), SessionState::LoggedOut);

        // Further ticks are no-ops
        app.tick(timeout_at + REDIRECT_DELAY_MS + 500);
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.guard.state(), SessionState::LoggedOut);
    }

    #[test]
    fn edit_and_approval_forms_are_capability_gated() {
        let mut app = app_with_session("Viewer", 3600);
        app.countries.push(Country {
            id: 1,
            name: "India".to_string(),
            ..Default::default()
        });

        app.open_edit_form();
        assert!(app.form.is_none());
        assert!(app.notice.is_some());

        // Managers can edit rates but not resolve edit requests
        let mut app = app_with_session("Manager", 3600);
        app.open_approval_form();
        assert!(app.form.is_none());
        assert!(app.notice.is_some());
    }

    #[test]
    fn manager_machine_rate_edit_routes_through_approval() {
        let form = EntryForm {
            kind: FormKind::Edit(Tab::MachineRates, 9),
            fields: vec![
                FormField::with_value("Field", "utilization".to_string()),
                FormField::with_value("New value", "90".to_string()),
            ],
            active: 0,
            error: None,
        };

        let app = app_with_session("Manager", 3600);
        let (mutation, _) = app.build_mutation(&form).expect("manager edit");
        assert!(matches!(mutation, Mutation::RequestMachineRateEdit(9, _)));

        let app = app_with_session("Admin", 3600);
        let (mutation, done) = app.build_mutation(&form).expect("admin edit");
        assert!(matches!(mutation, Mutation::UpdateMachineRate(9, _)));
        assert_eq!(done, "Machine rate updated");
    }

    #[test]
    fn approval_form_requires_an_integer_id() {
        let app = app_with_session("Admin", 3600);
        let mut form = EntryForm {
            kind: FormKind::Approval,
            fields: vec![
                FormField::with_value("Approval id", "twelve".to_string()),
                FormField::with_value("Status", "Approved".to_string()),
            ],
            active: 0,
            error: None,
        };
        assert!(app.build_mutation(&form).is_err());

        form.fields[0].value = "12".to_string();
        let (mutation, _) = app.build_mutation(&form).expect("approval");
        assert!(matches!(
            mutation,
            Mutation::ApproveEdit { approval_id: 12, .. }
        ));
    }
}
