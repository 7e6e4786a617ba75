//! Network messages - communication between App and Network layers

use std::path::PathBuf;

use serde_json::Value;

use crate::app::guard::AuthState;
use crate::error::ApiError;
use crate::models::{DashboardTotals, PageRequest, PasswordChange, Resource, RolePermissions};

/// Which of the two PDF endpoints to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfKind {
    Generate,
    View,
}

impl PdfKind {
    /// Local file name for a downloaded document
    pub fn file_name(&self, record_id: &str) -> String {
        match self {
            PdfKind::Generate => format!("invoice-{}.pdf", record_id),
            PdfKind::View => format!("preview-{}.pdf", record_id),
        }
    }
}

/// One backend operation requested by the App layer
#[derive(Debug, Clone)]
pub enum ApiCall {
    /// Initial session check (logout marker, then token renewal)
    Bootstrap,
    Login { email: String, password: String },
    Logout,
    FetchPage { resource: Resource, page: PageRequest },
    Search { resource: Resource, term: String },
    Create { resource: Resource, record: Value },
    Update { resource: Resource, id: String, record: Value },
    Delete { resource: Resource, id: String },
    SetUserActive { id: String, active: bool },
    DashboardTotals,
    RoleNames,
    /// Permission template for a new role
    AdminPermissions,
    RolePermissions { id: String },
    Profile { email: String },
    UpdatePassword(PasswordChange),
    Pdf { kind: PdfKind, id: String, payload: Value },
}

/// Tag telling the App which kind of call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Bootstrap,
    Login,
    Logout,
    Page,
    Search,
    Create,
    Update,
    Delete,
    UserActive,
    Totals,
    RoleNames,
    Permissions,
    Profile,
    Password,
    Pdf,
}

impl ApiCall {
    pub fn kind(&self) -> CallKind {
        match self {
            ApiCall::Bootstrap => CallKind::Bootstrap,
            ApiCall::Login { .. } => CallKind::Login,
            ApiCall::Logout => CallKind::Logout,
            ApiCall::FetchPage { .. } => CallKind::Page,
            ApiCall::Search { .. } => CallKind::Search,
            ApiCall::Create { .. } => CallKind::Create,
            ApiCall::Update { .. } => CallKind::Update,
            ApiCall::Delete { .. } => CallKind::Delete,
            ApiCall::SetUserActive { .. } => CallKind::UserActive,
            ApiCall::DashboardTotals => CallKind::Totals,
            ApiCall::RoleNames => CallKind::RoleNames,
            ApiCall::AdminPermissions | ApiCall::RolePermissions { .. } => CallKind::Permissions,
            ApiCall::Profile { .. } => CallKind::Profile,
            ApiCall::UpdatePassword(_) => CallKind::Password,
            ApiCall::Pdf { .. } => CallKind::Pdf,
        }
    }
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    Execute { id: u64, call: ApiCall },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Bootstrapped { id: u64, state: AuthState },
    LoggedIn { id: u64 },
    LoggedOut { id: u64 },
    /// Rows for a table, from paging or search
    Page {
        id: u64,
        resource: Resource,
        rows: Vec<Value>,
        total: u64,
    },
    Created { id: u64, resource: Resource, record: Value },
    Updated {
        id: u64,
        resource: Resource,
        record_id: String,
        /// Server echo, or the record that was sent when the server returned nothing useful
        record: Value,
    },
    Deleted { id: u64, resource: Resource, record_id: String },
    UserActiveSet { id: u64, record_id: String, active: bool },
    Totals { id: u64, totals: DashboardTotals },
    RoleNames { id: u64, names: Vec<String> },
    Permissions { id: u64, permissions: RolePermissions },
    Profile { id: u64, user: Value },
    PasswordUpdated { id: u64 },
    PdfSaved { id: u64, path: PathBuf },
    /// The backend call failed; `call` says which kind
    Failed { id: u64, call: CallKind, error: ApiError },
    /// A downloaded file could not be written locally
    SaveFailed { id: u64, message: String },
    /// Token renewal failed; the session is gone
    SessionExpired { id: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Bootstrapped { id, .. }
            | NetworkResponse::LoggedIn { id }
            | NetworkResponse::LoggedOut { id }
            | NetworkResponse::Page { id, .. }
            | NetworkResponse::Created { id, .. }
            | NetworkResponse::Updated { id, .. }
            | NetworkResponse::Deleted { id, .. }
            | NetworkResponse::UserActiveSet { id, .. }
            | NetworkResponse::Totals { id, .. }
            | NetworkResponse::RoleNames { id, .. }
            | NetworkResponse::Permissions { id, .. }
            | NetworkResponse::Profile { id, .. }
            | NetworkResponse::PasswordUpdated { id }
            | NetworkResponse::PdfSaved { id, .. }
            | NetworkResponse::Failed { id, .. }
            | NetworkResponse::SaveFailed { id, .. }
            | NetworkResponse::SessionExpired { id } => *id,
        }
    }
}
