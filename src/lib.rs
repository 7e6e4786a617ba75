//! # ProjeXion TUI
//!
//! A terminal admin client for the ProjeXion backend.
//!
//! ## Features
//! - Sign-in with silent access-token renewal
//! - Route guard with a cross-instance logout marker
//! - Paged CRUD tables for companies, contacts, projects, users and roles
//! - Dashboard counters
//! - Project PDF download
//! - Profile and password change
//! - English / German labels
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod i18n;
pub mod messages;
pub mod models;
pub mod network;
pub mod session;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState, AuthState};
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{HttpMethod, Resource};
pub use network::{ApiClient, NetworkActor};
pub use session::Session;
