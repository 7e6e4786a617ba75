//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{LoginForm, Notice, ProfileState, RecordEditor, SearchState, TableState};
use crate::i18n::Language;
use crate::messages::ui_events::KeyContext;
use crate::models::{DashboardTotals, PaginationSummary};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    /// Guard state, screen and input mode (also drives key mapping)
    pub keys: KeyContext,
    pub language: Language,
    pub scroll: u16,
    pub notice: Option<Notice>,

    // Login
    pub login: LoginForm,
    pub user_email: Option<String>,

    // Tables
    pub table: TableState,
    pub search: SearchState,
    pub editor: Option<RecordEditor>,
    pub role_names: Vec<String>,
    pub pending_delete: Option<String>,

    // Dashboard
    pub totals: DashboardTotals,

    // Profile
    pub profile: ProfileState,
}

impl RenderState {
    pub fn pagination(&self) -> PaginationSummary {
        PaginationSummary::new(self.table.page, self.table.total)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        crate::app::AppState::default().to_render_state()
    }
}
