//! App state - pure data structure with no I/O logic

use serde_json::Value;

use crate::app::forms::FieldErrors;
use crate::app::guard::AuthState;
use crate::i18n::Language;
use crate::messages::ui_events::{InputMode, KeyContext, Screen};
use crate::messages::RenderState;
use crate::models::{DashboardTotals, PageRequest, Resource};

/// Focused field of the login form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub field: LoginField,
    pub cursor: usize,
    pub errors: FieldErrors,
    /// Server-side failure shown under the form
    pub message: Option<String>,
    pub submitting: bool,
}

/// The server-paged grid on a table screen
#[derive(Clone, Debug)]
pub struct TableState {
    pub resource: Resource,
    pub rows: Vec<Value>,
    pub total: u64,
    pub page: PageRequest,
    pub selected: usize,
    pub loading: bool,
}

impl TableState {
    pub fn new(resource: Resource, page_size: u32) -> Self {
        TableState {
            resource,
            rows: Vec::new(),
            total: 0,
            page: PageRequest::new(0, page_size),
            selected: 0,
            loading: false,
        }
    }

    pub fn selected_row(&self) -> Option<&Value> {
        self.rows.get(self.selected)
    }

    /// Keep the selection inside the current rows
    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchState {
    /// Text in the search box
    pub input: String,
    pub cursor: usize,
    /// Term whose results are on screen; `None` while paging
    pub active: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorMode {
    Add,
    Edit { id: String },
    View,
}

/// Add / edit / view dialog; the record is edited as pretty JSON
#[derive(Clone, Debug)]
pub struct RecordEditor {
    pub resource: Resource,
    pub mode: EditorMode,
    pub buffer: String,
    pub cursor: usize,
    pub scroll: u16,
    pub errors: FieldErrors,
    pub saving: bool,
}

impl RecordEditor {
    pub fn new(resource: Resource, mode: EditorMode, record: &Value) -> Self {
        let buffer = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
        RecordEditor {
            resource,
            mode,
            cursor: buffer.len(),
            buffer,
            scroll: 0,
            errors: FieldErrors::new(),
            saving: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.mode == EditorMode::Add
    }

    /// Add `key` to the edited object unless the user already has it
    pub fn merge_field(&mut self, key: &str, value: Value) {
        let Ok(Value::Object(mut record)) = serde_json::from_str::<Value>(&self.buffer) else {
            return;
        };
        if !record.contains_key(key) {
            record.insert(key.to_string(), value);
            let record = Value::Object(record);
            self.buffer = serde_json::to_string_pretty(&record).unwrap_or_else(|_| record.to_string());
            self.cursor = self.cursor.min(self.buffer.len());
        }
    }
}

/// Focused field of the password form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PasswordField {
    #[default]
    Current,
    New,
    Confirm,
}

impl PasswordField {
    pub fn next(&self) -> PasswordField {
        match self {
            PasswordField::Current => PasswordField::New,
            PasswordField::New => PasswordField::Confirm,
            PasswordField::Confirm => PasswordField::Current,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProfileState {
    pub user: Option<Value>,
    pub loading: bool,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub field: PasswordField,
    pub errors: FieldErrors,
    pub saving: bool,
}

impl ProfileState {
    pub fn clear_passwords(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
        self.field = PasswordField::Current;
    }
}

/// One-line message in the status bar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice { text: text.into(), is_error: false }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice { text: text.into(), is_error: true }
    }
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Route guard
    pub auth: AuthState,
    pub screen: Screen,
    /// Where a successful login lands
    pub last_private_screen: Screen,

    // UI state
    pub input_mode: InputMode,
    pub language: Language,
    pub scroll: u16,
    pub show_help: bool,
    pub notice: Option<Notice>,

    // Forms
    pub login: LoginForm,
    /// E-mail of the signed-in user (unknown for restored sessions)
    pub user_email: Option<String>,

    // Data
    pub page_size: u32,
    pub table: TableState,
    pub search: SearchState,
    pub editor: Option<RecordEditor>,
    pub pending_delete: Option<String>,
    pub totals: DashboardTotals,
    pub role_names: Vec<String>,
    pub profile: ProfileState,

    // Requests
    pub next_request_id: u64,
    /// Only the latest page/search response is applied
    pub pending_page_id: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Language::default(), crate::constants::DEFAULT_PAGE_SIZE)
    }
}

impl AppState {
    pub fn new(language: Language, page_size: u32) -> Self {
        AppState {
            auth: AuthState::CheckingAuth,
            screen: Screen::Dashboard,
            last_private_screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            language,
            scroll: 0,
            show_help: false,
            notice: None,
            login: LoginForm::default(),
            user_email: None,
            page_size,
            table: TableState::new(Resource::Companies, page_size),
            search: SearchState::default(),
            editor: None,
            pending_delete: None,
            totals: DashboardTotals::default(),
            role_names: Vec::new(),
            profile: ProfileState::default(),
            next_request_id: 1,
            pending_page_id: None,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn key_context(&self) -> KeyContext {
        KeyContext {
            auth: self.auth,
            screen: self.screen,
            input_mode: self.input_mode,
            show_help: self.show_help,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            keys: self.key_context(),
            language: self.language,
            scroll: self.scroll,
            notice: self.notice.clone(),
            login: self.login.clone(),
            user_email: self.user_email.clone(),
            table: self.table.clone(),
            search: self.search.clone(),
            editor: self.editor.clone(),
            role_names: self.role_names.clone(),
            pending_delete: self.pending_delete.clone(),
            totals: self.totals.clone(),
            profile: self.profile.clone(),
        }
    }
}
