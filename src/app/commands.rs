//! Command handlers - business logic for processing UI events

use serde_json::Value;

use crate::app::forms::{validate_login, validate_password_change, validate_record};
use crate::app::guard::AuthState;
use crate::app::state::{
    EditorMode, LoginField, LoginForm, Notice, PasswordField, ProfileState, RecordEditor,
    SearchState, TableState,
};
use crate::app::AppState;
use crate::constants::PAGE_SIZE_OPTIONS;
use crate::error::ApiError;
use crate::messages::network::{ApiCall, CallKind, PdfKind};
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{record_id, DashboardTotals, PageRequest, PasswordChange, Resource};

const SESSION_EXPIRED: &str = "Session expired, please sign in again";

// Cursor helpers shared by every text field (byte offsets on char boundaries)

fn insert_at(input: &mut String, cursor: &mut usize, c: char) {
    let pos = (*cursor).min(input.len());
    input.insert(pos, c);
    *cursor = pos + c.len_utf8();
}

fn remove_before(input: &mut String, cursor: &mut usize) {
    if *cursor == 0 || *cursor > input.len() {
        return;
    }
    let prev = input[..*cursor]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0);
    input.remove(prev);
    *cursor = prev;
}

fn cursor_left(input: &str, cursor: &mut usize) {
    if *cursor > 0 {
        *cursor = input[..*cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }
}

fn cursor_right(input: &str, cursor: &mut usize) {
    if *cursor < input.len() {
        *cursor = input[*cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| *cursor + i)
            .unwrap_or(input.len());
    }
}

impl AppState {
    fn command(&mut self, call: ApiCall) -> NetworkCommand {
        NetworkCommand::Execute { id: self.next_id(), call }
    }

    /// First command of the session: the route guard check
    pub fn start(&mut self) -> NetworkCommand {
        self.auth = AuthState::CheckingAuth;
        self.command(ApiCall::Bootstrap)
    }

    // ========================
    // Navigation
    // ========================

    pub fn go_to(&mut self, screen: Screen) -> Vec<NetworkCommand> {
        if !self.auth.is_authenticated() || !screen.is_private() {
            return Vec::new();
        }
        tracing::debug!(?screen, "Navigating");
        self.screen = screen;
        self.last_private_screen = screen;
        self.input_mode = InputMode::Normal;
        self.editor = None;
        self.pending_delete = None;
        self.scroll = 0;
        self.enter_screen()
    }

    pub fn next_screen(&mut self) -> Vec<NetworkCommand> {
        self.go_to(self.screen.next())
    }

    pub fn prev_screen(&mut self) -> Vec<NetworkCommand> {
        self.go_to(self.screen.prev())
    }

    /// Load whatever the current screen shows
    fn enter_screen(&mut self) -> Vec<NetworkCommand> {
        match self.screen {
            Screen::Login => Vec::new(),
            Screen::Dashboard => vec![self.command(ApiCall::DashboardTotals)],
            Screen::Table(resource) => {
                if self.table.resource != resource {
                    self.table = TableState::new(resource, self.page_size);
                    self.search = SearchState::default();
                }
                self.fetch_page().into_iter().collect()
            }
            Screen::Profile => self.fetch_profile().into_iter().collect(),
        }
    }

    pub fn refresh(&mut self) -> Vec<NetworkCommand> {
        self.enter_screen()
    }

    pub fn scroll_up(&mut self) {
        match self.editor.as_mut() {
            Some(editor) => editor.scroll = editor.scroll.saturating_sub(1),
            None => self.scroll = self.scroll.saturating_sub(1),
        }
    }

    pub fn scroll_down(&mut self) {
        match self.editor.as_mut() {
            Some(editor) => editor.scroll = editor.scroll.saturating_add(1),
            None => self.scroll = self.scroll.saturating_add(1),
        }
    }

    pub fn toggle_language(&mut self) {
        self.language = self.language.toggle();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Text input
    // ========================

    /// The field keystrokes currently go to
    fn focused_input(&mut self) -> Option<(&mut String, &mut usize)> {
        if self.auth == AuthState::Unauthenticated {
            let login = &mut self.login;
            let field = match login.field {
                LoginField::Email => &mut login.email,
                LoginField::Password => &mut login.password,
            };
            return Some((field, &mut login.cursor));
        }
        match self.input_mode {
            InputMode::Search => Some((&mut self.search.input, &mut self.search.cursor)),
            InputMode::Editor => self
                .editor
                .as_mut()
                .map(|editor| (&mut editor.buffer, &mut editor.cursor)),
            _ => None,
        }
    }

    fn focused_password(&mut self) -> Option<&mut String> {
        if self.input_mode != InputMode::Password {
            return None;
        }
        Some(match self.profile.field {
            PasswordField::Current => &mut self.profile.current_password,
            PasswordField::New => &mut self.profile.new_password,
            PasswordField::Confirm => &mut self.profile.confirm_password,
        })
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(field) = self.focused_password() {
            field.push(c);
        } else if let Some((input, cursor)) = self.focused_input() {
            insert_at(input, cursor, c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.focused_password() {
            field.pop();
        } else if let Some((input, cursor)) = self.focused_input() {
            remove_before(input, cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some((input, cursor)) = self.focused_input() {
            cursor_left(input, cursor);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some((input, cursor)) = self.focused_input() {
            cursor_right(input, cursor);
        }
    }

    pub fn newline(&mut self) {
        if self.input_mode == InputMode::Editor {
            self.enter_char('\n');
        }
    }

    pub fn next_field(&mut self) {
        if self.auth == AuthState::Unauthenticated {
            self.login.field = match self.login.field {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
            self.login.cursor = match self.login.field {
                LoginField::Email => self.login.email.len(),
                LoginField::Password => self.login.password.len(),
            };
        } else if self.input_mode == InputMode::Password {
            self.profile.field = self.profile.field.next();
        }
    }

    /// Enter: submits whatever form has focus
    pub fn submit(&mut self) -> Vec<NetworkCommand> {
        if self.auth == AuthState::Unauthenticated {
            return self.submit_login().into_iter().collect();
        }
        match self.input_mode {
            InputMode::Search => self.submit_search().into_iter().collect(),
            InputMode::Editor => self.save_record().into_iter().collect(),
            InputMode::Password => self.submit_password().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Esc: leaves the current dialog
    pub fn cancel(&mut self) {
        match self.input_mode {
            InputMode::Editor | InputMode::Viewer => self.editor = None,
            InputMode::ConfirmDelete => self.pending_delete = None,
            InputMode::Password => {
                self.profile.clear_passwords();
                self.profile.errors.clear();
            }
            InputMode::Search | InputMode::Normal => {}
        }
        self.input_mode = InputMode::Normal;
    }

    // ========================
    // Session
    // ========================

    pub fn submit_login(&mut self) -> Option<NetworkCommand> {
        if self.login.submitting {
            return None;
        }
        self.login.message = None;
        self.login.errors = validate_login(&self.login.email, &self.login.password);
        if !self.login.errors.is_empty() {
            return None;
        }
        self.login.submitting = true;
        let call = ApiCall::Login {
            email: self.login.email.trim().to_string(),
            password: self.login.password.clone(),
        };
        Some(self.command(call))
    }

    pub fn logout(&mut self) -> Option<NetworkCommand> {
        if !self.auth.is_authenticated() {
            return None;
        }
        Some(self.command(ApiCall::Logout))
    }

    /// Drop every private view and show the login screen
    fn sign_out(&mut self) {
        self.auth = AuthState::Unauthenticated;
        self.screen = Screen::Login;
        self.input_mode = InputMode::Normal;
        self.show_help = false;
        self.user_email = None;
        self.table = TableState::new(self.table.resource, self.page_size);
        self.search = SearchState::default();
        self.editor = None;
        self.pending_delete = None;
        self.totals = DashboardTotals::default();
        self.profile = ProfileState::default();
        self.pending_page_id = None;
        self.login.submitting = false;
        self.login.password.clear();
        self.login.field = LoginField::Email;
        self.login.cursor = self.login.email.len();
    }

    // ========================
    // Tables
    // ========================

    /// Request the current page, or the active search
    pub fn fetch_page(&mut self) -> Option<NetworkCommand> {
        let resource = self.screen.resource()?;
        let call = match &self.search.active {
            Some(term) => ApiCall::Search { resource, term: term.clone() },
            None => ApiCall::FetchPage { resource, page: self.table.page },
        };
        let id = self.next_id();
        self.table.loading = true;
        self.pending_page_id = Some(id);
        Some(NetworkCommand::Execute { id, call })
    }

    pub fn select_next(&mut self) {
        if !self.table.rows.is_empty() {
            self.table.selected = (self.table.selected + 1) % self.table.rows.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.table.rows.is_empty() {
            self.table.selected = self
                .table
                .selected
                .checked_sub(1)
                .unwrap_or(self.table.rows.len() - 1);
        }
    }

    pub fn next_page(&mut self) -> Option<NetworkCommand> {
        if self.search.active.is_some() {
            return None;
        }
        let page = self.table.page;
        let shown = u64::from(page.page_index + 1) * u64::from(page.page_size);
        if shown >= self.table.total {
            return None;
        }
        self.table.page = PageRequest::new(page.page_index + 1, page.page_size);
        self.table.selected = 0;
        self.fetch_page()
    }

    pub fn prev_page(&mut self) -> Option<NetworkCommand> {
        if self.search.active.is_some() || self.table.page.page_index == 0 {
            return None;
        }
        let page = self.table.page;
        self.table.page = PageRequest::new(page.page_index - 1, page.page_size);
        self.table.selected = 0;
        self.fetch_page()
    }

    /// 10 → 20 → 50 → 100 → 10; goes back to the first page
    pub fn cycle_page_size(&mut self) -> Option<NetworkCommand> {
        let current = self.table.page.page_size;
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .copied()
            .find(|size| *size > current)
            .unwrap_or(PAGE_SIZE_OPTIONS[0]);
        self.page_size = next;
        self.table.page = PageRequest::new(0, next);
        self.table.selected = 0;
        self.fetch_page()
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search.cursor = self.search.input.len();
    }

    /// Empty term returns to paging
    pub fn submit_search(&mut self) -> Option<NetworkCommand> {
        self.input_mode = InputMode::Normal;
        let term = self.search.input.trim();
        self.search.active = if term.is_empty() { None } else { Some(term.to_string()) };
        self.table.page = PageRequest::new(0, self.table.page.page_size);
        self.table.selected = 0;
        self.fetch_page()
    }

    pub fn clear_search(&mut self) -> Option<NetworkCommand> {
        if self.search.active.is_none() && self.search.input.is_empty() {
            return None;
        }
        self.search = SearchState::default();
        self.submit_search()
    }

    fn selected_id(&mut self) -> Option<String> {
        let id = self.table.selected_row().and_then(record_id);
        if id.is_none() {
            self.notice = Some(Notice::error("No record selected"));
        }
        id
    }

    pub fn add_record(&mut self) -> Vec<NetworkCommand> {
        let Some(resource) = self.screen.resource() else {
            return Vec::new();
        };
        self.editor = Some(RecordEditor::new(resource, EditorMode::Add, &resource.template()));
        self.input_mode = InputMode::Editor;
        match resource {
            Resource::Users => self.load_role_names().into_iter().collect(),
            Resource::Roles => vec![self.command(ApiCall::AdminPermissions)],
            _ => Vec::new(),
        }
    }

    pub fn edit_record(&mut self) -> Vec<NetworkCommand> {
        let Some(resource) = self.screen.resource() else {
            return Vec::new();
        };
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let record = self.table.selected_row().cloned().unwrap_or(Value::Null);
        self.editor = Some(RecordEditor::new(
            resource,
            EditorMode::Edit { id: id.clone() },
            &record,
        ));
        self.input_mode = InputMode::Editor;
        match resource {
            Resource::Users => self.load_role_names().into_iter().collect(),
            Resource::Roles => vec![self.command(ApiCall::RolePermissions { id })],
            _ => Vec::new(),
        }
    }

    pub fn view_record(&mut self) {
        let Some(resource) = self.screen.resource() else {
            return;
        };
        if let Some(record) = self.table.selected_row() {
            self.editor = Some(RecordEditor::new(resource, EditorMode::View, record));
            self.input_mode = InputMode::Viewer;
        }
    }

    fn load_role_names(&mut self) -> Option<NetworkCommand> {
        if self.role_names.is_empty() {
            Some(self.command(ApiCall::RoleNames))
        } else {
            None
        }
    }

    /// Validate the edited JSON and send it
    pub fn save_record(&mut self) -> Option<NetworkCommand> {
        let editor = self.editor.as_mut()?;
        if editor.saving {
            return None;
        }
        editor.errors.clear();

        let record: Value = match serde_json::from_str(&editor.buffer) {
            Ok(record) => record,
            Err(e) => {
                editor.errors.insert("record".into(), format!("Invalid JSON: {}", e));
                return None;
            }
        };
        editor.errors = validate_record(editor.resource, &record, editor.is_new());
        if !editor.errors.is_empty() {
            return None;
        }

        let resource = editor.resource;
        let call = match &editor.mode {
            EditorMode::Add => ApiCall::Create { resource, record },
            EditorMode::Edit { id } => ApiCall::Update { resource, id: id.clone(), record },
            EditorMode::View => return None,
        };
        editor.saving = true;
        Some(self.command(call))
    }

    pub fn delete_record(&mut self) {
        if self.screen.resource().is_none() {
            return;
        }
        if let Some(id) = self.selected_id() {
            self.pending_delete = Some(id);
            self.input_mode = InputMode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) -> Option<NetworkCommand> {
        let resource = self.screen.resource()?;
        let id = self.pending_delete.take()?;
        self.input_mode = InputMode::Normal;
        Some(self.command(ApiCall::Delete { resource, id }))
    }

    pub fn toggle_active(&mut self) -> Option<NetworkCommand> {
        if self.screen != Screen::Table(Resource::Users) {
            return None;
        }
        let id = self.selected_id()?;
        let active = self
            .table
            .selected_row()
            .and_then(|row| row.get("isActive"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Some(self.command(ApiCall::SetUserActive { id, active: !active }))
    }

    /// Ask the backend for the selected project's PDF
    pub fn request_pdf(&mut self, kind: PdfKind) -> Option<NetworkCommand> {
        if self.screen != Screen::Table(Resource::Projects) {
            return None;
        }
        let id = self.selected_id()?;
        let payload = self.table.selected_row().cloned().unwrap_or(Value::Null);
        self.notice = Some(Notice::info("Requesting PDF..."));
        Some(self.command(ApiCall::Pdf { kind, id, payload }))
    }

    // ========================
    // Profile
    // ========================

    fn fetch_profile(&mut self) -> Option<NetworkCommand> {
        let email = self.user_email.clone()?;
        self.profile.loading = true;
        Some(self.command(ApiCall::Profile { email }))
    }

    pub fn change_password(&mut self) {
        if self.screen == Screen::Profile {
            self.profile.clear_passwords();
            self.profile.errors.clear();
            self.input_mode = InputMode::Password;
        }
    }

    pub fn submit_password(&mut self) -> Option<NetworkCommand> {
        if self.profile.saving {
            return None;
        }
        let profile = &mut self.profile;
        profile.errors = validate_password_change(
            &profile.current_password,
            &profile.new_password,
            &profile.confirm_password,
        );
        let email = self.user_email.clone().or_else(|| {
            profile
                .user
                .as_ref()
                .and_then(|u| u.get("userEmail"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        let Some(email) = email else {
            profile.errors.insert("form".into(), "Unknown account, sign in again".into());
            return None;
        };
        if !profile.errors.is_empty() {
            return None;
        }
        profile.saving = true;
        let change = PasswordChange {
            email,
            current_password: profile.current_password.clone(),
            new_password: profile.new_password.clone(),
        };
        Some(self.command(ApiCall::UpdatePassword(change)))
    }

    // ========================
    // Network responses
    // ========================

    /// Apply a network response; may ask for follow-up calls
    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        match response {
            NetworkResponse::Bootstrapped { state, .. } => {
                tracing::debug!(?state, "Route guard settled");
                self.auth = state;
                if state.is_authenticated() {
                    self.screen = self.last_private_screen;
                    return self.enter_screen();
                }
                self.sign_out();
            }

            NetworkResponse::LoggedIn { .. } => {
                self.auth = AuthState::Authenticated;
                self.user_email = Some(self.login.email.trim().to_lowercase());
                self.login = LoginForm::default();
                self.notice = None;
                self.screen = self.last_private_screen;
                return self.enter_screen();
            }

            NetworkResponse::LoggedOut { .. } => {
                self.sign_out();
                self.notice = Some(Notice::info("Signed out"));
            }

            NetworkResponse::SessionExpired { .. } => {
                if self.auth == AuthState::Unauthenticated {
                    return Vec::new();
                }
                tracing::debug!("Session expired, back to login");
                self.sign_out();
                self.login.message = Some(SESSION_EXPIRED.to_string());
                self.notice = Some(Notice::error(SESSION_EXPIRED));
            }

            NetworkResponse::Page { id, resource, rows, total } => {
                if self.pending_page_id != Some(id) || self.table.resource != resource {
                    tracing::debug!(id, "Dropping stale page");
                    return Vec::new();
                }
                self.pending_page_id = None;
                self.table.loading = false;
                self.table.rows = rows;
                self.table.total = total;
                self.table.clamp_selection();
            }

            NetworkResponse::Created { resource, .. } => {
                self.close_editor_for(resource);
                self.notice = Some(Notice::info("Record created"));
                if self.screen == Screen::Table(resource) {
                    return self.fetch_page().into_iter().collect();
                }
            }

            NetworkResponse::Updated { resource, record_id: updated, record, .. } => {
                self.close_editor_for(resource);
                if self.table.resource == resource {
                    if let Some(row) = self
                        .table
                        .rows
                        .iter_mut()
                        .find(|row| record_id(row).as_deref() == Some(updated.as_str()))
                    {
                        *row = record;
                    }
                }
                self.notice = Some(Notice::info("Record updated"));
            }

            NetworkResponse::Deleted { resource, record_id: deleted, .. } => {
                if self.table.resource == resource {
                    let before = self.table.rows.len();
                    self.table
                        .rows
                        .retain(|row| record_id(row).as_deref() != Some(deleted.as_str()));
                    if self.table.rows.len() < before {
                        self.table.total = self.table.total.saturating_sub(1);
                    }
                    self.table.clamp_selection();
                }
                self.notice = Some(Notice::info("Record deleted"));
            }

            NetworkResponse::UserActiveSet { record_id: user, active, .. } => {
                if self.table.resource == Resource::Users {
                    for row in self.table.rows.iter_mut() {
                        if record_id(row).as_deref() == Some(user.as_str()) {
                            if let Value::Object(fields) = row {
                                fields.insert("isActive".into(), Value::Bool(active));
                            }
                        }
                    }
                }
            }

            NetworkResponse::Totals { totals, .. } => self.totals = totals,

            NetworkResponse::RoleNames { names, .. } => self.role_names = names,

            NetworkResponse::Permissions { permissions, .. } => {
                if let Some(editor) = self.editor.as_mut() {
                    if editor.resource == Resource::Roles && editor.mode != EditorMode::View {
                        if let Ok(value) = serde_json::to_value(&permissions) {
                            editor.merge_field("rolePermission", value);
                        }
                    }
                }
            }

            NetworkResponse::Profile { user, .. } => {
                self.profile.loading = false;
                self.profile.user = Some(user);
            }

            NetworkResponse::PasswordUpdated { .. } => {
                self.profile.saving = false;
                self.profile.clear_passwords();
                self.profile.errors.clear();
                if self.input_mode == InputMode::Password {
                    self.input_mode = InputMode::Normal;
                }
                self.notice = Some(Notice::info("Password updated"));
            }

            NetworkResponse::PdfSaved { path, .. } => {
                self.notice = Some(Notice::info(format!("Saved {}", path.display())));
            }

            NetworkResponse::SaveFailed { message, .. } => {
                self.notice = Some(Notice::error(message));
            }

            NetworkResponse::Failed { id, call, error } => self.handle_failure(id, call, error),
        }
        Vec::new()
    }

    fn close_editor_for(&mut self, resource: Resource) {
        if self.editor.as_ref().map(|e| e.resource) == Some(resource) {
            self.editor = None;
            if matches!(self.input_mode, InputMode::Editor | InputMode::Viewer) {
                self.input_mode = InputMode::Normal;
            }
        }
    }

    fn handle_failure(&mut self, id: u64, call: CallKind, error: ApiError) {
        match call {
            CallKind::Login => {
                self.login.submitting = false;
                self.login.message = Some(match &error {
                    ApiError::Status { .. } => "Invalid username or password".to_string(),
                    ApiError::Decode(_) => "Login failed, please try again".to_string(),
                    other => other.to_string(),
                });
            }

            CallKind::Page | CallKind::Search => {
                if self.pending_page_id == Some(id) {
                    self.pending_page_id = None;
                    self.table.loading = false;
                    self.notice = Some(Notice::error(format!("Failed to load rows: {}", error)));
                }
            }

            CallKind::Create | CallKind::Update => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.saving = false;
                    if editor.resource == Resource::Users && error.is_conflict() {
                        editor
                            .errors
                            .insert("userEmail".into(), "Email address already exists".into());
                    } else {
                        editor.errors.insert("record".into(), error.to_string());
                    }
                }
            }

            CallKind::Profile => {
                self.profile.loading = false;
                self.notice = Some(Notice::error(format!("Error loading user: {}", error)));
            }

            CallKind::Password => {
                self.profile.saving = false;
                self.profile
                    .errors
                    .insert("form".into(), format!("Failed to update password: {}", error));
            }

            // Counters stay at zero, lists stay empty; the actor already logged it.
            CallKind::Totals | CallKind::RoleNames | CallKind::Permissions => {}

            CallKind::Delete => {
                self.notice = Some(Notice::error(format!("Failed to delete: {}", error)));
            }
            CallKind::UserActive => {
                self.notice = Some(Notice::error(format!("Failed to update status: {}", error)));
            }
            CallKind::Pdf => {
                self.notice = Some(Notice::error(format!("PDF request failed: {}", error)));
            }
            CallKind::Bootstrap | CallKind::Logout => {
                self.notice = Some(Notice::error(error.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use serde_json::json;

    fn call_of(cmd: &NetworkCommand) -> &ApiCall {
        match cmd {
            NetworkCommand::Execute { call, .. } => call,
            NetworkCommand::Shutdown => panic!("unexpected shutdown"),
        }
    }

    fn id_of(cmd: &NetworkCommand) -> u64 {
        match cmd {
            NetworkCommand::Execute { id, .. } => *id,
            NetworkCommand::Shutdown => panic!("unexpected shutdown"),
        }
    }

    fn signed_in() -> AppState {
        let mut state = AppState::new(Language::En, 20);
        state.handle_response(NetworkResponse::Bootstrapped {
            id: 0,
            state: AuthState::Authenticated,
        });
        state
    }

    /// Signed in, on `resource`, with a page of rows loaded
    fn on_table(resource: Resource, rows: Vec<Value>, total: u64) -> AppState {
        let mut state = signed_in();
        let cmds = state.go_to(Screen::Table(resource));
        let id = id_of(&cmds[0]);
        state.handle_response(NetworkResponse::Page { id, resource, rows, total });
        state
    }

    #[test]
    fn test_bootstrap_routes_by_guard_state() {
        let mut state = AppState::new(Language::En, 20);
        assert!(matches!(call_of(&state.start()), ApiCall::Bootstrap));
        assert_eq!(state.auth, AuthState::CheckingAuth);

        let cmds = state.handle_response(NetworkResponse::Bootstrapped {
            id: 1,
            state: AuthState::Unauthenticated,
        });
        assert!(cmds.is_empty());
        assert_eq!(state.screen, Screen::Login);

        let mut state = AppState::new(Language::En, 20);
        let cmds = state.handle_response(NetworkResponse::Bootstrapped {
            id: 1,
            state: AuthState::Authenticated,
        });
        assert_eq!(state.screen, Screen::Dashboard);
        assert!(matches!(call_of(&cmds[0]), ApiCall::DashboardTotals));
    }

    #[test]
    fn test_login_requires_fields_before_sending() {
        let mut state = AppState::new(Language::En, 20);
        state.handle_response(NetworkResponse::Bootstrapped {
            id: 1,
            state: AuthState::Unauthenticated,
        });
        assert!(state.submit().is_empty());
        assert_eq!(state.login.errors["email"], "Email is required");

        for c in "Admin@Example.com".chars() {
            state.enter_char(c);
        }
        state.next_field();
        for c in "secret".chars() {
            state.enter_char(c);
        }
        let cmds = state.submit();
        match call_of(&cmds[0]) {
            ApiCall::Login { email, password } => {
                assert_eq!(email, "Admin@Example.com");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected call: {other:?}"),
        }
        // no double submit while in flight
        assert!(state.submit().is_empty());
    }

    #[test]
    fn test_login_failure_messages() {
        let mut state = AppState::new(Language::En, 20);
        state.auth = AuthState::Unauthenticated;
        state.login.submitting = true;
        state.handle_response(NetworkResponse::Failed {
            id: 1,
            call: CallKind::Login,
            error: ApiError::Status { status: 401, body: String::new() },
        });
        assert_eq!(state.login.message.as_deref(), Some("Invalid username or password"));
        assert!(!state.login.submitting);

        state.handle_response(NetworkResponse::Failed {
            id: 2,
            call: CallKind::Login,
            error: ApiError::Decode("no token".into()),
        });
        assert_eq!(state.login.message.as_deref(), Some("Login failed, please try again"));
    }

    #[test]
    fn test_session_expiry_returns_to_login_then_restores_screen() {
        let mut state = on_table(Resource::Projects, vec![json!({"id": 1})], 1);
        state.handle_response(NetworkResponse::SessionExpired { id: 9 });
        assert_eq!(state.auth, AuthState::Unauthenticated);
        assert_eq!(state.screen, Screen::Login);
        assert!(state.table.rows.is_empty());
        assert_eq!(state.login.message.as_deref(), Some(SESSION_EXPIRED));

        state.login.email = "a@b.c".into();
        let cmds = state.handle_response(NetworkResponse::LoggedIn { id: 10 });
        assert_eq!(state.screen, Screen::Table(Resource::Projects));
        assert_eq!(state.user_email.as_deref(), Some("a@b.c"));
        assert!(matches!(call_of(&cmds[0]), ApiCall::FetchPage { resource: Resource::Projects, .. }));
    }

    #[test]
    fn test_private_navigation_blocked_when_signed_out() {
        let mut state = AppState::new(Language::En, 20);
        state.auth = AuthState::Unauthenticated;
        state.screen = Screen::Login;
        assert!(state.go_to(Screen::Table(Resource::Users)).is_empty());
        assert_eq!(state.screen, Screen::Login);
    }

    #[test]
    fn test_stale_page_is_dropped() {
        let mut state = signed_in();
        let first = state.go_to(Screen::Table(Resource::Companies));
        let second = state.refresh();

        state.handle_response(NetworkResponse::Page {
            id: id_of(&first[0]),
            resource: Resource::Companies,
            rows: vec![json!({"id": "old"})],
            total: 1,
        });
        assert!(state.table.rows.is_empty());
        assert!(state.table.loading);

        state.handle_response(NetworkResponse::Page {
            id: id_of(&second[0]),
            resource: Resource::Companies,
            rows: vec![json!({"id": "new"})],
            total: 1,
        });
        assert_eq!(state.table.rows[0]["id"], "new");
        assert!(!state.table.loading);
    }

    #[test]
    fn test_paging_stays_in_range() {
        let mut state = on_table(Resource::Contacts, vec![json!({"id": 1}); 20], 45);
        assert!(state.prev_page().is_none());

        let cmd = state.next_page().unwrap();
        match call_of(&cmd) {
            ApiCall::FetchPage { page, .. } => assert_eq!(page.page_index, 1),
            other => panic!("unexpected call: {other:?}"),
        }
        state.next_page();
        assert_eq!(state.table.page.page_index, 2);
        assert!(state.next_page().is_none());
    }

    #[test]
    fn test_page_size_cycle_resets_index() {
        let mut state = on_table(Resource::Users, Vec::new(), 0);
        state.table.page = PageRequest::new(3, 20);
        state.cycle_page_size();
        assert_eq!(state.table.page, PageRequest::new(0, 50));
        state.cycle_page_size();
        state.cycle_page_size();
        assert_eq!(state.table.page.page_size, 10);
        assert_eq!(state.page_size, 10);
    }

    #[test]
    fn test_search_and_clear() {
        let mut state = on_table(Resource::Projects, Vec::new(), 0);
        state.start_search();
        for c in "film".chars() {
            state.enter_char(c);
        }
        let cmds = state.submit();
        match call_of(&cmds[0]) {
            ApiCall::Search { term, .. } => assert_eq!(term, "film"),
            other => panic!("unexpected call: {other:?}"),
        }
        assert_eq!(state.input_mode, InputMode::Normal);

        let cmd = state.clear_search().unwrap();
        assert!(matches!(call_of(&cmd), ApiCall::FetchPage { .. }));
        assert_eq!(state.search.active, None);
    }

    #[test]
    fn test_duplicate_email_lands_on_field() {
        let mut state = on_table(Resource::Users, Vec::new(), 0);
        state.add_record();
        let editor = state.editor.as_mut().unwrap();
        editor.buffer = json!({
            "userFirstName": "Ada",
            "userEmail": "ada@example.com",
            "userPass": "pw",
            "userRoles": "Admin"
        })
        .to_string();

        let cmd = state.save_record().unwrap();
        assert!(matches!(call_of(&cmd), ApiCall::Create { resource: Resource::Users, .. }));

        state.handle_response(NetworkResponse::Failed {
            id: id_of(&cmd),
            call: CallKind::Create,
            error: ApiError::Status { status: 409, body: "409".into() },
        });
        let editor = state.editor.as_ref().unwrap();
        assert_eq!(editor.errors["userEmail"], "Email address already exists");
        assert!(!editor.saving);
    }

    #[test]
    fn test_invalid_json_is_not_sent() {
        let mut state = on_table(Resource::Companies, Vec::new(), 0);
        state.add_record();
        state.editor.as_mut().unwrap().buffer = "{ nope".into();
        assert!(state.save_record().is_none());
        assert!(state.editor.as_ref().unwrap().errors["record"].starts_with("Invalid JSON"));
    }

    #[test]
    fn test_create_refetches() {
        let mut state = on_table(Resource::Roles, Vec::new(), 0);
        state.add_record();
        let cmds = state.handle_response(NetworkResponse::Created {
            id: 50,
            resource: Resource::Roles,
            record: Value::Null,
        });
        assert!(state.editor.is_none());
        assert!(matches!(call_of(&cmds[0]), ApiCall::FetchPage { .. }));
    }

    #[test]
    fn test_update_and_delete_patch_rows() {
        let rows = vec![json!({"id": 1, "title": "A"}), json!({"id": 2, "title": "B"})];
        let mut state = on_table(Resource::Projects, rows, 2);

        state.handle_response(NetworkResponse::Updated {
            id: 60,
            resource: Resource::Projects,
            record_id: "2".into(),
            record: json!({"id": 2, "title": "B2"}),
        });
        assert_eq!(state.table.rows[1]["title"], "B2");

        state.table.selected = 1;
        state.delete_record();
        assert_eq!(state.input_mode, InputMode::ConfirmDelete);
        let cmd = state.confirm_delete().unwrap();
        assert!(matches!(call_of(&cmd), ApiCall::Delete { id, .. } if id == "2"));

        state.handle_response(NetworkResponse::Deleted {
            id: id_of(&cmd),
            resource: Resource::Projects,
            record_id: "2".into(),
        });
        assert_eq!(state.table.rows.len(), 1);
        assert_eq!(state.table.total, 1);
        assert_eq!(state.table.selected, 0);
    }

    #[test]
    fn test_toggle_active() {
        let mut state = on_table(Resource::Users, vec![json!({"id": 5, "isActive": true})], 1);
        let cmd = state.toggle_active().unwrap();
        assert!(matches!(
            call_of(&cmd),
            ApiCall::SetUserActive { id, active: false } if id == "5"
        ));
        state.handle_response(NetworkResponse::UserActiveSet {
            id: id_of(&cmd),
            record_id: "5".into(),
            active: false,
        });
        assert_eq!(state.table.rows[0]["isActive"], false);
    }

    #[test]
    fn test_role_editor_gets_permission_template() {
        let mut state = on_table(Resource::Roles, Vec::new(), 0);
        let cmds = state.add_record();
        assert!(matches!(call_of(&cmds[0]), ApiCall::AdminPermissions));

        let mut permissions = crate::models::RolePermissions::new();
        permissions.insert("Node".into(), crate::models::Permission {
            read: true,
            write: false,
            option: "all".into(),
        });
        state.handle_response(NetworkResponse::Permissions { id: id_of(&cmds[0]), permissions });

        let buffer: Value = serde_json::from_str(&state.editor.as_ref().unwrap().buffer).unwrap();
        assert_eq!(buffer["rolePermission"]["Node"]["read"], true);
    }

    #[test]
    fn test_password_mismatch_is_local() {
        let mut state = signed_in();
        state.user_email = Some("a@b.c".into());
        state.go_to(Screen::Profile);
        state.change_password();
        state.enter_char('o');
        state.next_field();
        state.enter_char('n');
        state.next_field();
        state.enter_char('x');
        assert!(state.submit().is_empty());
        assert_eq!(
            state.profile.errors["confirmPassword"],
            "New password and confirmation do not match!"
        );
    }

    #[test]
    fn test_logout_flow() {
        let mut state = signed_in();
        let cmd = state.logout().unwrap();
        assert!(matches!(call_of(&cmd), ApiCall::Logout));
        state.handle_response(NetworkResponse::LoggedOut { id: id_of(&cmd) });
        assert_eq!(state.screen, Screen::Login);
        assert!(state.logout().is_none());
    }

    #[test]
    fn test_cursor_editing_is_char_safe() {
        let mut input = String::from("äb");
        let mut cursor = input.len();
        cursor_left(&input, &mut cursor);
        assert_eq!(cursor, 2);
        remove_before(&mut input, &mut cursor);
        assert_eq!(input, "b");
        assert_eq!(cursor, 0);
        insert_at(&mut input, &mut cursor, 'ü');
        cursor_right(&input, &mut cursor);
        assert_eq!(cursor, input.len());
    }
}
