//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::guard::AuthState;
use crate::models::Resource;

/// Screens of the client. `Login` is the only public one.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Screen {
    Login,
    #[default]
    Dashboard,
    Table(Resource),
    Profile,
}

impl Screen {
    /// Private screens in tab order
    pub const PRIVATE: [Screen; 7] = [
        Screen::Dashboard,
        Screen::Table(Resource::Companies),
        Screen::Table(Resource::Contacts),
        Screen::Table(Resource::Projects),
        Screen::Table(Resource::Users),
        Screen::Table(Resource::Roles),
        Screen::Profile,
    ];

    pub fn is_private(&self) -> bool {
        !matches!(self, Screen::Login)
    }

    /// Position in the tab bar
    pub fn tab_index(&self) -> Option<usize> {
        Self::PRIVATE.iter().position(|s| s == self)
    }

    pub fn next(&self) -> Screen {
        match self.tab_index() {
            Some(i) => Self::PRIVATE[(i + 1) % Self::PRIVATE.len()],
            None => *self,
        }
    }

    pub fn prev(&self) -> Screen {
        match self.tab_index() {
            Some(i) => Self::PRIVATE[(i + Self::PRIVATE.len() - 1) % Self::PRIVATE.len()],
            None => *self,
        }
    }

    pub fn resource(&self) -> Option<Resource> {
        match self {
            Screen::Table(resource) => Some(*resource),
            _ => None,
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the search box
    Search,
    /// Editing a record as JSON
    Editor,
    /// Read-only record view
    Viewer,
    ConfirmDelete,
    /// Password change form on the profile screen
    Password,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    GoTo(Screen),
    NextScreen,
    PrevScreen,
    ScrollUp,
    ScrollDown,

    // Text input (login form, search, editor, password form)
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    Newline,
    NextField,
    Submit,
    Cancel,

    // Session
    Logout,

    // Tables
    SelectNext,
    SelectPrev,
    NextPage,
    PrevPage,
    CyclePageSize,
    Refresh,
    AddRecord,
    EditRecord,
    ViewRecord,
    DeleteRecord,
    ConfirmYes,
    ToggleActive,
    StartSearch,
    ClearSearch,
    GeneratePdf,
    ViewPdf,

    // Profile
    ChangePassword,

    // Popups and settings
    ToggleLanguage,
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// What the key mapper needs to know about the current screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyContext {
    pub auth: AuthState,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub show_help: bool,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: KeyContext) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('s') if ctx.input_mode == InputMode::Editor => {
                return Some(UiEvent::Submit)
            }
            _ => return None,
        }
    }

    match ctx.auth {
        AuthState::CheckingAuth => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
            _ => None,
        },
        AuthState::Unauthenticated => handle_login_keys(key),
        AuthState::Authenticated => {
            if ctx.show_help {
                return Some(UiEvent::CloseHelp);
            }
            match ctx.input_mode {
                InputMode::Normal => handle_normal_keys(key, ctx.screen),
                InputMode::Search => match key.code {
                    KeyCode::Esc => Some(UiEvent::Cancel),
                    KeyCode::Enter => Some(UiEvent::Submit),
                    KeyCode::Backspace => Some(UiEvent::Backspace),
                    KeyCode::Left => Some(UiEvent::CursorLeft),
                    KeyCode::Right => Some(UiEvent::CursorRight),
                    KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
                    _ => None,
                },
                InputMode::Editor => match key.code {
                    KeyCode::Esc => Some(UiEvent::Cancel),
                    KeyCode::Enter => Some(UiEvent::Newline),
                    KeyCode::Backspace => Some(UiEvent::Backspace),
                    KeyCode::Left => Some(UiEvent::CursorLeft),
                    KeyCode::Right => Some(UiEvent::CursorRight),
                    KeyCode::Up => Some(UiEvent::ScrollUp),
                    KeyCode::Down => Some(UiEvent::ScrollDown),
                    KeyCode::Tab => Some(UiEvent::CharInput(' ')),
                    KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
                    _ => None,
                },
                InputMode::Viewer => match key.code {
                    KeyCode::Up => Some(UiEvent::ScrollUp),
                    KeyCode::Down => Some(UiEvent::ScrollDown),
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(UiEvent::Cancel),
                    _ => None,
                },
                InputMode::ConfirmDelete => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Some(UiEvent::ConfirmYes),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        Some(UiEvent::Cancel)
                    }
                    _ => None,
                },
                InputMode::Password => match key.code {
                    KeyCode::Esc => Some(UiEvent::Cancel),
                    KeyCode::Enter => Some(UiEvent::Submit),
                    KeyCode::Tab | KeyCode::Down => Some(UiEvent::NextField),
                    KeyCode::Backspace => Some(UiEvent::Backspace),
                    KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
                    _ => None,
                },
            }
        }
    }
}

/// Login screen: every printable key is typed into the focused field
fn handle_login_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::Quit),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => Some(UiEvent::NextField),
        KeyCode::Enter => Some(UiEvent::Submit),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::F(2) => Some(UiEvent::ToggleLanguage),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn handle_normal_keys(key: KeyEvent, screen: Screen) -> Option<UiEvent> {
    // Screen-independent keys
    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Char('l') => return Some(UiEvent::ToggleLanguage),
        KeyCode::Char('L') => return Some(UiEvent::Logout),
        KeyCode::Tab => return Some(UiEvent::NextScreen),
        KeyCode::BackTab => return Some(UiEvent::PrevScreen),
        KeyCode::Char(c @ '1'..='7') => {
            let index = c as usize - '1' as usize;
            return Some(UiEvent::GoTo(Screen::PRIVATE[index]));
        }
        _ => {}
    }

    match screen {
        Screen::Table(resource) => match key.code {
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectNext),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectPrev),
            KeyCode::Right | KeyCode::Char('n') => Some(UiEvent::NextPage),
            KeyCode::Left | KeyCode::Char('b') => Some(UiEvent::PrevPage),
            KeyCode::Char('s') => Some(UiEvent::CyclePageSize),
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            KeyCode::Char('a') => Some(UiEvent::AddRecord),
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::EditRecord),
            KeyCode::Char('v') => Some(UiEvent::ViewRecord),
            KeyCode::Char('d') | KeyCode::Delete => Some(UiEvent::DeleteRecord),
            KeyCode::Char('/') => Some(UiEvent::StartSearch),
            KeyCode::Esc => Some(UiEvent::ClearSearch),
            KeyCode::Char('t') if resource == Resource::Users => Some(UiEvent::ToggleActive),
            KeyCode::Char('p') if resource == Resource::Projects => Some(UiEvent::GeneratePdf),
            KeyCode::Char('P') if resource == Resource::Projects => Some(UiEvent::ViewPdf),
            _ => None,
        },
        Screen::Dashboard => match key.code {
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            _ => None,
        },
        Screen::Profile => match key.code {
            KeyCode::Char('c') => Some(UiEvent::ChangePassword),
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            KeyCode::Up => Some(UiEvent::ScrollUp),
            KeyCode::Down => Some(UiEvent::ScrollDown),
            _ => None,
        },
        Screen::Login => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(auth: AuthState, screen: Screen, input_mode: InputMode) -> KeyContext {
        KeyContext {
            auth,
            screen,
            input_mode,
            show_help: false,
        }
    }

    #[test]
    fn test_screen_cycle_wraps() {
        assert_eq!(Screen::Profile.next(), Screen::Dashboard);
        assert_eq!(Screen::Dashboard.prev(), Screen::Profile);
        assert_eq!(Screen::Login.next(), Screen::Login);
    }

    #[test]
    fn test_checking_auth_only_quits() {
        let c = ctx(AuthState::CheckingAuth, Screen::Dashboard, InputMode::Normal);
        assert_eq!(key_to_ui_event(press(KeyCode::Char('a')), c), None);
        assert_eq!(key_to_ui_event(press(KeyCode::Char('q')), c), Some(UiEvent::Quit));
    }

    #[test]
    fn test_login_types_letters() {
        let c = ctx(AuthState::Unauthenticated, Screen::Login, InputMode::Normal);
        assert_eq!(key_to_ui_event(press(KeyCode::Char('q')), c), Some(UiEvent::CharInput('q')));
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), c), Some(UiEvent::Submit));
    }

    #[test]
    fn test_table_keys_depend_on_resource() {
        let users = ctx(AuthState::Authenticated, Screen::Table(Resource::Users), InputMode::Normal);
        let roles = ctx(AuthState::Authenticated, Screen::Table(Resource::Roles), InputMode::Normal);
        assert_eq!(key_to_ui_event(press(KeyCode::Char('t')), users), Some(UiEvent::ToggleActive));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('t')), roles), None);
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('5')), roles),
            Some(UiEvent::GoTo(Screen::Table(Resource::Users)))
        );
    }

    #[test]
    fn test_editor_save_shortcut() {
        let c = ctx(AuthState::Authenticated, Screen::Table(Resource::Roles), InputMode::Editor);
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(key_to_ui_event(save, c), Some(UiEvent::Submit));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('s')), c), Some(UiEvent::CharInput('s')));
    }
}
