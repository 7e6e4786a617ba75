//! ProjeXion TUI - terminal admin client for the ProjeXion backend
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - route guard and screen state machine
//! - Network Layer (Tokio) - authenticated backend calls with token renewal

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use projexion_tui::app::state::{EditorMode, LoginField, PasswordField};
use projexion_tui::app::AppActor;
use projexion_tui::app::AuthState;
use projexion_tui::config::Config;
use projexion_tui::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use projexion_tui::messages::ui_events::{key_to_ui_event, InputMode, Screen};
use projexion_tui::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use projexion_tui::models::{ColumnKind, Resource};
use projexion_tui::network::{ApiClient, NetworkActor};
use projexion_tui::session::Session;
use projexion_tui::storage::Storage;
use projexion_tui::ui::{self, highlight_json, render_tabs};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let log_dir = Config::config_dir();
    let log_dir = if std::fs::create_dir_all(&log_dir).is_ok() {
        log_dir
    } else {
        ".".into()
    };
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(api_url = %config.api_url, language = config.language.code(), "Starting {} {}", APP_NAME, APP_VERSION);

    let session = Arc::new(Session::new());
    let client = ApiClient::from_config(&config, session)
        .context("Failed to create HTTP client")?;
    let storage = Storage::new(config.download_dir());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(Arc::new(client), Arc::new(storage), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(net_cmd_tx, render_tx, config.language, config.page_size);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.keys) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    match state.keys.auth {
        AuthState::CheckingAuth => draw_loading(f, state, area),
        AuthState::Unauthenticated => draw_login(f, state, area),
        AuthState::Authenticated => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Tabs
                    Constraint::Min(0),    // Content
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            draw_header(f, state, chunks[0]);
            match state.keys.screen {
                Screen::Dashboard => draw_dashboard(f, state, chunks[1]),
                Screen::Table(resource) => draw_table(f, state, resource, chunks[1]),
                Screen::Profile => draw_profile(f, state, chunks[1]),
                Screen::Login => {}
            }
            draw_status_bar(f, state, chunks[2]);

            if state.editor.is_some() {
                draw_editor_popup(f, state, area);
            }
            if state.keys.input_mode == InputMode::ConfirmDelete {
                draw_confirm_popup(f, state, area);
            }
            if state.keys.show_help {
                draw_help_popup(f, area);
            }
        }
    }
}

fn draw_loading(f: &mut Frame, state: &RenderState, area: Rect) {
    let texts = state.language.texts();
    let popup = centered_rect(40, 20, area);
    let loading = Paragraph::new(vec![
        Line::from(APP_NAME.bold()),
        Line::from(""),
        Line::from(texts.loading).fg(Color::DarkGray),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, popup);
}

fn draw_login(f: &mut Frame, state: &RenderState, area: Rect) {
    let texts = state.language.texts();
    let login = &state.login;
    let popup = centered_rect(50, 50, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} - {} ", APP_NAME, texts.sign_in))
        .title_bottom(Line::from(format!(" F2:{} ", state.language.toggle().code())).right_aligned());
    let inner = block.inner(popup);
    f.render_widget(Clear, popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Hint
            Constraint::Length(3), // Email
            Constraint::Length(1),
            Constraint::Length(3), // Password
            Constraint::Length(1),
            Constraint::Min(0),    // Messages
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(texts.sign_in_hint).style(Style::default().fg(Color::DarkGray)),
        rows[0],
    );

    let masked = "*".repeat(login.password.chars().count());
    let fields = [
        (LoginField::Email, texts.email, login.email.as_str(), rows[1], rows[2], "email"),
        (LoginField::Password, texts.password, masked.as_str(), rows[3], rows[4], "password"),
    ];
    for (field, label, value, input_area, error_area, key) in fields {
        let focused = login.field == field;
        let input = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                })
                .title(format!(" {} ", label)),
        );
        f.render_widget(input, input_area);
        if let Some(error) = login.errors.get(key) {
            f.render_widget(
                Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
                error_area,
            );
        }
        if focused {
            let typed = match field {
                LoginField::Email => login.email[..login.cursor.min(login.email.len())].chars().count(),
                LoginField::Password => login.password[..login.cursor.min(login.password.len())]
                    .chars()
                    .count(),
            };
            f.set_cursor_position(input_cursor(input_area, typed));
        }
    }

    let status = if login.submitting {
        Line::from(texts.loading).fg(Color::DarkGray)
    } else if let Some(message) = &login.message {
        Line::from(message.as_str()).fg(Color::Red)
    } else {
        Line::from("Tab:switch field | Enter:sign in | Esc:quit").fg(Color::DarkGray)
    };
    f.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), rows[5]);
}

fn draw_header(f: &mut Frame, state: &RenderState, area: Rect) {
    let texts = state.language.texts();
    let labels: Vec<String> = Screen::PRIVATE
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            let name = match screen {
                Screen::Dashboard => texts.dashboard,
                Screen::Table(resource) => texts.resource(*resource),
                Screen::Profile => texts.profile,
                Screen::Login => texts.sign_in,
            };
            format!("{}:{}", i + 1, name)
        })
        .collect();
    let titles: Vec<&str> = labels.iter().map(String::as_str).collect();

    let user = state.user_email.as_deref().unwrap_or("");
    let tabs = render_tabs(&titles, state.keys.screen.tab_index().unwrap_or(0)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", APP_NAME))
            .title(Line::from(format!(" {} {} ", texts.welcome, user)).right_aligned()),
    );
    f.render_widget(tabs, area);
}

fn draw_dashboard(f: &mut Frame, state: &RenderState, area: Rect) {
    let texts = state.language.texts();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", texts.system_overview));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(inner);

    let total_users = Paragraph::new(vec![
        Line::from(texts.total_user).fg(Color::DarkGray),
        Line::from(state.totals.get("total_users").to_string()).bold().fg(Color::Cyan),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(total_users, Rect { width: chunks[0].width.min(30), ..chunks[0] });

    // Remaining counters the backend reports
    let rows: Vec<Row> = state
        .totals
        .0
        .iter()
        .filter(|(key, value)| key.as_str() != "total_users" && value.is_number())
        .map(|(key, value)| {
            Row::new(vec![
                Cell::from(key.replace('_', " ")),
                Cell::from(value.to_string()).style(Style::default().fg(Color::Yellow)),
            ])
        })
        .collect();
    let counters = Table::new(rows, [Constraint::Length(30), Constraint::Min(10)]);
    f.render_widget(counters, chunks[1]);
}

fn draw_table(f: &mut Frame, state: &RenderState, resource: Resource, area: Rect) {
    let texts = state.language.texts();
    let table = &state.table;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Rows
            Constraint::Length(1), // Footer
        ])
        .split(area);

    // Search box
    let searching = state.keys.input_mode == InputMode::Search;
    let search_text = if state.search.input.is_empty() && !searching {
        Span::styled(texts.search, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.search.input.as_str())
    };
    let search = Paragraph::new(Line::from(search_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if searching {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            })
            .title(" / "),
    );
    f.render_widget(search, chunks[0]);
    if searching {
        let typed = state.search.input[..state.search.cursor.min(state.search.input.len())]
            .chars()
            .count();
        f.set_cursor_position(input_cursor(chunks[0], typed));
    }

    // Rows
    let columns = resource.columns();
    let now = Utc::now();
    let header = Row::new(columns.iter().map(|c| Cell::from(c.header)))
        .style(Style::default().fg(Color::Cyan).bold());
    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|record| {
            Row::new(columns.iter().map(|column| {
                let text = ui::cell_text(column, record, now);
                let style = match column.kind {
                    ColumnKind::Validity
                        if ui::expiring_soon(
                            record.get(column.key).and_then(ui::parse_timestamp),
                            now,
                        ) =>
                    {
                        Style::default().fg(Color::Red)
                    }
                    ColumnKind::Active if text == "[x]" => Style::default().fg(Color::Green),
                    _ => Style::default(),
                };
                Cell::from(text).style(style)
            }))
        })
        .collect();
    let widths: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();

    let mut title = format!(" {} ", texts.resource(resource));
    if let Some(term) = &state.search.active {
        title.push_str(&format!("(\"{}\") ", term));
    }
    if table.loading {
        title.push_str(texts.loading);
        title.push(' ');
    }

    let grid = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("> ");

    if table.rows.is_empty() && !table.loading {
        f.render_widget(grid, chunks[1]);
        let inner = chunks[1].inner(Margin::new(2, 2));
        f.render_widget(
            Paragraph::new(texts.no_rows).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
    } else {
        let mut grid_state = TableState::default().with_selected(Some(table.selected));
        f.render_stateful_widget(grid, chunks[1], &mut grid_state);
    }

    // Footer
    let pagination = state.pagination();
    let mut footer = format!(
        " {} | page {}/{} | {} rows/page (s) ",
        pagination.label(),
        table.page.page_index + 1,
        pagination.total_pages,
        table.page.page_size
    );
    if state.search.active.is_some() {
        footer = format!(" {} results ", table.total);
    }
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn draw_profile(f: &mut Frame, state: &RenderState, area: Rect) {
    let texts = state.language.texts();
    let profile = &state.profile;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    // Account details
    let mut lines: Vec<Line> = Vec::new();
    match &profile.user {
        Some(user) => {
            let fields = [
                ("Name", "userFirstName"),
                ("Surname", "userLastName"),
                (texts.email, "userEmail"),
                (texts.role, "userRoles"),
            ];
            for (label, key) in fields {
                let value = user.get(key).map(ui::value_text).unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<12}", label), Style::default().fg(Color::Cyan)),
                    Span::raw(value),
                ]));
            }
            let dates = [("Valid until", "validUntil"), ("Last login", "lastLogin")];
            for (label, key) in dates {
                let value = user
                    .get(key)
                    .and_then(ui::parse_timestamp)
                    .map(|dt| ui::format_datetime(&dt.with_timezone(&Local)))
                    .unwrap_or_else(|| "-".to_string());
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<12}", label), Style::default().fg(Color::Cyan)),
                    Span::raw(value),
                ]));
            }
        }
        None if profile.loading => lines.push(Line::from(texts.loading).fg(Color::DarkGray)),
        None if state.user_email.is_none() => lines.push(
            Line::from("Account unknown for a restored session, sign in again to load it")
                .fg(Color::DarkGray),
        ),
        None => lines.push(Line::from("-").fg(Color::DarkGray)),
    }
    let details = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", texts.profile)))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    f.render_widget(details, chunks[0]);

    // Password change
    let editing = state.keys.input_mode == InputMode::Password;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
        .title(format!(" {} ", texts.password));
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    let mut lines: Vec<Line> = Vec::new();
    if editing {
        let fields = [
            (PasswordField::Current, "Current", &profile.current_password),
            (PasswordField::New, "New", &profile.new_password),
            (PasswordField::Confirm, "Confirm", &profile.confirm_password),
        ];
        for (field, label, value) in fields {
            let marker = if profile.field == field { "> " } else { "  " };
            let style = if profile.field == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}{:<9}", marker, label), style),
                Span::raw("*".repeat(value.chars().count())),
            ]));
        }
        lines.push(Line::from(""));
        for error in profile.errors.values() {
            lines.push(Line::from(error.as_str()).fg(Color::Red));
        }
        if profile.saving {
            lines.push(Line::from(texts.loading).fg(Color::DarkGray));
        } else {
            lines.push(Line::from("Tab:next | Enter:save | Esc:cancel").fg(Color::DarkGray));
        }
    } else {
        lines.push(Line::from("c: change password").fg(Color::DarkGray));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_editor_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(editor) = &state.editor else {
        return;
    };
    let texts = state.language.texts();
    let popup_area = centered_rect(70, 80, area);

    let (action, hint) = match &editor.mode {
        EditorMode::Add => ("Add", " Ctrl+S:save | Esc:cancel "),
        EditorMode::Edit { .. } => ("Edit", " Ctrl+S:save | Esc:cancel "),
        EditorMode::View => ("View", " Esc:close "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} {} ", action, texts.resource(editor.resource)))
        .title_bottom(Line::from(if editor.saving { " Saving... " } else { hint }).right_aligned())
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    f.render_widget(Clear, popup_area);
    f.render_widget(block, popup_area);

    let mut notes: Vec<Line> = editor
        .errors
        .values()
        .map(|e| Line::from(e.as_str()).fg(Color::Red))
        .collect();
    if editor.resource == Resource::Users && editor.mode != EditorMode::View && !state.role_names.is_empty() {
        notes.push(Line::from(format!("Roles: {}", state.role_names.join(", "))).fg(Color::DarkGray));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(to_u16(notes.len()))])
        .split(inner);

    let body = Paragraph::new(highlight_json(&editor.buffer)).scroll((editor.scroll, 0));
    f.render_widget(body, chunks[0]);
    f.render_widget(Paragraph::new(notes).wrap(Wrap { trim: true }), chunks[1]);

    if editor.mode != EditorMode::View {
        let before = &editor.buffer[..editor.cursor.min(editor.buffer.len())];
        let row = to_u16(before.matches('\n').count());
        let col = to_u16(before.rsplit('\n').next().unwrap_or("").chars().count());
        if row >= editor.scroll && row - editor.scroll < chunks[0].height {
            let max_x = chunks[0].x.saturating_add(chunks[0].width.saturating_sub(1));
            let cursor_x = chunks[0].x.saturating_add(col).min(max_x);
            let cursor_y = chunks[0].y.saturating_add(row - editor.scroll);
            f.set_cursor_position(Position::new(cursor_x, cursor_y));
        }
    }
}

fn draw_confirm_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let texts = state.language.texts();
    let popup_area = centered_rect(40, 20, area);
    let id = state.pending_delete.as_deref().unwrap_or("");

    let confirm = Paragraph::new(vec![
        Line::from(texts.confirm_delete),
        Line::from(format!("id: {}", id)).fg(Color::DarkGray),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(Color::Black)),
    );
    f.render_widget(Clear, popup_area);
    f.render_widget(confirm, popup_area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    if let Some(notice) = &state.notice {
        let color = if notice.is_error { Color::Red } else { Color::Green };
        let bar = Paragraph::new(format!(" {} ", notice.text)).style(Style::default().fg(color));
        f.render_widget(bar, area);
        return;
    }

    let status = match (state.keys.input_mode, state.keys.screen) {
        (InputMode::Search, _) => " Enter:search | Esc:cancel ",
        (InputMode::Editor, _) => " Ctrl+S:save | Esc:cancel ",
        (InputMode::Viewer, _) => " ↑/↓:scroll | Esc:close ",
        (InputMode::ConfirmDelete, _) => " y:delete | n:cancel ",
        (InputMode::Password, _) => " Tab:next field | Enter:save | Esc:cancel ",
        (InputMode::Normal, Screen::Table(Resource::Users)) => {
            " a:add | e:edit | v:view | d:delete | t:active | /:search | ?:help | q:quit "
        }
        (InputMode::Normal, Screen::Table(Resource::Projects)) => {
            " a:add | e:edit | d:delete | p:pdf | P:preview | /:search | ?:help | q:quit "
        }
        (InputMode::Normal, Screen::Table(_)) => {
            " a:add | e:edit | v:view | d:delete | /:search | n/b:page | ?:help | q:quit "
        }
        (InputMode::Normal, _) => " Tab:screen | r:refresh | L:logout | ?:help | q:quit ",
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 PROJEXION - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Next / previous screen
   1-7                Jump to screen
   ↑ / ↓              Scroll

 TABLES
   j / k              Select row
   n / b              Next / previous page
   s                  Cycle page size
   r                  Reload
   a / e / v          Add / edit / view record
   d                  Delete record
   /  Esc             Search / clear search
   t                  Toggle user active (Users)
   p / P              Generate / preview PDF (Projects)

 EDITOR
   Ctrl+S             Save
   Esc                Cancel

 GENERAL
   c                  Change password (Profile)
   l                  Switch language
   L                  Logout
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Cursor in a bordered one-line input after `typed` characters,
/// clamped to the last column inside the border
fn input_cursor(area: Rect, typed: usize) -> Position {
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    let x = area.x.saturating_add(to_u16(typed)).saturating_add(1).min(max_x);
    Position::new(x, area.y.saturating_add(1))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_cursor_follows_typing() {
        let area = Rect::new(10, 4, 30, 3);
        assert_eq!(input_cursor(area, 0), Position::new(11, 5));
        assert_eq!(input_cursor(area, 5), Position::new(16, 5));
    }

    #[test]
    fn test_input_cursor_clamps_long_input() {
        let area = Rect::new(10, 4, 30, 3);
        assert_eq!(input_cursor(area, 200), Position::new(38, 5));
        assert_eq!(input_cursor(area, 70_000), Position::new(38, 5));

        let edge = Rect::new(u16::MAX - 5, 0, 5, 3);
        assert_eq!(input_cursor(edge, usize::MAX).x, u16::MAX - 2);
    }
}
