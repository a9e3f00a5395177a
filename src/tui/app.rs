//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input and coordinates between the board, the forms and the
//! dialogs. The board itself is drawn by `board_view`.

use std::io;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::api::client::TaskApi;
use crate::board::{Board, BoardError};
use crate::fields::Status;
use crate::task::Task;
use crate::tui::{
    board_view::centered_rect,
    colors::{status_color, AMBER, DARK_RED, INDIGO},
    enums::{AppState, Carried, Focus},
    input::InputField,
    task_form::{TaskForm, DESCRIPTION_GLOBAL_ORDER, STATUS_GLOBAL_ORDER, TITLE_GLOBAL_ORDER, USER_GLOBAL_ORDER},
    user_form::{UserForm, BIRTHDAY_GLOBAL_ORDER, EMAIL_GLOBAL_ORDER, NAME_GLOBAL_ORDER, WORKING_GLOBAL_ORDER},
};

/// Main application state for the terminal user interface.
///
/// Owns the board cache and every piece of screen state: the selected
/// column and card, the card being carried, open forms and dialogs.
pub struct App<'a> {
    pub(crate) api: &'a dyn TaskApi,
    pub(crate) board: Board,
    pub(crate) state: AppState,
    pub(crate) focus: Focus,
    pub(crate) selected_column: usize,
    pub(crate) selected_card: usize,
    pub(crate) column_scroll_offsets: [usize; 3],
    pub(crate) selected_user: usize,
    pub(crate) carried: Option<Carried>,
    pub(crate) task_form: TaskForm,
    pub(crate) user_form: UserForm,
    pub(crate) editing_task: Option<u64>,
    pub(crate) confirm_delete: Option<u64>,
    pub(crate) status_message: String,
}

impl<'a> App<'a> {
    /// Create an App with an empty board; call `run` to load and show it.
    pub fn new(api: &'a dyn TaskApi, notice_ttl: Duration) -> Self {
        Self {
            api,
            board: Board::new(notice_ttl),
            state: AppState::Board,
            focus: Focus::Columns,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; 3],
            selected_user: 0,
            carried: None,
            task_form: TaskForm::new(&[]),
            user_form: UserForm::new(),
            editing_task: None,
            confirm_delete: None,
            status_message: String::new(),
        }
    }

    /// Reload the board and keep the selection in range.
    fn refresh(&mut self) {
        let keep = self.selected_task_id();
        if self.board.refresh(self.api) {
            self.set_status_message("Board refreshed".to_string());
        }
        match keep {
            Some(id) => self.select_task(id),
            None => self.clamp_selection(),
        }
    }

    /// IDs of the tasks shown in a column, top to bottom.
    pub(crate) fn column_task_ids(&self, column: usize) -> Vec<u64> {
        Status::from_column(column)
            .map(|status| self.board.tasks_by_status(status).iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.column_task_ids(self.selected_column).get(self.selected_card).copied()
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id().and_then(|id| self.board.task(id))
    }

    /// Put the selection on a task wherever it now lives.
    fn select_task(&mut self, task_id: u64) {
        if let Some(task) = self.board.task(task_id) {
            let column = task.status.column();
            if let Some(index) = self.column_task_ids(column).iter().position(|&id| id == task_id) {
                self.selected_column = column;
                self.selected_card = index;
                return;
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let column_len = self.column_task_ids(self.selected_column).len();
        if column_len == 0 {
            self.selected_card = 0;
            self.column_scroll_offsets[self.selected_column] = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
        if self.selected_user >= self.board.users.len() {
            self.selected_user = self.board.users.len().saturating_sub(1);
        }
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Move a task to the column for `target` and follow it there.
    fn move_task(&mut self, task_id: u64, target: Status) {
        let api = self.api;
        match self.board.drop_task(api, task_id, target, Utc::now()) {
            Ok(true) => {
                debug!(task = task_id, to = ?target, "task moved");
                self.set_status_message(format!("Moved #{} to {}", task_id, target.column_title()));
            }
            Ok(false) => {}
            Err(BoardError::NotFound(id)) => self.set_status_message(format!("Task {id} no longer exists")),
            // Transition and API failures already raised a notice
            Err(_) => {}
        }
        self.select_task(task_id);
    }

    /// Pick up the selected card.
    fn pick_up(&mut self) {
        if let Some(task_id) = self.selected_task_id() {
            self.carried = Some(Carried {
                task_id,
                origin: self.selected_column,
            });
        }
    }

    /// Drop the carried card on the current column.
    fn drop_carried(&mut self) {
        let Some(carried) = self.carried.take() else {
            return;
        };
        match Status::from_column(self.selected_column) {
            Some(target) => self.move_task(carried.task_id, target),
            None => self.select_task(carried.task_id),
        }
    }

    fn cancel_carry(&mut self) {
        if let Some(carried) = self.carried.take() {
            self.selected_column = carried.origin;
            self.select_task(carried.task_id);
        }
    }

    /// Handle keyboard input while a card is being carried.
    fn handle_carry_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left if self.selected_column > 0 => self.selected_column -= 1,
            KeyCode::Right if self.selected_column + 1 < Status::ALL.len() => self.selected_column += 1,
            KeyCode::Char(' ') | KeyCode::Enter => self.drop_carried(),
            KeyCode::Esc => self.cancel_carry(),
            _ => {}
        }
    }

    /// Handle keyboard input on the board.
    ///
    /// Returns true if the application should quit.
    fn handle_board_input(&mut self, key: KeyEvent) -> bool {
        if self.carried.is_some() {
            self.handle_carry_input(key);
            return false;
        }

        // Card actions only apply while the columns have focus
        let on_cards = self.focus == Focus::Columns;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,

            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Columns => Focus::Users,
                    Focus::Users => Focus::Columns,
                };
            }

            // Direct moves (check first, before regular navigation)
            KeyCode::Left if on_cards && key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(task_id) = self.selected_task_id() {
                    if let Some(target) = self.selected_column.checked_sub(1).and_then(Status::from_column) {
                        self.move_task(task_id, target);
                    }
                }
            }
            KeyCode::Right if on_cards && key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(task_id) = self.selected_task_id() {
                    if let Some(target) = Status::from_column(self.selected_column + 1) {
                        self.move_task(task_id, target);
                    }
                }
            }

            KeyCode::Left if on_cards => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right if on_cards => {
                if self.selected_column + 1 < Status::ALL.len() {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => match self.focus {
                Focus::Columns => self.selected_card = self.selected_card.saturating_sub(1),
                Focus::Users => self.selected_user = self.selected_user.saturating_sub(1),
            },
            KeyCode::Down => match self.focus {
                Focus::Columns => {
                    let column_len = self.column_task_ids(self.selected_column).len();
                    if self.selected_card + 1 < column_len {
                        self.selected_card += 1;
                    }
                }
                Focus::Users => {
                    if self.selected_user + 1 < self.board.users.len() {
                        self.selected_user += 1;
                    }
                }
            },

            KeyCode::Char(' ') if on_cards => self.pick_up(),
            KeyCode::Enter if on_cards => {
                if self.selected_task_id().is_some() {
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('n') => self.open_task_form(None),
            KeyCode::Char('N') => {
                self.user_form = UserForm::new();
                self.state = AppState::AddUser;
            }
            KeyCode::Char('e') if on_cards => {
                if let Some(task_id) = self.selected_task_id() {
                    self.open_task_form(Some(task_id));
                }
            }
            KeyCode::Char('x') | KeyCode::Delete if on_cards => self.ask_delete(),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    /// Open the task form, empty or for editing an existing task.
    fn open_task_form(&mut self, task_id: Option<u64>) {
        match task_id.and_then(|id| self.board.task(id)) {
            Some(task) => {
                self.task_form = TaskForm::from_task(task, &self.board.users);
                self.editing_task = Some(task.id);
                self.state = AppState::EditTask;
            }
            None => {
                self.task_form = TaskForm::new(&self.board.users);
                self.editing_task = None;
                self.state = AppState::AddTask;
            }
        }
    }

    fn ask_delete(&mut self) {
        if let Some(task_id) = self.selected_task_id() {
            self.confirm_delete = Some(task_id);
            self.state = AppState::Confirm;
        }
    }

    fn handle_detail_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.state = AppState::Board,
            KeyCode::Char('e') => self.open_task_form(self.selected_task_id()),
            KeyCode::Char('x') | KeyCode::Delete => self.ask_delete(),
            _ => {}
        }
        false
    }

    /// Handle keyboard input when in task creation or editing forms.
    fn handle_form_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::Board;
                self.editing_task = None;
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Home => {
                if let Some(field) = self.task_form.active_input() {
                    field.move_cursor_home();
                }
            }
            KeyCode::End => {
                if let Some(field) = self.task_form.active_input() {
                    field.move_cursor_end();
                }
            }
            KeyCode::Enter => self.submit_task_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    /// Validate and send the task form. The form stays open on failure.
    fn submit_task_form(&mut self) {
        let api = self.api;
        let draft = self.task_form.draft();
        let result = match self.editing_task {
            Some(task_id) => self.board.edit_task(api, task_id, &draft, Utc::now()),
            None => self.board.add_task(api, &draft, Utc::now()),
        };

        match result {
            Ok(()) => {
                self.state = AppState::Board;
                match self.editing_task.take() {
                    Some(task_id) => {
                        self.select_task(task_id);
                        self.set_status_message("Task updated".to_string());
                    }
                    None => {
                        self.clamp_selection();
                        self.set_status_message("Task created".to_string());
                    }
                }
            }
            Err(e) => self.task_form.error = Some(e.to_string()),
        }
    }

    fn handle_user_form_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => self.state = AppState::Board,
            KeyCode::Tab | KeyCode::Down => self.user_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.user_form.prev_field(),
            KeyCode::Left => self.user_form.active_input().move_cursor_left(),
            KeyCode::Right => self.user_form.active_input().move_cursor_right(),
            KeyCode::Home => self.user_form.active_input().move_cursor_home(),
            KeyCode::End => self.user_form.active_input().move_cursor_end(),
            KeyCode::Backspace => self.user_form.active_input().handle_backspace(),
            KeyCode::Delete => self.user_form.active_input().handle_delete(),
            KeyCode::Enter => {
                let api = self.api;
                let draft = self.user_form.draft();
                match self.board.add_user(api, &draft, Local::now().date_naive()) {
                    Ok(()) => {
                        self.state = AppState::Board;
                        self.clamp_selection();
                        self.set_status_message(format!("User {} created", draft.name.trim()));
                    }
                    Err(e) => self.user_form.error = Some(e.to_string()),
                }
            }
            KeyCode::Char(c) => self.user_form.active_input().handle_char(c),
            _ => {}
        }
        false
    }

    fn handle_confirm_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(task_id) = self.confirm_delete.take() {
                    let api = self.api;
                    match self.board.delete_task(api, task_id) {
                        Ok(()) => self.set_status_message(format!("Task #{task_id} deleted")),
                        Err(BoardError::NotFound(id)) => {
                            self.set_status_message(format!("Task {id} no longer exists"))
                        }
                        Err(_) => {}
                    }
                    self.clamp_selection();
                }
                self.state = AppState::Board;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::Board;
                self.confirm_delete = None;
            }
            _ => {}
        }
        false
    }

    fn handle_help_input(&mut self, _key: KeyEvent) -> bool {
        self.state = AppState::Board;
        false
    }

    /// Dispatch one key press based on the current application state.
    ///
    /// Returns true if the application should quit.
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.clear_status_message();
        match self.state {
            AppState::Board => self.handle_board_input(key),
            AppState::TaskDetail => self.handle_detail_input(key),
            AppState::AddTask | AppState::EditTask => self.handle_form_input(key),
            AppState::AddUser => self.handle_user_form_input(key),
            AppState::Help => self.handle_help_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    /// Render the task detail popup.
    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let popup_area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, popup_area);

        let assignee = match &task.user {
            Some(user) => format!("{} <{}>", user.name, user.email),
            None => format!("user #{}", task.user_id),
        };
        let stamp = |ts: Option<chrono::DateTime<Utc>>| {
            ts.map(|t| t.with_timezone(&Local).format("%d %b %Y %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        let detail_lines = vec![
            Line::from(vec![Span::styled(
                format!("Task #{}: {}", task.id, task.title),
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::raw("Status:    "),
                Span::styled(task.status.to_string(), Style::default().fg(status_color(task.status))),
            ]),
            Line::from(format!("Assignee:  {assignee}")),
            Line::from(format!("Started:   {}", stamp(task.initial_date))),
            Line::from(format!("Finished:  {}", stamp(task.finished_date))),
            Line::from(""),
            Line::from("Description:"),
            Line::from(task.description.as_deref().unwrap_or("-")),
        ];

        let popup_block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Enter/Esc to close, e: edit, x: delete)")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(status_color(task.status)).add_modifier(Modifier::BOLD));

        let popup_paragraph = Paragraph::new(detail_lines)
            .block(popup_block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));

        f.render_widget(popup_paragraph, popup_area);
    }

    /// Render a bordered single-line input, highlighted when focused.
    fn render_input(f: &mut Frame, area: Rect, title: &str, field: &InputField, focused: bool) {
        let border_style = if focused { Style::default().fg(AMBER) } else { Style::default() };
        let input = Paragraph::new(field.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(border_style),
        );
        f.render_widget(input, area);
        if focused {
            let max_x = area.width.saturating_sub(2);
            f.set_cursor_position((area.x + 1 + (field.cursor as u16).min(max_x), area.y + 1));
        }
    }

    /// Render a selector as `< value >`.
    fn render_selector(f: &mut Frame, area: Rect, title: &str, value: Span, focused: bool) {
        let border_style = if focused { Style::default().fg(AMBER) } else { Style::default() };
        let line = Line::from(vec![Span::raw("◀ "), value, Span::raw(" ▶")]);
        let selector = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(border_style),
        );
        f.render_widget(selector, area);
    }

    fn render_form_footer(f: &mut Frame, area: Rect, error: Option<&str>, help: &str) {
        let mut lines = Vec::new();
        if let Some(error) = error {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::White).bg(DARK_RED).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(help.to_string()));
        let footer = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Instructions"))
            .wrap(Wrap { trim: true });
        f.render_widget(footer, area);
    }

    /// Render the task creation or editing form.
    fn render_task_form(&self, f: &mut Frame, area: Rect, is_edit: bool) {
        let area = centered_rect(60, 80, area);
        f.render_widget(Clear, area);
        let title = if is_edit { "Edit Task" } else { "New Task" };
        let block = Block::default().borders(Borders::ALL).title(title).border_style(Style::default().fg(INDIGO));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Description
                Constraint::Length(3), // Status
                Constraint::Length(3), // User
                Constraint::Min(3),    // Instructions
            ])
            .split(inner);

        let form = &self.task_form;
        Self::render_input(f, chunks[0], "Title *", &form.title, form.current_field == TITLE_GLOBAL_ORDER);
        Self::render_input(
            f,
            chunks[1],
            "Description",
            &form.description,
            form.current_field == DESCRIPTION_GLOBAL_ORDER,
        );
        let status = form.selected_status();
        Self::render_selector(
            f,
            chunks[2],
            "Status",
            Span::styled(status.to_string(), Style::default().fg(status_color(status))),
            form.current_field == STATUS_GLOBAL_ORDER,
        );
        Self::render_selector(
            f,
            chunks[3],
            "Assigned to *",
            Span::raw(form.selected_user_label().to_string()),
            form.current_field == USER_GLOBAL_ORDER,
        );

        let help = if is_edit {
            "Tab/↑↓: Navigate  ←→: Change selectors  Enter: Save  Esc: Cancel"
        } else {
            "Tab/↑↓: Navigate  ←→: Change selectors  Enter: Create  Esc: Cancel"
        };
        Self::render_form_footer(f, chunks[4], form.error.as_deref(), help);
    }

    /// Render the new-user form.
    fn render_user_form(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 80, area);
        f.render_widget(Clear, area);
        let block = Block::default().borders(Borders::ALL).title("New User").border_style(Style::default().fg(INDIGO));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(3), // Email
                Constraint::Length(3), // Birth date
                Constraint::Length(3), // Role
                Constraint::Min(3),    // Instructions
            ])
            .split(inner);

        let form = &self.user_form;
        let current = form.current_field;
        Self::render_input(f, chunks[0], "Name *", &form.name, current == NAME_GLOBAL_ORDER);
        Self::render_input(f, chunks[1], "Email *", &form.email, current == EMAIL_GLOBAL_ORDER);
        Self::render_input(
            f,
            chunks[2],
            "Birth date (YYYY-MM-DD)",
            &form.birthday_date,
            current == BIRTHDAY_GLOBAL_ORDER,
        );
        Self::render_input(f, chunks[3], "Role", &form.working, current == WORKING_GLOBAL_ORDER);
        Self::render_form_footer(
            f,
            chunks[4],
            form.error.as_deref(),
            "Tab/↑↓: Navigate  Enter: Create  Esc: Cancel",
        );
    }

    /// Render the help screen with keyboard shortcuts.
    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(vec![Span::styled("Task Board Help", bold)]),
            Line::from(""),
            Line::from(vec![Span::styled("Board:", bold)]),
            Line::from("  ←/→ ↑/↓        Select column and card"),
            Line::from("  Space          Pick up the selected card"),
            Line::from("  Ctrl+←/→       Move the selected card one column"),
            Line::from("  Enter          Show task details"),
            Line::from("  n              New task"),
            Line::from("  N              New user"),
            Line::from("  e              Edit selected task"),
            Line::from("  x/Delete       Delete selected task"),
            Line::from("  Tab            Switch between columns and users"),
            Line::from("  r              Reload from the server"),
            Line::from("  h/F1           Show this help"),
            Line::from("  q/Esc/Ctrl+C   Quit"),
            Line::from(""),
            Line::from(vec![Span::styled("Carrying a card:", bold)]),
            Line::from("  ←/→            Choose the target column"),
            Line::from("  Space/Enter    Drop it there"),
            Line::from("  Esc            Put it back"),
            Line::from(""),
            Line::from(vec![Span::styled("Rules:", bold)]),
            Line::from("  A completed task cannot leave DONE."),
            Line::from("  Moving to IN PROGRESS stamps the start date; moving to DONE stamps the finish date."),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render a confirmation dialog for deleting a task.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let target = self
            .confirm_delete
            .and_then(|id| self.board.task(id))
            .map(|t| format!("Delete task #{} \"{}\"?", t.id, t.title))
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(target, Style::default().add_modifier(Modifier::BOLD))]),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        if let Some(notice) = self.board.notice() {
            let status = Paragraph::new(format!(" ⚠ {notice}"))
                .style(Style::default().bg(DARK_RED).fg(Color::White).add_modifier(Modifier::BOLD));
            f.render_widget(status, area);
            return;
        }

        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(carried) = self.carried {
            let target = Status::from_column(self.selected_column).map(|s| s.column_title()).unwrap_or("-");
            format!("Carrying #{} → {} | ←/→: Choose column | Space/Enter: Drop | Esc: Cancel", carried.task_id, target)
        } else {
            match self.state {
                AppState::Board => {
                    "Space: Pick up | Ctrl+←/→: Move | n: New task | N: New user | e: Edit | x: Delete | r: Reload | h: Help | q: Quit"
                        .to_string()
                }
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::AddUser => "Add New User".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(INDIGO).fg(Color::White))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    pub(crate) fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::Help => self.render_help(f, chunks[0]),
            _ => self.render_board(f, chunks[0]),
        }
        match self.state {
            AppState::TaskDetail => self.render_task_detail_popup(f),
            AppState::AddTask => self.render_task_form(f, chunks[0], false),
            AppState::EditTask => self.render_task_form(f, chunks[0], true),
            AppState::AddUser => self.render_user_form(f, chunks[0]),
            AppState::Confirm => self.render_confirm(f, chunks[0]),
            AppState::Board | AppState::Help => {}
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Draws once so the loading state is visible, loads the board, then
    /// renders and processes input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|f| self.render(f))?;
        self.refresh();
        self.clear_status_message();

        loop {
            self.board.expire_notice(Instant::now());
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::task::User;
    use ratatui::backend::TestBackend;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            name: name.into(),
            email: format!("user{id}@example.com"),
            birthday_date: None,
            working: None,
        }
    }

    fn task(id: u64, status: Status) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: None,
            status,
            user_id: 1,
            user: None,
            initial_date: None,
            finished_date: None,
        }
    }

    fn fixture() -> FakeApi {
        FakeApi::with(
            vec![task(1, Status::NotStarted), task(2, Status::NotStarted), task(3, Status::Done)],
            vec![user(1, "Ana Lima"), user(2, "Bruno")],
        )
    }

    fn loaded(api: &FakeApi) -> App<'_> {
        let mut app = App::new(api, Duration::from_secs(3));
        app.refresh();
        app
    }

    #[test]
    fn test_drag_card_to_done() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char(' ')));
        assert_eq!(app.carried, Some(Carried { task_id: 2, origin: 0 }));

        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.selected_column, 2);
        app.handle_key(press(KeyCode::Enter));

        assert!(app.carried.is_none());
        let moved = app.board.task(2).unwrap();
        assert_eq!(moved.status, Status::Done);
        assert!(moved.finished_date.is_some());
        assert_eq!(app.selected_task_id(), Some(2));
        assert_eq!(app.status_message, "Moved #2 to DONE");
    }

    #[test]
    fn test_cancel_carry_restores_selection() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Esc));
        assert!(app.carried.is_none());
        assert_eq!(app.selected_column, 0);
        assert_eq!(app.selected_task_id(), Some(1));
        assert!(!api.calls().iter().any(|c| c.starts_with("PUT")));
    }

    #[test]
    fn test_dropping_done_card_elsewhere_shows_notice() {
        let api = fixture();
        let mut app = loaded(&api);
        app.selected_column = 2;
        app.clamp_selection();
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Left));
        app.handle_key(press(KeyCode::Char(' ')));

        assert_eq!(app.board.notice(), Some("Cannot move a completed task back"));
        assert_eq!(app.board.task(3).unwrap().status, Status::Done);
        assert_eq!(app.selected_column, 2);
    }

    #[test]
    fn test_ctrl_arrow_moves_card() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(ctrl(KeyCode::Right));
        assert_eq!(app.board.task(1).unwrap().status, Status::InProgress);
        assert_eq!(app.selected_column, 1);

        // Leftmost column has nowhere to go
        app.selected_column = 0;
        app.clamp_selection();
        let calls = api.calls().len();
        app.handle_key(ctrl(KeyCode::Left));
        assert_eq!(api.calls().len(), calls);
    }

    #[test]
    fn test_users_focus_ignores_card_actions() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Users);
        let calls = api.calls().len();

        app.handle_key(ctrl(KeyCode::Right));
        app.handle_key(ctrl(KeyCode::Right));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Char(' ')));
        app.handle_key(press(KeyCode::Char('e')));
        app.handle_key(press(KeyCode::Char('x')));
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(api.calls().len(), calls);
        assert_eq!(app.board.task(1).unwrap().status, Status::NotStarted);
        assert_eq!(app.selected_column, 0);
        assert!(app.carried.is_none());
        assert_eq!(app.state, AppState::Board);

        app.handle_key(press(KeyCode::Down));
        assert_eq!(app.selected_user, 1);
        app.handle_key(press(KeyCode::Tab));
        app.handle_key(ctrl(KeyCode::Right));
        assert_eq!(app.board.task(1).unwrap().status, Status::InProgress);
    }

    #[test]
    fn test_new_task_without_user_is_rejected() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::AddTask);
        type_text(&mut app, "Plan sprint");
        app.handle_key(press(KeyCode::Enter));

        assert_eq!(app.state, AppState::AddTask);
        assert_eq!(app.task_form.error.as_deref(), Some("Select a user for the task"));
        assert!(!api.calls().iter().any(|c| c.starts_with("POST")));

        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.state, AppState::Board);
        assert_eq!(app.board.tasks.len(), 4);
        assert_eq!(app.status_message, "Task created");
    }

    #[test]
    fn test_typing_q_in_form_does_not_quit() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(press(KeyCode::Char('N')));
        assert_eq!(app.state, AppState::AddUser);
        assert!(!app.handle_key(press(KeyCode::Char('q'))));
        assert_eq!(app.user_form.name.value, "q");
    }

    #[test]
    fn test_delete_with_confirmation() {
        let api = fixture();
        let mut app = loaded(&api);
        app.handle_key(press(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Confirm);
        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.board.tasks.len(), 3);

        app.handle_key(press(KeyCode::Delete));
        app.handle_key(press(KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Board);
        assert!(app.board.task(1).is_none());
        assert_eq!(app.selected_task_id(), Some(2));
    }

    #[test]
    fn test_quit_keys() {
        let api = fixture();
        let mut app = loaded(&api);
        assert!(app.handle_key(press(KeyCode::Char('q'))));
        assert!(app.handle_key(ctrl(KeyCode::Char('c'))));
    }

    #[test]
    fn test_render_board() {
        let api = fixture();
        let mut app = loaded(&api);
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("PENDING (2)"));
        assert!(screen.contains("IN PROGRESS (0)"));
        assert!(screen.contains("DONE (1)"));
        assert!(screen.contains("Ana Lima"));
    }
}
