//! Board rendering: statistics header, status columns with cards, and the
//! users panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::board::{format_long_date, format_short_date, initials, truncate};
use crate::fields::Status;
use crate::task::{Task, User};
use crate::tui::{
    app::App,
    colors::{status_color, DARK_PURPLE, INDIGO},
    enums::Focus,
};

const CARD_HEIGHT: usize = 6;
const USER_HEIGHT: usize = 4;

impl App<'_> {
    /// Render the header, the three columns and the users panel.
    pub(crate) fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
            ])
            .split(area);
        self.render_header(f, rows[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(rows[1]);

        if self.board.is_loaded() {
            self.render_columns(f, panes[0]);
        } else {
            let loading = Paragraph::new("Loading tasks...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, panes[0]);
        }
        self.render_users_panel(f, panes[1]);
    }

    /// Render the header with task statistics.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let stats = self.board.stats();
        let header_text = vec![Line::from(vec![
            Span::styled("TASK BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::raw(format!("Total: {}", stats.total)),
            Span::raw("   "),
            Span::styled(
                format!("In progress: {}", stats.in_progress),
                Style::default().fg(status_color(Status::InProgress)),
            ),
            Span::raw("   "),
            Span::styled(
                format!("Done: {}", stats.done),
                Style::default().fg(status_color(Status::Done)),
            ),
        ])];

        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, area);
    }

    fn render_columns(&mut self, f: &mut Frame, area: Rect) {
        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    /// Render a single status column.
    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let Some(status) = Status::from_column(column_index) else {
            return;
        };
        let accent = status_color(status);
        let cards = self.column_task_ids(column_index);
        let is_selected = column_index == self.selected_column && self.focus == Focus::Columns;
        let drop_target = self
            .carried
            .filter(|c| c.origin != column_index)
            .is_some()
            && column_index == self.selected_column;

        let mut title = vec![Span::styled(
            format!(" {} ({}) ", status.column_title(), cards.len()),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )];
        if drop_target {
            title.push(Span::styled("⇣ drop here ", Style::default().fg(Color::White)));
        }

        let border_style = if is_selected {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if drop_target { BorderType::Double } else { BorderType::Plain })
            .title(Line::from(title))
            .border_style(border_style);

        let inner = block.inner(area);
        f.render_widget(block, area);

        if cards.is_empty() {
            let empty = Paragraph::new("No tasks")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, Rect { height: inner.height.min(1), ..inner });
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = (available_height / CARD_HEIGHT).max(1);

        // Keep the selected card visible when this column owns the selection
        let follows_selection = is_selected && self.carried.is_none();
        let scroll_offset = if follows_selection {
            let start_visible = self.column_scroll_offsets[column_index];
            let end_visible = start_visible + visible_cards;
            if self.selected_card < start_visible {
                self.selected_card
            } else if self.selected_card >= end_visible {
                self.selected_card + 1 - visible_cards
            } else {
                start_visible
            }
        } else {
            self.column_scroll_offsets[column_index].min(cards.len().saturating_sub(1))
        };
        self.column_scroll_offsets[column_index] = scroll_offset;

        let mut current_y = 0;
        let mut rendered_cards = 0;
        for (card_index, &task_id) in cards.iter().enumerate().skip(scroll_offset) {
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let Some(task) = self.board.task(task_id) else {
                continue;
            };
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            let style = if self.carried.is_some_and(|c| c.task_id == task_id) {
                CardStyle::Carried
            } else if follows_selection && card_index == self.selected_card {
                CardStyle::Selected(accent)
            } else {
                CardStyle::Normal
            };
            render_card(f, card_area, task, style);

            current_y += CARD_HEIGHT;
            rendered_cards += 1;
        }

        if scroll_offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{} above", scroll_offset))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { height: 1, ..inner });
        }
        let remaining = cards.len().saturating_sub(scroll_offset + rendered_cards);
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{} below", remaining))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect {
                    y: inner.y + inner.height - 1,
                    height: 1,
                    ..inner
                },
            );
        }
    }

    /// Render the users panel.
    fn render_users_panel(&self, f: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Users;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" USERS ({}) ", self.board.users.len()))
            .border_style(if focused {
                Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            });
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.board.users.is_empty() {
            let empty = Paragraph::new("No users yet (N to add)").style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, inner);
            return;
        }

        let visible = (inner.height as usize / USER_HEIGHT).max(1);
        let offset = if focused { (self.selected_user + 1).saturating_sub(visible) } else { 0 };
        let width = inner.width.saturating_sub(5) as usize;

        let mut lines = Vec::new();
        for (i, user) in self.board.users.iter().enumerate().skip(offset).take(visible) {
            lines.extend(user_lines(user, width, focused && i == self.selected_user));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }
}

/// How a card is highlighted.
#[derive(Clone, Copy)]
enum CardStyle {
    Normal,
    Selected(Color),
    Carried,
}

/// Render a single task card: id and title, up to two lines of description,
/// then the start date and the assignee's initials.
fn render_card(f: &mut Frame, area: Rect, task: &Task, style: CardStyle) {
    let (card_style, border_type) = match style {
        CardStyle::Selected(accent) => (
            Style::default().bg(accent).fg(Color::Black).add_modifier(Modifier::BOLD),
            BorderType::Thick,
        ),
        CardStyle::Carried => (Style::default().bg(DARK_PURPLE).fg(Color::White), BorderType::Double),
        CardStyle::Normal => (Style::default().bg(Color::DarkGray), BorderType::Rounded),
    };

    let available_width = area.width.saturating_sub(2) as usize;
    let mut card_text = vec![Line::from(vec![
        Span::styled(format!("#{} ", task.id), Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            truncate(&task.title, available_width.saturating_sub(task.id.to_string().len() + 2)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    let mut description = wrap_text(task.description.as_deref().unwrap_or(""), available_width, 2);
    description.resize(2, String::new());
    card_text.extend(description.into_iter().map(Line::from));

    let date = format_short_date(task.initial_date);
    let badge = match task.assignee_name() {
        Some(name) => format!(" {} ", initials(name)),
        None => " -- ".to_string(),
    };
    let gap = available_width.saturating_sub(date.chars().count() + badge.chars().count());
    card_text.push(Line::from(vec![
        Span::raw(date),
        Span::raw(" ".repeat(gap)),
        Span::styled(badge, Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD)),
    ]));

    let card = Paragraph::new(card_text)
        .block(Block::default().borders(Borders::ALL).border_type(border_type))
        .style(card_style);
    f.render_widget(card, area);
}

/// Lines describing one user in the side panel.
fn user_lines(user: &User, width: usize, selected: bool) -> Vec<Line<'static>> {
    let name_style = if selected {
        Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let role = user.working.as_deref().unwrap_or("-");
    vec![
        Line::from(vec![
            Span::styled(
                format!("{:^4}", initials(&user.name)),
                Style::default().bg(INDIGO).fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(truncate(&user.name, width), name_style),
        ]),
        Line::from(format!("     {}", truncate(&user.email, width))),
        Line::from(Span::styled(
            format!("     {}", truncate(&format!("{} · {}", role, format_long_date(user.birthday_date)), width)),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ]
}

/// Word-wrap `text` into at most `max_lines` lines of `width` characters.
/// The last line gets an ellipsis when words are left over.
pub fn wrap_text(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    if width == 0 || max_lines == 0 {
        return lines;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let mut current = String::new();
    let mut next = 0;
    while next < words.len() && lines.len() < max_lines {
        let word = words[next];
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            next += 1;
        } else if current.is_empty() {
            // A single word wider than the line is cut
            lines.push(word.chars().take(width).collect());
            next += 1;
        } else {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if next < words.len() {
        if let Some(last) = lines.last_mut() {
            let keep = width.saturating_sub(1);
            if last.chars().count() > keep {
                *last = last.chars().take(keep).collect();
            }
            last.push('…');
        }
    }
    lines
}

/// Helper function to create a centered rect using up certain percentage of the available rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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
    fn test_wrap_fits_in_two_lines() {
        assert_eq!(wrap_text("fix the login page", 10, 2), vec!["fix the", "login page"]);
        assert!(wrap_text("", 10, 2).is_empty());
    }

    #[test]
    fn test_wrap_marks_overflow() {
        let lines = wrap_text("one two three four five six", 9, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "one two");
        assert!(lines[1].ends_with('…'));
        assert!(lines[1].chars().count() <= 9);
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
    }
}
