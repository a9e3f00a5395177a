//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Status;

/// Pending column accent
pub const SLATE: Color = Color::Rgb(148, 163, 184);
/// In-progress column accent
pub const AMBER: Color = Color::Rgb(245, 158, 11);
/// Done column accent
pub const EMERALD: Color = Color::Rgb(16, 185, 129);
/// Avatar background for initials
pub const INDIGO: Color = Color::Rgb(79, 70, 229);
/// Error notice background
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Card being carried
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

/// Accent color of a status column.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::NotStarted => SLATE,
        Status::InProgress => AMBER,
        Status::Done => EMERALD,
    }
}
