//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Board,
    TaskDetail,
    AddTask,
    EditTask,
    AddUser,
    Help,
    Confirm,
}

/// Which panel has keyboard focus on the board.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Focus {
    Columns,
    Users,
}

/// A card picked up and being carried across columns.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Carried {
    pub task_id: u64,
    /// Column the card was picked up from
    pub origin: usize,
}
