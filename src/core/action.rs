//! Actions returned by input handling for the main loop to perform

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing further to do.
    None,
    /// Show a message on the status line.
    Notify(String, NotifyLevel),
    /// Put text on the system clipboard.
    Copy(String),
    /// Leave the application.
    Quit,
}
