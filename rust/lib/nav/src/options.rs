/// Flags for [`Router::navigate_to`](crate::Router::navigate_to).
///
/// The default is a lateral move recorded as a new history entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Overwrite the current history entry instead of pushing a new one.
    pub replace: bool,
    /// Append to the breadcrumb (drill-down) instead of swapping its tip.
    pub add_to_path: bool,
}

impl NavigateOptions {
    /// Lateral move, new history entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drill-down into a child topic.
    pub fn drill() -> Self {
        Self {
            add_to_path: true,
            ..Self::default()
        }
    }

    /// Set the `replace` flag.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Set the `add_to_path` flag.
    pub fn add_to_path(mut self, add_to_path: bool) -> Self {
        self.add_to_path = add_to_path;
        self
    }
}
