use std::fmt;

use crate::state::SessionState;

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_TEXT: &str = "No users have been added yet.";

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArea {
    /// Nothing loaded yet and a fetch is running
    Loading,
    /// One `ID: {id} - {name}` row per user, possibly none
    Rows(Vec<String>),
}

/// The rendered user-management view, derived from a [`SessionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub error: Option<String>,
    pub list: ListArea,
    /// Show the "no users yet" hint. Only when idle with no list and no error.
    pub empty_state: bool,
}

impl View {
    pub fn from_state(state: &SessionState) -> Self {
        let list = if state.loading && state.users.is_empty() {
            ListArea::Loading
        } else {
            ListArea::Rows(
                state
                    .users
                    .iter()
                    .map(|user| format!("ID: {} - {}", user.id, user.name))
                    .collect(),
            )
        };

        Self {
            error: state.error.clone(),
            list,
            empty_state: !state.loading && state.users.is_empty() && state.error.is_none(),
        }
    }

    pub fn rows(&self) -> &[String] {
        match &self.list {
            ListArea::Rows(rows) => rows,
            ListArea::Loading => &[],
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            let text = format!("Error: {error}");
            let border = "-".repeat(text.chars().count() + 2);
            writeln!(f, "+{border}+")?;
            writeln!(f, "| {text} |")?;
            writeln!(f, "+{border}+")?;
        }

        match &self.list {
            ListArea::Loading => writeln!(f, "{LOADING_TEXT}")?,
            ListArea::Rows(rows) => {
                for row in rows {
                    writeln!(f, "  {row}")?;
                }
            }
        }

        if self.empty_state {
            writeln!(f, "{EMPTY_TEXT}")?;
        }

        Ok(())
    }
}
