use roster_client::User;

/// Everything the user-management view renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Last known server list, in server order
    pub users: Vec<User>,
    /// Contents of the name input
    pub draft_name: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            draft_name: String::new(),
            loading: true,
            error: None,
        }
    }
}
