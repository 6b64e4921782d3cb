//! Admin authorization for privileged commands.

/// Marker character that may prefix a handle (`@name`)
const HANDLE_MARKER: char = '@';

/// Statically configured set of admin identities.
///
/// Entries are numeric user ids or handles. Handles compare
/// case-sensitively with one leading `@` ignored on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminList {
    entries: Vec<String>,
}

impl AdminList {
    /// Parses a whitespace-separated admin list (`"12345 @alice bob"`)
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split_whitespace())
    }

    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| normalize_handle(entry.as_ref().trim()).to_string())
            .filter(|entry| !entry.is_empty())
            .collect();

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the caller's numeric id or handle is in the admin set
    pub fn is_admin(&self, user_id: i64, username: Option<&str>) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let id = user_id.to_string();
        let handle = username.map(normalize_handle).filter(|h| !h.is_empty());

        self.entries
            .iter()
            .any(|entry| *entry == id || handle.is_some_and(|h| entry == h))
    }
}

/// Strips one leading handle marker
pub fn normalize_handle(handle: &str) -> &str {
    handle.strip_prefix(HANDLE_MARKER).unwrap_or(handle)
}
