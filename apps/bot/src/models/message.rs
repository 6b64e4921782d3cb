/// One unit received from the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: i64,
    /// The user who sent the message, when the transport knows it
    pub sender: Option<Sender>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A bot command; `name` has no leading slash or `@botname` suffix
    Command { name: String },
    /// Free-form text, treated as a registration candidate
    Text(String),
}

/// Identity of a message sender
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Sender {
    /// Best available human label: handle, then full name, then first name
    pub fn display_label(&self) -> Option<String> {
        display_label(
            self.username.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

/// Commands understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stats,
}

impl Command {
    /// Maps a command name to a known command; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

/// Kind of chat a message arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_private(self) -> bool {
        self == ChatKind::Private
    }
}

/// Chat details as resolved by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatProfile {
    pub id: i64,
    pub kind: ChatKind,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ChatProfile {
    pub fn display_label(&self) -> Option<String> {
        display_label(
            self.username.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

/// A registration lookup requested from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationQuery {
    pub registration: String,
    pub chat_id: i64,
    pub sender: Option<Sender>,
}

impl RegistrationQuery {
    /// Builds a query from raw message text. Only surrounding whitespace is
    /// removed; format checks are left to the upstream APIs.
    pub fn new(raw: &str, chat_id: i64, sender: Option<Sender>) -> Self {
        Self {
            registration: raw.trim().to_string(),
            chat_id,
            sender,
        }
    }
}

/// The user id and label a lookup is recorded under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageIdentity {
    pub user_id: i64,
    pub label: String,
}

fn display_label(
    username: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Option<String> {
    match (non_empty(username), non_empty(first_name), non_empty(last_name)) {
        (Some(handle), _, _) => Some(handle.to_string()),
        (None, Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (None, Some(first), None) => Some(first.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
