//! Chat front end: update dispatch and the fixed reply texts.

pub mod dispatcher;

use crate::models::UsageStats;

pub use dispatcher::{failure_log_line, Dispatcher};

pub const WELCOME_MESSAGE: &str = "Welcome to the MOT Checker Bot! Send me a UK vehicle registration number to check its MOT history.";

pub const HELP_MESSAGE: &str =
    "Simply send me a UK vehicle registration number to check its MOT history.";

/// Reply when a registration lookup fails for any reason
pub const LOOKUP_APOLOGY: &str =
    "Sorry, I couldn't process that registration number. Please try again.";

/// Reply when a command handler fails
pub const GENERIC_APOLOGY: &str = "Sorry, something went wrong. Please try again later.";

pub const ADMIN_ONLY_MESSAGE: &str = "Sorry, this command is only available to administrators.";

/// Formats usage counters for the stats command
pub fn render_stats(stats: &UsageStats) -> String {
    format!(
        "📊 *Bot Usage Statistics*\n\n\
         Last 24 hours: `{}` requests\n\
         Last 30 days: `{}` requests\n\
         All time: `{}` requests",
        stats.last_day, stats.last_month, stats.all_time
    )
}
