pub mod access;
pub mod attribution;
pub mod chunker;
pub mod formatter;
pub mod lookup;
pub mod usage;

pub use access::AdminList;
pub use attribution::UsageAttributor;
pub use chunker::{outbound_messages, split_message, MAX_MESSAGE_LENGTH};
pub use formatter::{render_report, CombinedReport};
pub use lookup::LookupService;
pub use usage::{SqliteUsageRecorder, UsageRecorder};
