//! Splitting of long replies into transport-sized messages.
//!
//! Lengths are measured in UTF-16 code units, which is how Telegram counts
//! message length.

/// Maximum length of a single Telegram message
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Room kept free in every segment for the `(part i/n)` marker line
pub const PART_MARKER_RESERVE: usize = 24;

/// Appended to a line cut short to fit a message
const TRUNCATION_MARK: char = '…';

/// Length of `text` as the transport counts it
pub fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Splits `text` at line boundaries into segments of at most `budget`.
///
/// A document that already fits comes back as one identical segment.
/// Joining the segments with `\n` yields the original text. A single line
/// longer than `budget` is kept whole in its own segment.
pub fn split_message(text: &str, budget: usize) -> Vec<String> {
    if message_len(text) <= budget {
        return vec![text.to_string()];
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut has_lines = false;

    for line in text.split('\n') {
        let line_len = message_len(line);

        if has_lines && current_len + 1 + line_len > budget {
            segments.push(std::mem::take(&mut current));
            current_len = 0;
            has_lines = false;
        }

        if has_lines {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
        has_lines = true;
    }

    if has_lines {
        segments.push(current);
    }

    segments
}

/// Marker line prepended to every segment after the first
pub fn part_marker(part: usize, total: usize) -> String {
    format!("(part {}/{})", part, total)
}

/// Turns a reply into the messages actually handed to the transport.
///
/// Oversized replies are split with headroom for the part marker, so marked
/// segments stay within [`MAX_MESSAGE_LENGTH`]. A single line too long for
/// any segment is truncated, since the transport would reject it.
pub fn outbound_messages(text: &str) -> Vec<String> {
    if message_len(text) <= MAX_MESSAGE_LENGTH {
        return vec![text.to_string()];
    }

    let budget = MAX_MESSAGE_LENGTH - PART_MARKER_RESERVE;
    let segments = split_message(text, budget);
    let total = segments.len();

    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let segment = if message_len(&segment) > budget {
                log::warn!(
                    "Truncating part {}/{} of {} units to {}",
                    i + 1,
                    total,
                    message_len(&segment),
                    budget
                );
                truncate(&segment, budget)
            } else {
                segment
            };

            if i == 0 {
                segment
            } else {
                format!("{}\n{}", part_marker(i + 1, total), segment)
            }
        })
        .collect()
}

/// Cuts `text` to at most `budget` units at a char boundary, ending in `…`
fn truncate(text: &str, budget: usize) -> String {
    let limit = budget.saturating_sub(TRUNCATION_MARK.len_utf16());
    let mut out = String::new();
    let mut len = 0;

    for c in text.chars() {
        if len + c.len_utf16() > limit {
            break;
        }
        out.push(c);
        len += c.len_utf16();
    }

    out.push(TRUNCATION_MARK);
    out
}
