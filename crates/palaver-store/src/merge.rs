//! Merge rules for incoming messages.
//!
//! A conversation's message sequence is kept unique by id and sorted
//! ascending by timestamp. Incremental appends go through
//! [`insert_message`]; bulk fetch results bypass the merger entirely and
//! replace the sequence wholesale.

use palaver_shared::model::ChatMessage;

/// Insert `candidate` into `messages`, preserving both invariants.
///
/// Idempotent: if a message with the same id is already present the
/// sequence is left untouched and the existing entry wins, even when the
/// candidate carries a different timestamp. Otherwise the candidate is
/// placed by binary search on timestamp, after any entries with an equal
/// timestamp, so arrival order breaks ties.
///
/// Returns whether the candidate was inserted.
pub fn insert_message(messages: &mut Vec<ChatMessage>, candidate: ChatMessage) -> bool {
    if messages.iter().any(|m| m.id == candidate.id) {
        return false;
    }

    let at = messages.partition_point(|m| m.timestamp <= candidate.timestamp);
    messages.insert(at, candidate);
    true
}
