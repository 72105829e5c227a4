//! Conversation history pairing.
//!
//! The stream_log protocol carries prior exchanges as `[human, assistant]`
//! pairs. This module validates a flat message list and folds it into those
//! pairs, dropping blank messages and any incomplete trailing turn.

use crate::types::{HistoryPair, Message, MessageRole};

/// Drops blank messages and trims the content of the survivors.
pub fn clean_messages(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter(|msg| !msg.is_blank())
        .map(|msg| Message::new(msg.role, msg.content.trim()))
        .collect()
}

/// Builds protocol history pairs from a flat ordered message list.
///
/// The list is cleaned first, then scanned left to right: a human message
/// immediately followed by an assistant message emits one pair and both are
/// consumed; anything else is skipped silently. A trailing unmatched human
/// message (the current question) never appears in a pair, and malformed
/// sequencing such as two consecutive human messages is treated as noise.
pub fn build_history(messages: &[Message]) -> Vec<HistoryPair> {
    let cleaned = clean_messages(messages);
    let mut pairs = Vec::new();

    let mut i = 0;
    while i < cleaned.len() {
        if cleaned[i].role == MessageRole::Human
            && cleaned
                .get(i + 1)
                .is_some_and(|next| next.role == MessageRole::Assistant)
        {
            pairs.push(HistoryPair::new(
                cleaned[i].content.clone(),
                cleaned[i + 1].content.clone(),
            ));
            i += 2;
        } else {
            i += 1;
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_question_is_not_paired() {
        let messages = vec![
            Message::human("a"),
            Message::assistant("b"),
            Message::human("c"),
        ];
        let pairs = build_history(&messages);
        assert_eq!(pairs, vec![HistoryPair::new("a", "b")]);
    }

    #[test]
    fn first_turn_has_empty_history() {
        let messages = vec![Message::human("what does this repo do?")];
        assert!(build_history(&messages).is_empty());
    }

    #[test]
    fn blank_messages_are_dropped_before_pairing() {
        let messages = vec![
            Message::human("a"),
            Message::assistant("   "),
            Message::assistant("b"),
            Message::human("c"),
        ];
        // The blank assistant message disappears, so "a" still pairs with "b".
        let pairs = build_history(&messages);
        assert_eq!(pairs, vec![HistoryPair::new("a", "b")]);
    }

    #[test]
    fn consecutive_human_messages_are_noise() {
        let messages = vec![
            Message::human("a"),
            Message::human("b"),
            Message::assistant("c"),
            Message::assistant("d"),
            Message::human("e"),
            Message::assistant("f"),
        ];
        let pairs = build_history(&messages);
        assert_eq!(
            pairs,
            vec![HistoryPair::new("b", "c"), HistoryPair::new("e", "f")]
        );
    }

    #[test]
    fn content_is_trimmed() {
        let messages = vec![Message::human("  a  "), Message::assistant("\nb\t")];
        let pairs = build_history(&messages);
        assert_eq!(pairs, vec![HistoryPair::new("a", "b")]);
    }

    #[test]
    fn pair_count_matches_adjacent_runs() {
        let messages = vec![
            Message::human("q1"),
            Message::assistant("a1"),
            Message::human("q2"),
            Message::assistant("a2"),
            Message::human("q3"),
        ];
        let pairs = build_history(&messages);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], HistoryPair::new("q2", "a2"));
    }

    #[test]
    fn empty_input_yields_empty_history() {
        assert!(build_history(&[]).is_empty());
    }
}
