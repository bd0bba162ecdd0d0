use super::span::{EditSpan, Operation};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

/// Character-level diff of two text bodies.
///
/// Consecutive changes with the same tag are coalesced, so the result is the
/// shortest span list for the edit script. Concatenating Equal+Delete texts
/// yields `left`, Equal+Insert texts yields `right`.
pub fn compute_spans(left: &str, right: &str, timeout: Option<Duration>) -> Vec<EditSpan> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers);
    if let Some(timeout) = timeout {
        config.timeout(timeout);
    }
    let diff = config.diff_chars(left, right);

    let mut spans: Vec<EditSpan> = Vec::new();
    for change in diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => Operation::Equal,
            ChangeTag::Delete => Operation::Delete,
            ChangeTag::Insert => Operation::Insert,
        };
        match spans.last_mut() {
            Some(last) if last.op == op => last.text.push_str(change.value()),
            _ => spans.push(EditSpan::new(op, change.value())),
        }
    }
    spans
}
