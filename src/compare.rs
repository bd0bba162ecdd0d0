use crate::diff::{compute_spans, has_changes, render, EditSpan, Operation, NO_DIFF_HTML};
use crate::filter::{apply_filter, FilterRule};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

/// Result of comparing one artifact between the two snapshots
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub name: String,
    pub changed: bool,
    /// Diff table, or the no-differences placeholder
    pub result_html: String,
    pub added_chars: usize,
    pub removed_chars: usize,
    /// Digests of both bodies, for detecting stale saved reports
    pub left_sha256: String,
    pub right_sha256: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub left_label: Option<String>,
    pub right_label: Option<String>,
    pub timeout: Option<Duration>,
}

/// SHA-256 of a text body as lowercase hex
pub fn compute_digest(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Comparison {
    /// Build a result from an already computed span list. Both bodies are
    /// reconstructed from the spans for the digests.
    pub fn from_spans(name: &str, spans: &[EditSpan], options: &CompareOptions) -> Self {
        let mut left = String::new();
        let mut right = String::new();
        let mut added_chars = 0;
        let mut removed_chars = 0;
        for span in spans {
            match span.op {
                Operation::Equal => {
                    left.push_str(&span.text);
                    right.push_str(&span.text);
                }
                Operation::Delete => {
                    left.push_str(&span.text);
                    removed_chars += span.text.chars().count();
                }
                Operation::Insert => {
                    right.push_str(&span.text);
                    added_chars += span.text.chars().count();
                }
            }
        }

        let changed = has_changes(spans);
        let result_html = if changed {
            render(
                spans,
                options.left_label.as_deref(),
                options.right_label.as_deref(),
            )
        } else {
            NO_DIFF_HTML.to_string()
        };

        Comparison {
            name: name.to_string(),
            changed,
            result_html,
            added_chars,
            removed_chars,
            left_sha256: compute_digest(&left),
            right_sha256: compute_digest(&right),
        }
    }
}

/// Compare two bodies of the same artifact
pub fn compare_bodies(name: &str, left: &str, right: &str, options: &CompareOptions) -> Comparison {
    let spans = compute_spans(left, right, options.timeout);
    log::debug!("{}: {} diff spans", name, spans.len());
    Comparison::from_spans(name, &spans, options)
}

/// Compare every artifact of the left snapshot against the right one, in
/// name order. Artifacts missing on the right are compared against an empty
/// body; artifacts only present on the right are not reported.
pub fn compare_snapshots(
    left: &BTreeMap<String, String>,
    right: &BTreeMap<String, String>,
    rules: &[FilterRule],
    options: &CompareOptions,
) -> Vec<Comparison> {
    let pairs: Vec<(&str, &str, &str)> = left
        .iter()
        .map(|(name, body)| {
            let other = right.get(name).map(String::as_str).unwrap_or_else(|| {
                log::info!("{} is missing from the right snapshot", name);
                ""
            });
            (name.as_str(), body.as_str(), other)
        })
        .collect();

    let results: Vec<Comparison> = pairs
        .par_iter()
        .map(|(name, l, r)| compare_bodies(name, l, r, options))
        .collect();

    let total = results.len();
    let kept: Vec<Comparison> = results
        .into_iter()
        .filter(|c| apply_filter(rules, c))
        .collect();
    log::info!(
        "Compared {} artifacts ({} changed, {} reported)",
        total,
        kept.iter().filter(|c| c.changed).count(),
        kept.len()
    );
    kept
}
