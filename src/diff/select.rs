use super::segment::LineRecord;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// At least one change touches the line
    Changed,
    /// Unchanged, shown because a neighbour is changed
    Context,
    Hidden,
}

/// Which line numbers of a segmented diff get displayed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    changed: BTreeSet<usize>,
    context: BTreeSet<usize>,
}

impl Visibility {
    pub fn class_of(&self, line_number: usize) -> LineClass {
        if self.changed.contains(&line_number) {
            LineClass::Changed
        } else if self.context.contains(&line_number) {
            LineClass::Context
        } else {
            LineClass::Hidden
        }
    }

    pub fn is_visible(&self, line_number: usize) -> bool {
        self.class_of(line_number) != LineClass::Hidden
    }

    #[allow(dead_code)]
    pub fn changed(&self) -> impl Iterator<Item = usize> + '_ {
        self.changed.iter().copied()
    }

    /// Visible line numbers in ascending order
    #[allow(dead_code)]
    pub fn visible(&self) -> Vec<usize> {
        self.changed.union(&self.context).copied().collect()
    }
}

/// Classify every line of a segmented diff.
///
/// First pass marks changed lines and their neighbours (`n - 1` floored at 1,
/// `n + 1`) as context-eligible. Second pass keeps an eligible line only if
/// some record puts text on it, so the empty continuation after a document's
/// final newline never shows up as a line of its own.
pub fn classify(records: &[LineRecord<'_>]) -> Visibility {
    let mut changed = BTreeSet::new();
    let mut eligible = BTreeSet::new();
    for record in records.iter().filter(|r| r.is_change()) {
        let n = record.line_number;
        changed.insert(n);
        eligible.insert(n.saturating_sub(1).max(1));
        eligible.insert(n + 1);
    }

    let context = records
        .iter()
        .filter(|r| r.carries_text())
        .map(|r| r.line_number)
        .filter(|n| eligible.contains(n) && !changed.contains(n))
        .collect();

    Visibility { changed, context }
}
