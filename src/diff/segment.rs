use super::span::{EditSpan, Operation};
use std::iter::Peekable;
use std::str::Split;

/// A piece of one span that lies on a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub op: Operation,
    /// 1-based line number in the shared numbering of the walked span stream
    pub line_number: usize,
    /// Text without the terminating newline
    pub content: &'a str,
    /// True if the fragment was terminated by a newline in its span
    pub newline: bool,
}

impl LineRecord<'_> {
    /// A record carries text if it has content or terminates a line.
    /// The trailing fragment after a span's last newline is often empty.
    pub fn carries_text(&self) -> bool {
        self.newline || !self.content.is_empty()
    }

    pub fn is_change(&self) -> bool {
        self.op != Operation::Equal && self.carries_text()
    }
}

/// Lazy line segmentation of an edit-span sequence. Single forward pass.
pub struct LineSegments<'a, I> {
    spans: I,
    line: usize,
    current: Option<(Operation, Peekable<Split<'a, char>>)>,
}

/// Break spans into line records.
///
/// A span with `k` newlines yields `k + 1` records: `k` complete lines numbered
/// from the running counter, then the continuation fragment on the advanced
/// counter. Records from different spans may share a line number; they are
/// not merged here.
pub fn segment<'a, I>(spans: I) -> LineSegments<'a, I::IntoIter>
where
    I: IntoIterator<Item = &'a EditSpan>,
{
    LineSegments {
        spans: spans.into_iter(),
        line: 1,
        current: None,
    }
}

impl<'a, I> Iterator for LineSegments<'a, I>
where
    I: Iterator<Item = &'a EditSpan>,
{
    type Item = LineRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((op, fragments)) = self.current.as_mut() {
                if let Some(content) = fragments.next() {
                    let op = *op;
                    let line_number = self.line;
                    let newline = fragments.peek().is_some();
                    if newline {
                        self.line += 1;
                    } else {
                        self.current = None;
                    }
                    return Some(LineRecord {
                        op,
                        line_number,
                        content,
                        newline,
                    });
                }
                self.current = None;
            }

            let span = self.spans.next()?;
            self.current = Some((span.op, span.text.split('\n').peekable()));
        }
    }
}
