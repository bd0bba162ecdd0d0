use super::segment::{segment, LineRecord};
use super::select::{classify, Visibility};
use super::span::{EditSpan, Operation};

/// Placeholder shown instead of a table when two bodies are identical
pub const NO_DIFF_HTML: &str = r#"<table class="no-diff"><tr>No differences</tr></table>"#;

const GAP_GUTTER: &str = "<span><br/></span>";
const GAP_TEXT: &str = "<br/>";
const LINE_BREAK: &str = "<br/>\n";

/// True if any span is not Equal. Callers use this to pick
/// `NO_DIFF_HTML` instead of calling `render`.
pub fn has_changes(spans: &[EditSpan]) -> bool {
    spans.iter().any(|s| s.op != Operation::Equal)
}

/// Escape the five HTML-reserved characters (`& < > " '`)
pub fn escape_html(s: &str) -> String {
    html_escape::encode_quoted_attribute(s).into_owned()
}

/// Render a span sequence as a two-column, line-numbered HTML table that
/// shows only changed lines plus one line of context around each change.
/// A header row is added when either label is given.
pub fn render(spans: &[EditSpan], left_label: Option<&str>, right_label: Option<&str>) -> String {
    let records: Vec<LineRecord<'_>> = segment(spans).collect();
    let visibility = classify(&records);
    let columns = emit(&records, &visibility);
    assemble(&columns, left_label, right_label)
}

/// The three output streams of the table, aligned row by row
#[derive(Debug, Default)]
struct Columns {
    gutter: Vec<String>,
    left: String,
    right: String,
}

fn emit(records: &[LineRecord<'_>], visibility: &Visibility) -> Columns {
    let mut columns = Columns::default();
    let mut last_line = 0usize;

    for record in records.iter().filter(|r| visibility.is_visible(r.line_number)) {
        let n = record.line_number;
        if n > last_line + 1 {
            columns.gutter.push(GAP_GUTTER.to_string());
            columns.left.push_str(GAP_TEXT);
            columns.right.push_str(GAP_TEXT);
        }
        if n != last_line {
            columns.gutter.push(format!("<span>{n}<br/></span>"));
        }
        last_line = n;

        if !record.content.is_empty() {
            let text = escape_html(record.content);
            match record.op {
                Operation::Delete => {
                    columns.left.push_str(&format!("<del>{text}</del>"));
                }
                Operation::Insert => {
                    columns.right.push_str(&format!("<ins>{text}</ins>"));
                }
                Operation::Equal => {
                    columns.left.push_str(&format!("<span>{text}</span>"));
                    columns.right.push_str(&format!("<span>{text}</span>"));
                }
            }
        }

        // Both sides break even if only one got content, to keep rows aligned
        if record.newline {
            columns.left.push_str(LINE_BREAK);
            columns.right.push_str(LINE_BREAK);
        }
    }

    columns
}

fn assemble(columns: &Columns, left_label: Option<&str>, right_label: Option<&str>) -> String {
    // Empty labels count as not supplied
    let left_label = left_label.filter(|l| !l.is_empty());
    let right_label = right_label.filter(|l| !l.is_empty());
    let head = if left_label.is_none() && right_label.is_none() {
        String::new()
    } else {
        format!(
            "<tr><th></th><th>Version: {}</th><th>Version: {}</th></tr>",
            escape_html(left_label.unwrap_or("")),
            escape_html(right_label.unwrap_or("")),
        )
    };

    format!(
        r#"<table class="diff">{head}<tr><td class="line-numbers">{}</td><td class="expand">{}</td><td class="expand">{}</td></tr></table>"#,
        columns.gutter.join("\n"),
        columns.left,
        columns.right,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute::compute_spans;

    fn eq(text: &str) -> EditSpan {
        EditSpan::new(Operation::Equal, text)
    }
    fn del(text: &str) -> EditSpan {
        EditSpan::new(Operation::Delete, text)
    }
    fn ins(text: &str) -> EditSpan {
        EditSpan::new(Operation::Insert, text)
    }

    fn columns_of(spans: &[EditSpan]) -> Columns {
        let records: Vec<_> = segment(spans).collect();
        let visibility = classify(&records);
        emit(&records, &visibility)
    }

    /// Gutter entries as `Some(line)` or `None` for a gap marker
    fn gutter_lines(columns: &Columns) -> Vec<Option<usize>> {
        columns
            .gutter
            .iter()
            .map(|entry| {
                if entry == GAP_GUTTER {
                    None
                } else {
                    let n = entry
                        .trim_start_matches("<span>")
                        .trim_end_matches("<br/></span>");
                    Some(n.parse().unwrap())
                }
            })
            .collect()
    }

    #[test]
    fn has_changes_false_for_equal_only() {
        assert!(!has_changes(&[eq("a\n"), eq("b")]));
        assert!(!has_changes(&[]));
        assert!(has_changes(&[eq("a"), ins("b")]));
    }

    #[test]
    fn empty_change_spans_still_count_as_changes() {
        assert!(has_changes(&[eq("a\n"), ins("")]));
        assert!(has_changes(&[del("")]));
    }

    #[test]
    fn identical_empty_bodies_have_no_changes() {
        assert!(!has_changes(&compute_spans("", "", None)));
    }

    #[test]
    fn single_line_replacement() {
        let spans = [eq("a\n"), del("b"), ins("x"), eq("\nc\n")];
        let columns = columns_of(&spans);
        assert_eq!(gutter_lines(&columns), vec![Some(1), Some(2), Some(3)]);
        assert!(columns.left.contains("<del>b</del>"));
        assert!(columns.right.contains("<ins>x</ins>"));
        assert!(!columns.left.contains("<ins>"));
        assert!(!columns.right.contains("<del>"));

        let html = render(&spans, None, None);
        assert!(!html.contains(GAP_GUTTER));
    }

    #[test]
    fn computed_diff_renders_replacement() {
        let spans = compute_spans("a\nb\nc\n", "a\nx\nc\n", None);
        assert!(has_changes(&spans));
        let html = render(&spans, None, None);
        assert!(html.contains("<del>b</del>"));
        assert!(html.contains("<ins>x</ins>"));
    }

    #[test]
    fn hidden_leading_lines_produce_one_gap() {
        let spans = [eq("a\nb\nc\nd\n"), del("z"), ins("Q"), eq("\n")];
        let columns = columns_of(&spans);
        assert_eq!(gutter_lines(&columns), vec![None, Some(4), Some(5)]);
        assert!(columns.left.starts_with(GAP_TEXT));
        assert!(columns.right.starts_with(GAP_TEXT));
    }

    #[test]
    fn trailing_newline_only_difference() {
        let spans = compute_spans("a", "a\n", None);
        assert!(has_changes(&spans));
        let columns = columns_of(&spans);
        assert_eq!(gutter_lines(&columns), vec![Some(1)]);
    }

    #[test]
    fn gaps_only_between_non_adjacent_lines() {
        let mut left = String::new();
        let mut right = String::new();
        for i in 1..=30 {
            let line = format!("line {i}\n");
            left.push_str(&line);
            if i == 5 || i == 6 || i == 20 {
                right.push_str(&format!("changed {i}\n"));
            } else if i != 28 {
                right.push_str(&line);
            }
        }
        let spans = compute_spans(&left, &right, None);
        let gutter = gutter_lines(&columns_of(&spans));

        let mut previous: Option<usize> = None;
        let mut gaps_since = 0;
        for entry in gutter {
            match entry {
                None => gaps_since += 1,
                Some(n) => {
                    let expected_gaps = match previous {
                        Some(p) if n > p + 1 => 1,
                        Some(_) => 0,
                        None if n > 1 => 1,
                        None => 0,
                    };
                    assert_eq!(gaps_since, expected_gaps, "before line {n}");
                    previous = Some(n);
                    gaps_since = 0;
                }
            }
        }
        assert_eq!(gaps_since, 0);
    }

    #[test]
    fn rows_stay_aligned_between_columns() {
        let spans = [eq("keep\n"), del("gone\n"), ins("added\nmore\n"), eq("end\n")];
        let columns = columns_of(&spans);
        assert_eq!(
            columns.left.matches("<br/>").count(),
            columns.right.matches("<br/>").count()
        );
    }

    #[test]
    fn script_tags_are_escaped() {
        let spans = [
            eq("<script>alert(1)</script>\n"),
            ins("<script>x</script>"),
            del("\"'&"),
        ];
        let html = render(&spans, Some("<script>"), None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("&quot;"));
        assert!(html.contains("&amp;"));
        assert!(!html.contains('\''));
    }

    #[test]
    fn header_only_with_labels() {
        let spans = [del("a"), ins("b")];
        let plain = render(&spans, None, None);
        assert!(!plain.contains("<th>"));

        let empty = render(&spans, Some(""), Some(""));
        assert!(!empty.contains("<th>"));
        assert!(empty.starts_with(r#"<table class="diff"><tr><td class="line-numbers">"#));

        let labelled = render(&spans, Some("main"), None);
        assert!(labelled.contains("<th>Version: main</th><th>Version: </th>"));
        assert!(labelled.starts_with(r#"<table class="diff"><tr><th></th>"#));
    }

    #[test]
    fn table_uses_stable_class_names() {
        let html = render(&[del("a"), ins("b")], None, None);
        assert!(html.starts_with(r#"<table class="diff">"#));
        assert!(html.contains(r#"<td class="line-numbers">"#));
        assert_eq!(html.matches(r#"<td class="expand">"#).count(), 2);
        assert!(html.ends_with("</td></tr></table>"));
        assert!(NO_DIFF_HTML.contains(r#"class="no-diff""#));
    }

    #[test]
    fn shared_line_contributions_keep_arrival_order() {
        let spans = [eq("ab"), del("c"), ins("d"), del("e"), ins("f"), eq("\n")];
        let columns = columns_of(&spans);
        assert_eq!(columns.left, "<span>ab</span><del>c</del><del>e</del><br/>\n");
        assert_eq!(columns.right, "<span>ab</span><ins>d</ins><ins>f</ins><br/>\n");
        assert_eq!(gutter_lines(&columns), vec![Some(1)]);
    }
}
