use crate::compare::Comparison;
use glob::{MatchOptions, Pattern};

// ── Types ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeOp {
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone)]
pub enum FilterRule {
    Glob { include: bool, pattern: Pattern },
    Status { include: bool, status: StatusKind },
    Size { include: bool, op: SizeOp, threshold: usize },
}

impl FilterRule {
    fn is_include(&self) -> bool {
        match self {
            FilterRule::Glob { include, .. } => *include,
            FilterRule::Status { include, .. } => *include,
            FilterRule::Size { include, .. } => *include,
        }
    }
}

// ── Parser ──

/// Parse a comma-separated filter expression into a list of rules.
/// Invalid globs are skipped with a warning.
pub fn parse_filter_expr(expr: &str) -> Vec<FilterRule> {
    let mut rules = Vec::new();
    for segment in expr.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        // Extract +/- prefix
        let (include, body) = if let Some(rest) = segment.strip_prefix('-') {
            (false, rest.trim())
        } else if let Some(rest) = segment.strip_prefix('+') {
            (true, rest.trim())
        } else {
            (true, segment)
        };

        if body.is_empty() {
            continue;
        }

        // Try size: >N or <N (changed characters)
        if let Some(rule) = try_parse_size(include, body) {
            rules.push(rule);
            continue;
        }

        if let Some(rule) = try_parse_status(include, body) {
            rules.push(rule);
            continue;
        }

        // Otherwise treat as a glob on the artifact name
        match Pattern::new(body) {
            Ok(pattern) => rules.push(FilterRule::Glob { include, pattern }),
            Err(e) => log::warn!("Ignoring invalid filter glob '{}': {}", body, e),
        }
    }
    rules
}

fn try_parse_size(include: bool, body: &str) -> Option<FilterRule> {
    let (op, num_str) = if let Some(rest) = body.strip_prefix('>') {
        (SizeOp::GreaterThan, rest)
    } else if let Some(rest) = body.strip_prefix('<') {
        (SizeOp::LessThan, rest)
    } else {
        return None;
    };
    let threshold = num_str.trim().parse::<usize>().ok()?;
    Some(FilterRule::Size {
        include,
        op,
        threshold,
    })
}

fn try_parse_status(include: bool, body: &str) -> Option<FilterRule> {
    let status = match body.to_lowercase().as_str() {
        "changed" => StatusKind::Changed,
        "unchanged" => StatusKind::Unchanged,
        _ => return None,
    };
    Some(FilterRule::Status { include, status })
}

// ── Evaluator ──

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Apply filter rules to a comparison result. Returns true if it should be reported.
pub fn apply_filter(rules: &[FilterRule], result: &Comparison) -> bool {
    if rules.is_empty() {
        return true;
    }

    let has_includes = rules.iter().any(|r| r.is_include());

    // Include rules OR together; no include rules means everything starts in
    let included = !has_includes || rules.iter().any(|r| r.is_include() && matches_rule(r, result));
    if !included {
        return false;
    }

    // Any matching exclude rule removes the result
    !rules
        .iter()
        .any(|r| !r.is_include() && matches_rule(r, result))
}

fn matches_rule(rule: &FilterRule, result: &Comparison) -> bool {
    match rule {
        FilterRule::Glob { pattern, .. } => pattern.matches_with(&result.name, MATCH_OPTIONS),
        FilterRule::Status { status, .. } => match status {
            StatusKind::Changed => result.changed,
            StatusKind::Unchanged => !result.changed,
        },
        FilterRule::Size { op, threshold, .. } => {
            let changed = result.added_chars + result.removed_chars;
            match op {
                SizeOp::GreaterThan => changed > *threshold,
                SizeOp::LessThan => changed < *threshold,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(name: &str, added_chars: usize, removed_chars: usize) -> Comparison {
        Comparison {
            name: name.to_string(),
            changed: added_chars + removed_chars > 0,
            result_html: String::new(),
            added_chars,
            removed_chars,
            left_sha256: String::new(),
            right_sha256: String::new(),
        }
    }

    // ── Parser tests ──

    #[test]
    fn parse_empty_string_returns_empty() {
        assert!(parse_filter_expr("").is_empty());
        assert!(parse_filter_expr("  ,  , ").is_empty());
    }

    #[test]
    fn parse_simple_glob_include() {
        let rules = parse_filter_expr("Account*");
        assert_eq!(rules.len(), 1);
        assert!(matches!(&rules[0], FilterRule::Glob { include: true, .. }));
    }

    #[test]
    fn parse_exclude_glob() {
        let rules = parse_filter_expr("-*Test");
        assert_eq!(rules.len(), 1);
        assert!(matches!(&rules[0], FilterRule::Glob { include: false, .. }));
    }

    #[test]
    fn parse_status_case_insensitive() {
        let rules = parse_filter_expr("+CHANGED, -unchanged");
        assert_eq!(rules.len(), 2);
        assert!(matches!(
            &rules[0],
            FilterRule::Status { include: true, status: StatusKind::Changed }
        ));
        assert!(matches!(
            &rules[1],
            FilterRule::Status { include: false, status: StatusKind::Unchanged }
        ));
    }

    #[test]
    fn parse_size_rules() {
        let rules = parse_filter_expr("+> 10, -<3");
        assert_eq!(rules.len(), 2);
        assert!(matches!(
            &rules[0],
            FilterRule::Size { include: true, op: SizeOp::GreaterThan, threshold: 10 }
        ));
        assert!(matches!(
            &rules[1],
            FilterRule::Size { include: false, op: SizeOp::LessThan, threshold: 3 }
        ));
    }

    #[test]
    fn parse_invalid_glob_skipped() {
        let rules = parse_filter_expr("[invalid, *Controller");
        assert_eq!(rules.len(), 1);
    }

    // ── Evaluator tests ──

    #[test]
    fn no_rules_keeps_everything() {
        assert!(apply_filter(&[], &make_result("Foo", 0, 0)));
    }

    #[test]
    fn include_globs_or_together() {
        let rules = parse_filter_expr("Account*, Contact*");
        assert!(apply_filter(&rules, &make_result("AccountService", 1, 0)));
        assert!(apply_filter(&rules, &make_result("ContactHelper", 1, 0)));
        assert!(!apply_filter(&rules, &make_result("LeadHandler", 1, 0)));
    }

    #[test]
    fn glob_matching_ignores_case() {
        let rules = parse_filter_expr("account*");
        assert!(apply_filter(&rules, &make_result("AccountService", 0, 0)));
    }

    #[test]
    fn exclude_wins_over_include() {
        let rules = parse_filter_expr("Account*, -*Test");
        assert!(apply_filter(&rules, &make_result("AccountService", 0, 0)));
        assert!(!apply_filter(&rules, &make_result("AccountServiceTest", 0, 0)));
    }

    #[test]
    fn status_rule_selects_changed_only() {
        let rules = parse_filter_expr("+changed");
        assert!(apply_filter(&rules, &make_result("A", 2, 1)));
        assert!(!apply_filter(&rules, &make_result("B", 0, 0)));
    }

    #[test]
    fn exclude_only_rules_start_from_everything() {
        let rules = parse_filter_expr("-unchanged");
        assert!(apply_filter(&rules, &make_result("A", 1, 0)));
        assert!(!apply_filter(&rules, &make_result("B", 0, 0)));
    }

    #[test]
    fn size_rule_counts_added_and_removed() {
        let rules = parse_filter_expr("+>10");
        assert!(apply_filter(&rules, &make_result("Big", 6, 5)));
        assert!(!apply_filter(&rules, &make_result("Small", 5, 5)));
    }
}
