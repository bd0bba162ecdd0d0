use super::error::DiffError;
use serde_json::Value;
use std::str::FromStr;

/// Edit operation of a character-level diff span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    Equal,
    Insert,
}

impl Operation {
    /// Map the numeric wire code used by diff-match-patch style engines
    /// (`-1` delete, `0` equal, `1` insert).
    pub fn from_code(code: i64) -> Result<Self, DiffError> {
        match code {
            -1 => Ok(Operation::Delete),
            0 => Ok(Operation::Equal),
            1 => Ok(Operation::Insert),
            other => Err(DiffError::InvalidInput(format!(
                "unknown operation code {other} (expected -1, 0 or 1)"
            ))),
        }
    }
}

impl FromStr for Operation {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delete" | "del" => Ok(Operation::Delete),
            "equal" | "eq" => Ok(Operation::Equal),
            "insert" | "ins" => Ok(Operation::Insert),
            _ => Err(DiffError::InvalidInput(format!("unknown operation tag '{s}'"))),
        }
    }
}

/// One (operation, text) unit of a character-level diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSpan {
    pub op: Operation,
    pub text: String,
}

impl EditSpan {
    pub fn new(op: Operation, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }
}

/// Parse a JSON span list. Each element is either a `[code, text]` pair
/// with a numeric code, or an object `{"op": ..., "text": ...}` where `op`
/// is a code or a tag name.
pub fn parse_spans_json(input: &str) -> Result<Vec<EditSpan>, DiffError> {
    let value: Value = serde_json::from_str(input)
        .map_err(|e| DiffError::InvalidInput(format!("malformed span JSON: {e}")))?;

    let items = value
        .as_array()
        .ok_or_else(|| DiffError::InvalidInput("expected a JSON array of spans".into()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_span(item).map_err(|DiffError::InvalidInput(msg)| {
                DiffError::InvalidInput(format!("span {index}: {msg}"))
            })
        })
        .collect()
}

fn parse_span(item: &Value) -> Result<EditSpan, DiffError> {
    let (op, text) = match item {
        Value::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
        Value::Object(map) => (
            map.get("op").unwrap_or(&Value::Null),
            map.get("text").unwrap_or(&Value::Null),
        ),
        _ => {
            return Err(DiffError::InvalidInput(
                "expected [op, text] or {\"op\", \"text\"}".into(),
            ))
        }
    };

    let op = match op {
        Value::Number(n) => {
            let code = n
                .as_i64()
                .ok_or_else(|| DiffError::InvalidInput(format!("non-integer operation code {n}")))?;
            Operation::from_code(code)?
        }
        Value::String(tag) => tag.parse()?,
        other => {
            return Err(DiffError::InvalidInput(format!(
                "operation must be a number or string, got {other}"
            )))
        }
    };

    let text = text
        .as_str()
        .ok_or_else(|| DiffError::InvalidInput("span text must be a string".into()))?;

    Ok(EditSpan::new(op, text))
}
