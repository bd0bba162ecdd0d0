mod compute;
mod error;
mod html;
mod segment;
mod select;
mod span;

pub use compute::compute_spans;
#[allow(unused_imports)]
pub use error::DiffError;
pub use html::{escape_html, has_changes, render, NO_DIFF_HTML};
#[allow(unused_imports)]
pub use segment::{segment, LineRecord, LineSegments};
#[allow(unused_imports)]
pub use select::{classify, LineClass, Visibility};
pub use span::{parse_spans_json, EditSpan, Operation};
