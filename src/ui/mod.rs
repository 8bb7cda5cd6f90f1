//! Terminal output helpers
//!
//! Styled symbols in a terminal, plain `[OK]`/`[WARN]` prefixes when piped
//! or running under CI.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    key_value, remark, section, step_error_detail, step_ok, step_ok_detail, step_warn_hint,
};
