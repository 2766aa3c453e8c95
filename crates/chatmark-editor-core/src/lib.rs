//! chatmark-editor-core: selection transforms for a chatmark text input.
//!
//! This crate provides:
//! - `Range` / `WrapResult` - selections in character offsets
//! - Inline, block and code-fence toggles plus link and timestamp insertion
//! - `FormatAction` - toolbar actions dispatched through `apply_action`

pub mod execute;
pub mod text_helpers;
pub mod transform;
pub mod types;

pub use execute::{FormatAction, apply_action};
pub use smol_str::SmolStr;
pub use transform::{
    LINK_TEXT_PLACEHOLDER, URL_PLACEHOLDER, insert_at, insert_masked_link, insert_timestamp,
    toggle_block_prefix, toggle_code_block, toggle_wrap, toggle_wrap_asymmetric,
};
pub use types::{Range, WrapResult};
