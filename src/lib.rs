#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod cause;
pub mod error;
pub mod taxonomy;
pub mod types;

pub use cause::Cause;
pub use cause::wrap::IntoCause;
pub use error::Error;
pub use taxonomy::Category;
pub use taxonomy::registry::Registry;
pub use types::{CategoryDecl, CauseKind};
