//! Logging for arcconf
//!
//! The CLI calls [`init`] once with the profile from its config. Engine
//! commands bracket their work with `log_op_start!` and `log_op_end!` or
//! `log_op_error!`; the planner, codec and stores below them only emit
//! `tracing::debug!`. Tests read the same events back through
//! [`init_test_capture`].
//!
//! ```rust
//! use arcconf_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
