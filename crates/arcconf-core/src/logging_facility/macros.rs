//! Lifecycle events for engine commands
//!
//! Every command that touches a device logs one `start` naming its target,
//! then either `end` with what it did or `end_error` with the error code.

/// `start` event; the fields name the device or document being worked on
///
/// ```
/// # use arcconf_core::log_op_start;
/// let device = "dicomDeviceName=arc";
/// log_op_start!("sync_archive_config", path = %device, dry_run = false);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr, $($target:tt)+) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = arcconf_core_types::schema::EVENT_START,
            $($target)+
        );
    };
}

/// `end` event with the elapsed time and the command's counts
///
/// ```
/// # use arcconf_core::log_op_end;
/// log_op_end!("update_archive_config", duration_ms = 12u64, ops_len = 3usize);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr, $($counts:tt)+) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = arcconf_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($counts)+
        );
    };
}

/// `end_error` event carrying the kind and stable code of the failure
///
/// `$err` is anything convertible into `ExError`, so a `ConfError` from the
/// planner and a store error both work.
///
/// ```
/// # use arcconf_core::{log_op_error, errors::ConfError};
/// let err = ConfError::NoSuchEntry { path: "dicomDeviceName=arc".to_string() };
/// log_op_error!("load_archive_config", err, duration_ms = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let failure: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = arcconf_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?failure.kind(),
            err_code = failure.code(),
        );
    }};
}
