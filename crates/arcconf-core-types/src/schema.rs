//! Canonical schema constants for structured logging
//!
//! These constants keep field keys and event names consistent between the
//! logging macros, the test capture layer and log consumers.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Reconciliation identifiers
pub const FIELD_PATH: &str = "path";
pub const FIELD_ENTITY_TYPE: &str = "entity_type";
pub const FIELD_COLLECTION: &str = "collection";

// Run sizes
pub const FIELD_OPS_LEN: &str = "ops_len";
pub const FIELD_RECORDS_LEN: &str = "records_len";
pub const FIELD_SKIPPED_LEN: &str = "skipped_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
