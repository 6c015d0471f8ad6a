//! Document format v1
//!
//! ```yaml
//! format_version: 1
//! device: arc
//! archive:
//!   overwritePolicy: SAME_SOURCE
//!   queues:
//!     - { queueName: Export1, maxRetries: 3 }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level document structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentV1 {
    /// Must be 1 for this format
    pub format_version: u32,

    /// Device name, the RDN value below the configured device base
    pub device: String,

    /// Archive extension; field and collection names of the root entity type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<serde_yaml::Mapping>,
}
