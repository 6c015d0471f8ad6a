use arcconf_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ConfError
pub type Result<T> = std::result::Result<T, ConfError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and structured log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Values and schema
    InvalidInput,
    MalformedValue,
    TypeMismatch,
    UnknownField,
    UnknownCollection,
    UnknownEntityType,
    SchemaInvalid,

    // Keys and paths
    MissingKey,
    DuplicateKey,
    UnknownKey,
    PathCollision,
    InvalidPath,

    // Store driver
    NoSuchEntry,
    EntryExists,
    NoSuchAttribute,
    Store,

    // Documents
    InvalidDocument,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    DeterminismViolation,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MalformedValue => "ERR_MALFORMED_VALUE",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::UnknownField => "ERR_UNKNOWN_FIELD",
            ExErrorKind::UnknownCollection => "ERR_UNKNOWN_COLLECTION",
            ExErrorKind::UnknownEntityType => "ERR_UNKNOWN_ENTITY_TYPE",
            ExErrorKind::SchemaInvalid => "ERR_SCHEMA_INVALID",
            ExErrorKind::MissingKey => "ERR_MISSING_KEY",
            ExErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ExErrorKind::UnknownKey => "ERR_UNKNOWN_KEY",
            ExErrorKind::PathCollision => "ERR_PATH_COLLISION",
            ExErrorKind::InvalidPath => "ERR_INVALID_PATH",
            ExErrorKind::NoSuchEntry => "ERR_NO_SUCH_ENTRY",
            ExErrorKind::EntryExists => "ERR_ENTRY_EXISTS",
            ExErrorKind::NoSuchAttribute => "ERR_NO_SUCH_ATTRIBUTE",
            ExErrorKind::Store => "ERR_STORE",
            ExErrorKind::InvalidDocument => "ERR_INVALID_DOCUMENT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::DeterminismViolation => "ERR_DETERMINISM_VIOLATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context needed
/// to locate the failure in a configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    entity_type: Option<String>,
    attribute: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            entity_type: None,
            attribute: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add store path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add entity type context
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Add attribute context
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the store path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the entity type context, if any
    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    /// Get the attribute context, if any
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (attribute: {})", attribute)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for configuration reconciliation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfError {
    // ===== Values =====
    /// Stored text cannot be parsed to the field's semantic type
    #[error("Malformed value for {attribute}: {value:?} ({reason})")]
    MalformedValue {
        attribute: String,
        value: String,
        reason: String,
    },

    /// A value of the wrong semantic type was supplied for a field
    #[error("Field {field} expects a {expected} value")]
    TypeMismatch { field: String, expected: String },

    /// A value of the right type that the field does not accept
    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    // ===== Schema =====
    #[error("Entity type {entity_type} has no field {field}")]
    UnknownField { entity_type: String, field: String },

    #[error("Entity type {entity_type} has no child collection {collection}")]
    UnknownCollection {
        entity_type: String,
        collection: String,
    },

    #[error("Unknown entity type: {name}")]
    UnknownEntityType { name: String },

    #[error("Invalid schema: {reason}")]
    SchemaInvalid { reason: String },

    // ===== Keys and paths =====
    /// A child entity lacks a value for one of its key fields
    #[error("Entity of type {entity_type} has no value for key field {field}")]
    MissingKey { entity_type: String, field: String },

    /// A child with the same key is already present in the collection
    #[error("Collection {collection} already contains key {key}")]
    DuplicateKey { collection: String, key: String },

    /// A stored collection entry whose key attribute is absent or unparsable
    #[error("Entry {path} in collection {collection} has no usable key: {reason}")]
    UnknownKey {
        path: String,
        collection: String,
        reason: String,
    },

    /// Two entities derive the same store path
    #[error("Path collision at {path}: keys {first} and {second}")]
    PathCollision {
        path: String,
        first: String,
        second: String,
    },

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    // ===== Store driver =====
    #[error("No such entry: {path}")]
    NoSuchEntry { path: String },

    #[error("Entry already exists: {path}")]
    EntryExists { path: String },

    #[error("Entry {path} has no attribute {attribute}")]
    NoSuchAttribute { path: String, attribute: String },

    /// Failure reported by the store driver itself
    #[error("Store operation {op} failed: {message}")]
    Store { op: String, message: String },

    // ===== Documents =====
    /// A YAML configuration document that does not match the schema
    #[error("Invalid document {source_name}: {reason}")]
    InvalidDocument { source_name: String, reason: String },

    // ===== Other =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ConfError> for ExError {
    fn from(err: ConfError) -> Self {
        let message = err.to_string();
        match err {
            ConfError::MalformedValue { attribute, .. } => {
                ExError::new(ExErrorKind::MalformedValue).with_attribute(attribute)
            }
            ConfError::TypeMismatch { field, .. } => {
                ExError::new(ExErrorKind::TypeMismatch).with_attribute(field)
            }
            ConfError::InvalidValue { field, .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_attribute(field)
            }
            ConfError::UnknownField { entity_type, field } => {
                ExError::new(ExErrorKind::UnknownField)
                    .with_entity_type(entity_type)
                    .with_attribute(field)
            }
            ConfError::UnknownCollection { entity_type, .. } => {
                ExError::new(ExErrorKind::UnknownCollection).with_entity_type(entity_type)
            }
            ConfError::UnknownEntityType { name } => {
                ExError::new(ExErrorKind::UnknownEntityType).with_entity_type(name)
            }
            ConfError::SchemaInvalid { .. } => ExError::new(ExErrorKind::SchemaInvalid),
            ConfError::MissingKey { entity_type, field } => {
                ExError::new(ExErrorKind::MissingKey)
                    .with_entity_type(entity_type)
                    .with_attribute(field)
            }
            ConfError::DuplicateKey { .. } => ExError::new(ExErrorKind::DuplicateKey),
            ConfError::UnknownKey { path, .. } => {
                ExError::new(ExErrorKind::UnknownKey).with_path(path)
            }
            ConfError::PathCollision { path, .. } => {
                ExError::new(ExErrorKind::PathCollision).with_path(path)
            }
            ConfError::InvalidPath { path, .. } => {
                ExError::new(ExErrorKind::InvalidPath).with_path(path)
            }
            ConfError::NoSuchEntry { path } => {
                ExError::new(ExErrorKind::NoSuchEntry).with_path(path)
            }
            ConfError::EntryExists { path } => {
                ExError::new(ExErrorKind::EntryExists).with_path(path)
            }
            ConfError::NoSuchAttribute { path, attribute } => {
                ExError::new(ExErrorKind::NoSuchAttribute)
                    .with_path(path)
                    .with_attribute(attribute)
            }
            ConfError::Store { op, .. } => ExError::new(ExErrorKind::Store).with_op(op),
            ConfError::InvalidDocument { .. } => ExError::new(ExErrorKind::InvalidDocument),
            ConfError::Serialization { .. } => ExError::new(ExErrorKind::Serialization),
            ConfError::Internal { .. } => ExError::new(ExErrorKind::Internal),
        }
        .with_message(message)
    }
}
