//! # Error Types
//!
//! Domain-specific error types for bankline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Raised (returned as Err, fatal to the call)                           │
//! │  ├── CoreError        - Illegal mutations, unknown fields, config      │
//! │  └── ConfigError      - Config file / env problems                     │
//! │                                                                         │
//! │  Reported (returned as values from validate())                         │
//! │  └── ValidationError  - One per violated rule, never raised            │
//! │                                                                         │
//! │  The two kinds never mix: validate() has no Err path, and an illegal   │
//! │  total assignment is never reported as a validation failure.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

// =============================================================================
// Total Field
// =============================================================================

/// The derived total fields of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalField {
    SubTotal,
    TotalTax,
    Total,
}

impl TotalField {
    /// Attribute name as declared in the record schema.
    pub const fn name(&self) -> &'static str {
        match self {
            TotalField::SubTotal => "sub_total",
            TotalField::TotalTax => "total_tax",
            TotalField::Total => "total",
        }
    }

    /// Maps a schema attribute name back to a total field.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sub_total" => Some(TotalField::SubTotal),
            "total_tax" => Some(TotalField::TotalTax),
            "total" => Some(TotalField::Total),
            _ => None,
        }
    }
}

impl fmt::Display for TotalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A caller tried to assign a derived total.
    ///
    /// ## When This Occurs
    /// - `set_sub_total`, `set_total_tax` or `set_total` was called
    /// - `set_field("total", ..)` or either other total by name
    ///
    /// Totals only enter an entity through hydration.
    #[error("Setting {0} directly is not supported")]
    SettingTotalDirectlyNotSupported(TotalField),

    /// The field is assigned by persistence (the primary key).
    #[error("Field {0} is assigned by persistence and cannot be set")]
    ReadOnlyField(String),

    /// No field with this name is declared in the record schema.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The value given to a by-name assignment has the wrong kind.
    #[error("Field {field} expects a {expected} value")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// Configuration error (wraps ConfigError).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written.
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for the config schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A config value is out of its allowed set.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// No platform config directory could be determined.
    #[error("No config path available")]
    NoConfigPath,
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single violated validation rule.
///
/// `validate()` returns every violation at once; an empty list means the
/// record is valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required attribute or relationship is missing.
    #[error("{field} can't be blank")]
    Required { field: String },

    /// Value is not in the allowed set.
    #[error("{field} not one of {}", .allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Rule with its own message.
    #[error("{message}")]
    Invalid { field: String, message: String },
}

impl ValidationError {
    /// The attribute the rule was registered against.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Invalid { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
