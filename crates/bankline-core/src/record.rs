//! # Record Schemas
//!
//! A small declarative layer an entity uses to describe its fields,
//! relationships and validations.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Schema<R>  (static data)            Record  (trait)                  │
//! │   ───────────────────────             ───────────────                  │
//! │   fields         name/api_name/kind   schema()  → &Schema<Self>        │
//! │   relationships  belongs_to/has_many  id()      → Option<&str>         │
//! │   validations    inclusion/presence/  field()   → FieldValue           │
//! │                  custom               validate() runs the schema       │
//! │                                                                         │
//! │   The entity supplies its schema and overrides only what differs       │
//! │   (totals, extra rules). No base struct to inherit from.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult, TotalField, ValidationError};
use crate::money::Money;

// =============================================================================
// Field Declarations
// =============================================================================

/// Storage kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Date,
    DateTime,
    Boolean,
    Decimal,
}

impl FieldKind {
    pub const fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Boolean => "boolean",
            FieldKind::Decimal => "decimal",
        }
    }
}

/// A declared scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Attribute name used in Rust code.
    pub name: &'static str,
    /// Name in the external API representation.
    pub api_name: &'static str,
    pub kind: FieldKind,
    /// Derived fields are read-only; only hydration may set their cache.
    pub derived: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, api_name: &'static str, kind: FieldKind) -> Self {
        FieldDef {
            name,
            api_name,
            kind,
            derived: false,
        }
    }

    pub const fn derived(name: &'static str, api_name: &'static str, kind: FieldKind) -> Self {
        FieldDef {
            name,
            api_name,
            kind,
            derived: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    BelongsTo,
    HasMany,
}

/// A declared association to another model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub name: &'static str,
    pub model_name: &'static str,
    pub kind: RelationshipKind,
}

impl Relationship {
    pub const fn belongs_to(name: &'static str, model_name: &'static str) -> Self {
        Relationship {
            name,
            model_name,
            kind: RelationshipKind::BelongsTo,
        }
    }

    pub const fn has_many(name: &'static str, model_name: &'static str) -> Self {
        Relationship {
            name,
            model_name,
            kind: RelationshipKind::HasMany,
        }
    }
}

// =============================================================================
// Validations
// =============================================================================

/// A validation rule registered on a schema.
pub enum Validation<R> {
    /// Value must be one of `allowed`.
    InclusionOf {
        field: &'static str,
        allowed: &'static [&'static str],
        allow_blank: bool,
        message: Option<&'static str>,
    },

    /// Field or relationship must be set and non-blank.
    PresenceOf { field: &'static str },

    /// Arbitrary predicate over the record; `false` reports `message`.
    Custom {
        field: &'static str,
        message: &'static str,
        check: fn(&R) -> bool,
    },
}

impl<R: Record> Validation<R> {
    /// Runs this rule. `None` means the rule holds.
    pub fn check(&self, record: &R) -> Option<ValidationError> {
        match self {
            Validation::InclusionOf {
                field,
                allowed,
                allow_blank,
                message,
            } => {
                let value = record.field(field);
                if value.is_blank() {
                    if *allow_blank {
                        return None;
                    }
                } else if value
                    .as_text()
                    .is_some_and(|text| allowed.iter().any(|a| *a == text))
                {
                    return None;
                }

                Some(match message {
                    Some(message) => ValidationError::Invalid {
                        field: field.to_string(),
                        message: message.to_string(),
                    },
                    None => ValidationError::NotAllowed {
                        field: field.to_string(),
                        allowed: allowed.iter().map(|a| a.to_string()).collect(),
                    },
                })
            }
            Validation::PresenceOf { field } => {
                record.field(field).is_blank().then(|| ValidationError::Required {
                    field: field.to_string(),
                })
            }
            Validation::Custom {
                field,
                message,
                check,
            } => (!check(record)).then(|| ValidationError::Invalid {
                field: field.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Everything a model declares about itself.
pub struct Schema<R: 'static> {
    pub model_name: &'static str,
    pub primary_key: &'static str,
    pub fields: &'static [FieldDef],
    pub relationships: &'static [Relationship],
    pub validations: &'static [Validation<R>],
}

impl<R: 'static> Schema<R> {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_api_name(&self, api_name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.api_name == api_name)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Looks up a field for by-name assignment.
    ///
    /// Derived totals are rejected with `SettingTotalDirectlyNotSupported`.
    pub fn assignable(&self, name: &str) -> CoreResult<&FieldDef> {
        let field = self
            .field(name)
            .ok_or_else(|| CoreError::UnknownField(name.to_string()))?;

        if field.derived {
            return Err(match TotalField::from_name(name) {
                Some(total) => CoreError::SettingTotalDirectlyNotSupported(total),
                None => CoreError::UnknownField(name.to_string()),
            });
        }

        Ok(field)
    }
}

// =============================================================================
// Field Values
// =============================================================================

/// A field read or written by name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Boolean(bool),
    Decimal(Money),
    /// A resolved belongs-to reference (its id).
    Reference(String),
    /// A has-many collection (its size).
    Collection(usize),
}

impl FieldValue {
    /// Null, whitespace-only text and blank references are blank.
    /// Empty collections are not: their size is checked by custom rules.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) | FieldValue::Reference(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn kind_matches(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Null, _)
                | (FieldValue::Text(_), FieldKind::String)
                | (FieldValue::Date(_), FieldKind::Date)
                | (FieldValue::DateTime(_), FieldKind::DateTime)
                | (FieldValue::Boolean(_), FieldKind::Boolean)
                | (FieldValue::Decimal(_), FieldKind::Decimal)
        )
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Money> for FieldValue {
    fn from(value: Money) -> Self {
        FieldValue::Decimal(value)
    }
}

// =============================================================================
// Record Trait
// =============================================================================

/// An entity described by a [`Schema`].
pub trait Record: Sized + 'static {
    fn schema() -> &'static Schema<Self>;

    /// Persistence identity; `None` until the record is saved.
    fn id(&self) -> Option<&str>;

    /// Reads a declared field or relationship by name.
    fn field(&self, name: &str) -> FieldValue;

    fn is_new_record(&self) -> bool {
        self.id().map_or(true, |id| id.trim().is_empty())
    }

    /// Runs every registered validation and collects all failures.
    fn validate(&self) -> Vec<ValidationError> {
        Self::schema()
            .validations
            .iter()
            .filter_map(|rule| rule.check(self))
            .collect()
    }

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        id: Option<String>,
        colour: Option<String>,
        owner: Option<String>,
        parts: usize,
    }

    fn has_parts(w: &Widget) -> bool {
        w.parts > 0
    }

    static WIDGET_SCHEMA: Schema<Widget> = Schema {
        model_name: "Widget",
        primary_key: "widget_id",
        fields: &[
            FieldDef::new("widget_id", "WidgetID", FieldKind::String),
            FieldDef::new("colour", "Colour", FieldKind::String),
            FieldDef::derived("total", "Total", FieldKind::Decimal),
            FieldDef::derived("weight", "Weight", FieldKind::Decimal),
        ],
        relationships: &[
            Relationship::belongs_to("owner", "Owner"),
            Relationship::has_many("parts", "Part"),
        ],
        validations: &[
            Validation::InclusionOf {
                field: "colour",
                allowed: &["red", "blue"],
                allow_blank: false,
                message: None,
            },
            Validation::PresenceOf { field: "owner" },
            Validation::Custom {
                field: "parts",
                message: "needs parts",
                check: has_parts,
            },
        ],
    };

    impl Record for Widget {
        fn schema() -> &'static Schema<Self> {
            &WIDGET_SCHEMA
        }

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn field(&self, name: &str) -> FieldValue {
            match name {
                "widget_id" => self.id.clone().into(),
                "colour" => self.colour.clone().into(),
                "owner" => self
                    .owner
                    .clone()
                    .map_or(FieldValue::Null, FieldValue::Reference),
                "parts" => FieldValue::Collection(self.parts),
                _ => FieldValue::Null,
            }
        }
    }

    fn valid_widget() -> Widget {
        Widget {
            id: None,
            colour: Some("red".to_string()),
            owner: Some("o-1".to_string()),
            parts: 2,
        }
    }

    #[test]
    fn test_valid_record_has_no_failures() {
        let w = valid_widget();
        assert!(w.validate().is_empty());
        assert!(w.is_valid());
        assert!(w.is_new_record());
    }

    #[test]
    fn test_all_failures_reported() {
        let w = Widget {
            id: Some("w-1".to_string()),
            colour: Some("green".to_string()),
            owner: None,
            parts: 0,
        };
        let errors = w.validate();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field(), "colour");
        assert_eq!(errors[1], ValidationError::Required { field: "owner".to_string() });
        assert_eq!(errors[2].to_string(), "needs parts");
        assert!(!w.is_new_record());
    }

    #[test]
    fn test_blank_inclusion_rejected_when_not_allowed_blank() {
        let mut w = valid_widget();
        w.colour = Some("   ".to_string());
        assert_eq!(w.validate().len(), 1);
    }

    #[test]
    fn test_blank_id_counts_as_new() {
        let mut w = valid_widget();
        w.id = Some(String::new());
        assert!(w.is_new_record());
    }

    #[test]
    fn test_schema_lookups() {
        let schema = Widget::schema();
        assert_eq!(schema.field_by_api_name("Colour").map(|f| f.name), Some("colour"));
        assert_eq!(
            schema.relationship("parts").map(|r| r.kind),
            Some(RelationshipKind::HasMany)
        );
        assert!(schema.field("nope").is_none());
    }

    #[test]
    fn test_assignable_rejects_derived_and_unknown() {
        let schema = Widget::schema();
        assert!(schema.assignable("colour").is_ok());
        assert!(matches!(
            schema.assignable("total"),
            Err(CoreError::SettingTotalDirectlyNotSupported(TotalField::Total))
        ));
        assert!(matches!(schema.assignable("weight"), Err(CoreError::UnknownField(_))));
        assert!(matches!(schema.assignable("nope"), Err(CoreError::UnknownField(_))));
    }

    #[test]
    fn test_kind_matches() {
        assert!(FieldValue::from("x").kind_matches(FieldKind::String));
        assert!(FieldValue::Null.kind_matches(FieldKind::Date));
        assert!(!FieldValue::Boolean(true).kind_matches(FieldKind::String));
    }
}
