//! # Bank Transactions
//!
//! A bank transaction (money spent from, or received into, a bank account)
//! made of line items, with totals that are either recomputed from those
//! lines or trusted from the last persisted values.
//!
//! ## When Totals Are Recomputed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TotalsState                                      │
//! │                                                                         │
//! │  New                     no identity yet          → recompute          │
//! │  PersistedWithLines      identity + complete,     → recompute          │
//! │                          non-empty line items                          │
//! │  PersistedWithoutLines   identity + lines empty,  → trust cached       │
//! │                          not loaded, or only                           │
//! │                          partially loaded                              │
//! │                                                                         │
//! │  A list endpoint returns transactions without their lines. Claiming    │
//! │  0.00 for those would be wrong, so the persisted totals are used.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bankline_core::transaction::BankTransaction;
//! use bankline_core::types::{BankAccountRef, ContactRef, LineItem, TransactionType};
//!
//! let mut txn = BankTransaction::new();
//! txn.set_transaction_type(TransactionType::Spend);
//! txn.set_contact(Some(ContactRef::new("c-1")));
//! txn.set_bank_account(Some(BankAccountRef::new("a-1")));
//! txn.add_line_item(LineItem::new("100.005".parse().unwrap(), "10.00".parse().unwrap()));
//! txn.add_line_item(LineItem::new("50.00".parse().unwrap(), "5.00".parse().unwrap()));
//!
//! assert!(txn.is_valid());
//! assert_eq!(txn.sub_total().to_string(), "150.01");
//! assert_eq!(txn.total_tax().to_string(), "15.00");
//! assert_eq!(txn.total().to_string(), "165.01");
//! assert!(txn.set_total("500.00".parse().unwrap()).is_err());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculator::Aggregator;
use crate::config::BanklineConfig;
use crate::error::{CoreError, CoreResult, TotalField, ValidationError};
use crate::money::Money;
use crate::record::{
    FieldDef, FieldKind, FieldValue, Record, Relationship, Schema, Validation,
};
use crate::types::{BankAccountRef, ContactRef, LineAmountType, LineItem, TransactionType};

pub const INVALID_TYPE_MESSAGE: &str = "Invalid type. Expected either SPEND or RECEIVE.";
pub const INVALID_LINE_ITEMS_MESSAGE: &str = "Invalid line items. Must supply at least one.";

// =============================================================================
// Line Item Collection
// =============================================================================

/// How much of a transaction's line-item collection is in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Every line is present (or the caller built the list itself).
    #[default]
    Complete,
    /// A truncated page of lines; more exist in storage.
    Partial,
    /// Lines were not fetched.
    NotLoaded,
}

/// The owned, ordered line items plus how completely they were loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItems {
    items: Vec<LineItem>,
    load_state: LoadState,
}

impl LineItems {
    /// A complete collection.
    pub fn complete(items: Vec<LineItem>) -> Self {
        LineItems {
            items,
            load_state: LoadState::Complete,
        }
    }

    /// A truncated page of lines.
    pub fn partial(items: Vec<LineItem>) -> Self {
        LineItems {
            items,
            load_state: LoadState::Partial,
        }
    }

    pub fn not_loaded() -> Self {
        LineItems {
            items: Vec::new(),
            load_state: LoadState::NotLoaded,
        }
    }

    #[inline]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.load_state == LoadState::Complete
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// =============================================================================
// Totals State
// =============================================================================

/// Which source a transaction's totals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsState {
    New,
    PersistedWithLines,
    PersistedWithoutLines,
}

impl TotalsState {
    /// `true` when totals are computed from the line items.
    #[inline]
    pub const fn recalculates(self) -> bool {
        !matches!(self, TotalsState::PersistedWithoutLines)
    }
}

/// A consistent snapshot of the three totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Totals {
    pub sub_total: Money,
    pub total_tax: Money,
    pub total: Money,
}

/// Totals last persisted for this transaction. Set only by hydration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CachedTotals {
    pub(crate) sub_total: Option<Money>,
    pub(crate) total_tax: Option<Money>,
}

// =============================================================================
// Schema
// =============================================================================

fn has_line_items(txn: &BankTransaction) -> bool {
    !txn.line_items.is_empty()
}

static BANK_TRANSACTION_SCHEMA: Schema<BankTransaction> = Schema {
    model_name: "BankTransaction",
    primary_key: "bank_transaction_id",
    fields: &[
        FieldDef::new("bank_transaction_id", "BankTransactionID", FieldKind::String),
        FieldDef::new("type", "Type", FieldKind::String),
        FieldDef::new("date", "Date", FieldKind::Date),
        FieldDef::new("line_amount_type", "LineAmountTypes", FieldKind::String),
        FieldDef::new("updated_date_utc", "UpdatedDateUTC", FieldKind::DateTime),
        FieldDef::new("fully_paid_on_date", "FullyPaidOnDate", FieldKind::Date),
        FieldDef::new("is_reconciled", "IsReconciled", FieldKind::Boolean),
        FieldDef::derived("sub_total", "SubTotal", FieldKind::Decimal),
        FieldDef::derived("total_tax", "TotalTax", FieldKind::Decimal),
        FieldDef::derived("total", "Total", FieldKind::Decimal),
    ],
    relationships: &[
        Relationship::belongs_to("contact", "Contact"),
        Relationship::belongs_to("bank_account", "BankAccount"),
        Relationship::has_many("line_items", "LineItem"),
    ],
    validations: &[
        Validation::InclusionOf {
            field: "line_amount_type",
            allowed: &["Inclusive", "Exclusive", "NoTax"],
            allow_blank: false,
            message: None,
        },
        Validation::InclusionOf {
            field: "type",
            allowed: &["SPEND", "RECEIVE"],
            allow_blank: false,
            message: Some(INVALID_TYPE_MESSAGE),
        },
        Validation::PresenceOf { field: "contact" },
        Validation::PresenceOf {
            field: "bank_account",
        },
        Validation::Custom {
            field: "line_items",
            message: INVALID_LINE_ITEMS_MESSAGE,
            check: has_line_items,
        },
    ],
};

// =============================================================================
// Bank Transaction
// =============================================================================

/// A bank transaction and its line items.
///
/// The three totals have read accessors only. Cached totals are written by
/// [`BankTransaction::hydrate`] and nowhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct BankTransaction {
    pub(crate) bank_transaction_id: Option<String>,
    transaction_type: Option<String>,
    date: Option<NaiveDate>,
    line_amount_type: Option<String>,
    updated_date_utc: Option<DateTime<Utc>>,
    fully_paid_on_date: Option<NaiveDate>,
    is_reconciled: bool,
    contact: Option<ContactRef>,
    bank_account: Option<BankAccountRef>,
    pub(crate) line_items: LineItems,
    pub(crate) cached: CachedTotals,
    aggregator: Aggregator,
}

impl Default for BankTransaction {
    fn default() -> Self {
        BankTransaction::new()
    }
}

impl BankTransaction {
    /// A new, unsaved transaction with `Exclusive` line amounts.
    pub fn new() -> Self {
        BankTransaction::with_aggregator(Aggregator::default(), LineAmountType::Exclusive)
    }

    /// A new transaction using the configured rounding and default line amount type.
    pub fn with_config(config: &BanklineConfig) -> Self {
        BankTransaction::with_aggregator(config.aggregator(), config.defaults.line_amount_type)
    }

    pub(crate) fn with_aggregator(aggregator: Aggregator, line_amount_type: LineAmountType) -> Self {
        BankTransaction {
            bank_transaction_id: None,
            transaction_type: None,
            date: None,
            line_amount_type: Some(line_amount_type.as_str().to_string()),
            updated_date_utc: None,
            fully_paid_on_date: None,
            is_reconciled: false,
            contact: None,
            bank_account: None,
            line_items: LineItems::default(),
            cached: CachedTotals::default(),
            aggregator,
        }
    }

    // =========================================================================
    // Scalar Accessors
    // =========================================================================

    pub fn bank_transaction_id(&self) -> Option<&str> {
        self.bank_transaction_id.as_deref()
    }

    /// Raw `type` value, which may be outside SPEND/RECEIVE until validated.
    pub fn transaction_type(&self) -> Option<&str> {
        self.transaction_type.as_deref()
    }

    pub fn parsed_transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type.as_deref().and_then(TransactionType::parse)
    }

    pub fn set_transaction_type(&mut self, value: impl Into<String>) {
        self.transaction_type = Some(value.into());
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
    }

    pub fn line_amount_type(&self) -> Option<&str> {
        self.line_amount_type.as_deref()
    }

    pub fn parsed_line_amount_type(&self) -> Option<LineAmountType> {
        self.line_amount_type.as_deref().and_then(LineAmountType::parse)
    }

    pub fn set_line_amount_type(&mut self, value: impl Into<String>) {
        self.line_amount_type = Some(value.into());
    }

    pub fn updated_date_utc(&self) -> Option<DateTime<Utc>> {
        self.updated_date_utc
    }

    pub fn set_updated_date_utc(&mut self, at: Option<DateTime<Utc>>) {
        self.updated_date_utc = at;
    }

    pub fn fully_paid_on_date(&self) -> Option<NaiveDate> {
        self.fully_paid_on_date
    }

    pub fn set_fully_paid_on_date(&mut self, date: Option<NaiveDate>) {
        self.fully_paid_on_date = date;
    }

    pub fn is_reconciled(&self) -> bool {
        self.is_reconciled
    }

    /// Alias of [`is_reconciled`](Self::is_reconciled).
    pub fn reconciled(&self) -> bool {
        self.is_reconciled
    }

    pub fn set_reconciled(&mut self, reconciled: bool) {
        self.is_reconciled = reconciled;
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    pub fn contact(&self) -> Option<&ContactRef> {
        self.contact.as_ref()
    }

    pub fn set_contact(&mut self, contact: Option<ContactRef>) {
        self.contact = contact;
    }

    pub fn bank_account(&self) -> Option<&BankAccountRef> {
        self.bank_account.as_ref()
    }

    pub fn set_bank_account(&mut self, account: Option<BankAccountRef>) {
        self.bank_account = account;
    }

    pub fn line_items(&self) -> &LineItems {
        &self.line_items
    }

    /// Replaces all lines; the caller's list is taken as complete.
    pub fn set_line_items(&mut self, items: Vec<LineItem>) {
        self.line_items = LineItems::complete(items);
    }

    /// Appends a line and marks the collection complete.
    ///
    /// On a persisted record whose lines were not fully loaded the caller now
    /// owns the line list: totals are recomputed from it and it is what
    /// [`to_stored`](Self::to_stored) writes.
    pub fn add_line_item(&mut self, item: LineItem) {
        if !self.is_new_record() && !self.line_items.is_complete() {
            warn!(
                id = ?self.bank_transaction_id,
                load_state = ?self.line_items.load_state(),
                loaded = self.line_items.len(),
                "Appending to a line collection that was not fully loaded"
            );
        }
        self.line_items.items.push(item);
        self.line_items.load_state = LoadState::Complete;
    }

    // =========================================================================
    // Totals
    // =========================================================================

    pub fn aggregator(&self) -> Aggregator {
        self.aggregator
    }

    /// Classifies where totals come from right now.
    pub(crate) fn totals_state(&self) -> TotalsState {
        if self.is_new_record() {
            TotalsState::New
        } else if self.line_items.is_complete() && !self.line_items.is_empty() {
            TotalsState::PersistedWithLines
        } else {
            TotalsState::PersistedWithoutLines
        }
    }

    pub fn sub_total(&self) -> Money {
        self.sub_total_in(self.totals_state())
    }

    pub fn total_tax(&self) -> Money {
        self.total_tax_in(self.totals_state())
    }

    /// Always `sub_total() + total_tax()`.
    pub fn total(&self) -> Money {
        self.totals().total
    }

    /// All three totals from a single state classification.
    pub fn totals(&self) -> Totals {
        let state = self.totals_state();
        let sub_total = self.sub_total_in(state);
        let total_tax = self.total_tax_in(state);
        Totals {
            sub_total,
            total_tax,
            total: sub_total + total_tax,
        }
    }

    fn sub_total_in(&self, state: TotalsState) -> Money {
        if state.recalculates() {
            self.computed_sub_total()
        } else {
            self.cached_total(TotalField::SubTotal, self.cached.sub_total, || {
                self.computed_sub_total()
            })
        }
    }

    fn total_tax_in(&self, state: TotalsState) -> Money {
        if state.recalculates() {
            self.computed_total_tax()
        } else {
            self.cached_total(TotalField::TotalTax, self.cached.total_tax, || {
                self.computed_total_tax()
            })
        }
    }

    fn computed_sub_total(&self) -> Money {
        let mut result = self.aggregator.sub_total(&self.line_items);
        // Inclusive line amounts embed their tax.
        if self.parsed_line_amount_type() == Some(LineAmountType::Inclusive) {
            result -= self.computed_total_tax();
        }
        result
    }

    fn computed_total_tax(&self) -> Money {
        self.aggregator.total_tax(&self.line_items)
    }

    /// Cached value, or the best figure available when the cache is empty:
    /// the loaded lines if there are any, zero otherwise.
    fn cached_total(
        &self,
        field: TotalField,
        value: Option<Money>,
        from_loaded_lines: impl FnOnce() -> Money,
    ) -> Money {
        if let Some(value) = value {
            return value;
        }

        if self.line_items.is_empty() {
            warn!(
                id = ?self.bank_transaction_id,
                field = %field,
                "Persisted transaction has no cached total, reading as zero"
            );
            Money::zero()
        } else {
            warn!(
                id = ?self.bank_transaction_id,
                field = %field,
                loaded = self.line_items.len(),
                "Persisted transaction has no cached total, recomputing from loaded lines"
            );
            from_loaded_lines()
        }
    }

    /// Always fails: the subtotal is derived.
    pub fn set_sub_total(&mut self, _value: Money) -> CoreResult<()> {
        Err(CoreError::SettingTotalDirectlyNotSupported(TotalField::SubTotal))
    }

    /// Always fails: the tax total is derived.
    pub fn set_total_tax(&mut self, _value: Money) -> CoreResult<()> {
        Err(CoreError::SettingTotalDirectlyNotSupported(TotalField::TotalTax))
    }

    /// Always fails: the total is derived.
    pub fn set_total(&mut self, _value: Money) -> CoreResult<()> {
        Err(CoreError::SettingTotalDirectlyNotSupported(TotalField::Total))
    }

    // =========================================================================
    // By-Name Assignment
    // =========================================================================

    /// Assigns a declared scalar field by its schema name.
    ///
    /// ## Errors
    /// - `SettingTotalDirectlyNotSupported` for `sub_total`, `total_tax`, `total`
    /// - `ReadOnlyField` for the primary key
    /// - `UnknownField` for names the schema does not declare as fields
    /// - `FieldTypeMismatch` when the value kind does not match the field
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> CoreResult<()> {
        let schema = Self::schema();
        let def = schema.assignable(name)?;

        if def.name == schema.primary_key {
            return Err(CoreError::ReadOnlyField(name.to_string()));
        }

        if !value.kind_matches(def.kind) {
            return Err(CoreError::FieldTypeMismatch {
                field: name.to_string(),
                expected: def.kind.name(),
            });
        }

        match (def.name, value) {
            ("type", FieldValue::Text(s)) => self.transaction_type = Some(s),
            ("type", _) => self.transaction_type = None,
            ("line_amount_type", FieldValue::Text(s)) => self.line_amount_type = Some(s),
            ("line_amount_type", _) => self.line_amount_type = None,
            ("date", FieldValue::Date(d)) => self.date = Some(d),
            ("date", _) => self.date = None,
            ("updated_date_utc", FieldValue::DateTime(at)) => self.updated_date_utc = Some(at),
            ("updated_date_utc", _) => self.updated_date_utc = None,
            ("fully_paid_on_date", FieldValue::Date(d)) => self.fully_paid_on_date = Some(d),
            ("fully_paid_on_date", _) => self.fully_paid_on_date = None,
            ("is_reconciled", FieldValue::Boolean(b)) => self.is_reconciled = b,
            ("is_reconciled", _) => self.is_reconciled = false,
            (other, _) => return Err(CoreError::UnknownField(other.to_string())),
        }

        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Every violated rule; empty when valid. Never mutates.
    pub fn validate(&self) -> Vec<ValidationError> {
        Record::validate(self)
    }

    pub fn is_valid(&self) -> bool {
        Record::is_valid(self)
    }
}

impl Record for BankTransaction {
    fn schema() -> &'static Schema<Self> {
        &BANK_TRANSACTION_SCHEMA
    }

    fn id(&self) -> Option<&str> {
        self.bank_transaction_id.as_deref()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "bank_transaction_id" => self.bank_transaction_id.clone().into(),
            "type" => self.transaction_type.clone().into(),
            "date" => self.date.into(),
            "line_amount_type" => self.line_amount_type.clone().into(),
            "updated_date_utc" => self.updated_date_utc.into(),
            "fully_paid_on_date" => self.fully_paid_on_date.into(),
            "is_reconciled" => self.is_reconciled.into(),
            "sub_total" => self.sub_total().into(),
            "total_tax" => self.total_tax().into(),
            "total" => self.total().into(),
            "contact" => self
                .contact
                .as_ref()
                .map_or(FieldValue::Null, |c| FieldValue::Reference(c.contact_id.clone())),
            "bank_account" => self
                .bank_account
                .as_ref()
                .map_or(FieldValue::Null, |a| FieldValue::Reference(a.account_id.clone())),
            "line_items" => FieldValue::Collection(self.line_items.len()),
            _ => FieldValue::Null,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
