//! # Hydration
//!
//! The loader the persistence collaborator uses to turn stored data into a
//! [`BankTransaction`], and the snapshot it persists back.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  storage / API ──► StoredTransaction ──► BankTransaction::hydrate      │
//! │                    (API field names)        │                           │
//! │                                             ├── identity assigned      │
//! │                                             ├── cached SubTotal/TotalTax│
//! │                                             └── LineItems + LoadState  │
//! │                                                                         │
//! │  BankTransaction::to_stored ──► StoredTransaction ──► storage / API    │
//! │                                                                         │
//! │  Public setters never touch the cache; this module is the only writer. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use bankline_core::hydrate::StoredTransaction;
//!
//! let json = r#"{
//!     "BankTransactionID": "bt-1",
//!     "Type": "SPEND",
//!     "LineAmountTypes": "Exclusive",
//!     "SubTotal": "200.00",
//!     "TotalTax": "20.00",
//!     "Total": "220.00"
//! }"#;
//!
//! let stored: StoredTransaction = serde_json::from_str(json).unwrap();
//! let txn = stored.into_transaction();
//!
//! // Listed without its lines: the persisted totals are trusted.
//! assert_eq!(txn.total().to_string(), "220.00");
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculator::Aggregator;
use crate::money::Money;
use crate::transaction::{BankTransaction, CachedTotals, LineItems, LoadState};
use crate::types::{BankAccountRef, ContactRef, LineAmountType, LineItem};

/// A bank transaction as stored, in the external API's field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredTransaction {
    #[serde(
        rename = "BankTransactionID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bank_transaction_id: Option<String>,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_amount_types: Option<String>,

    #[serde(
        rename = "UpdatedDateUTC",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date_utc: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_paid_on_date: Option<NaiveDate>,

    #[serde(default)]
    pub is_reconciled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<BankAccountRef>,

    /// `None` when the lines were not fetched (list endpoints omit them).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,

    /// Set by a paging loader when `line_items` holds only the first page.
    #[serde(skip)]
    pub line_items_truncated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
}

impl StoredTransaction {
    /// Hydrates with the default calculator.
    pub fn into_transaction(self) -> BankTransaction {
        BankTransaction::hydrate(self)
    }

    fn line_items_load(&mut self) -> LineItems {
        match self.line_items.take() {
            None => LineItems::not_loaded(),
            Some(items) if self.line_items_truncated => LineItems::partial(items),
            Some(items) => LineItems::complete(items),
        }
    }
}

impl BankTransaction {
    /// Builds a transaction from stored data, loading its cached totals.
    pub fn hydrate(stored: StoredTransaction) -> Self {
        BankTransaction::hydrate_with(stored, Aggregator::default())
    }

    /// Same as [`hydrate`](Self::hydrate) with a specific calculator.
    pub fn hydrate_with(mut stored: StoredTransaction, aggregator: Aggregator) -> Self {
        let mut txn = BankTransaction::with_aggregator(aggregator, LineAmountType::Exclusive);

        if let (Some(sub_total), Some(total_tax), Some(total)) =
            (stored.sub_total, stored.total_tax, stored.total)
        {
            if sub_total + total_tax != total {
                warn!(
                    id = ?stored.bank_transaction_id,
                    %sub_total,
                    %total_tax,
                    %total,
                    "Stored total disagrees with sub_total + total_tax, ignoring stored total"
                );
            }
        }

        txn.line_items = stored.line_items_load();
        txn.cached = CachedTotals {
            sub_total: stored.sub_total,
            total_tax: stored.total_tax,
        };
        txn.bank_transaction_id = stored.bank_transaction_id.filter(|id| !id.trim().is_empty());

        if let Some(kind) = stored.transaction_type {
            txn.set_transaction_type(kind);
        }
        if let Some(kind) = stored.line_amount_types {
            txn.set_line_amount_type(kind);
        }
        txn.set_date(stored.date);
        txn.set_updated_date_utc(stored.updated_date_utc);
        txn.set_fully_paid_on_date(stored.fully_paid_on_date);
        txn.set_reconciled(stored.is_reconciled);
        txn.set_contact(stored.contact);
        txn.set_bank_account(stored.bank_account);

        debug!(
            id = ?txn.bank_transaction_id(),
            lines = txn.line_items().len(),
            load_state = ?txn.line_items().load_state(),
            "Hydrated bank transaction"
        );

        txn
    }

    /// Snapshot for the persistence collaborator, totals as currently read.
    ///
    /// Lines are written only when the collection is complete; a partial or
    /// unloaded collection is left out so storage keeps its own lines.
    pub fn to_stored(&self) -> StoredTransaction {
        let totals = self.totals();
        let line_items = self.line_items();

        StoredTransaction {
            bank_transaction_id: self.bank_transaction_id().map(str::to_string),
            transaction_type: self.transaction_type().map(str::to_string),
            date: self.date(),
            line_amount_types: self.line_amount_type().map(str::to_string),
            updated_date_utc: self.updated_date_utc(),
            fully_paid_on_date: self.fully_paid_on_date(),
            is_reconciled: self.is_reconciled(),
            contact: self.contact().cloned(),
            bank_account: self.bank_account().cloned(),
            line_items: (line_items.load_state() == LoadState::Complete)
                .then(|| line_items.as_slice().to_vec()),
            line_items_truncated: false,
            sub_total: Some(totals.sub_total),
            total_tax: Some(totals.total_tax),
            total: Some(totals.total),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::RoundingMode;
    use crate::record::Record;
    use crate::transaction::TotalsState;
    use crate::types::LineAmounts;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn stored_header() -> StoredTransaction {
        StoredTransaction {
            bank_transaction_id: Some("bt-1".to_string()),
            transaction_type: Some("SPEND".to_string()),
            contact: Some(ContactRef::new("c-1")),
            bank_account: Some(BankAccountRef::new("a-1")),
            sub_total: Some(money("200.00")),
            total_tax: Some(money("20.00")),
            total: Some(money("220.00")),
            ..Default::default()
        }
    }

    fn lines() -> Vec<LineItem> {
        vec![
            LineItem::new(money("100.005"), money("10.00")),
            LineItem::new(money("50.00"), money("5.00")),
        ]
    }

    #[test]
    fn test_hydrate_without_lines_trusts_cache() {
        let txn = stored_header().into_transaction();
        assert!(!txn.is_new_record());
        assert_eq!(txn.line_items().load_state(), LoadState::NotLoaded);
        assert_eq!(txn.totals_state(), TotalsState::PersistedWithoutLines);
        assert_eq!(txn.sub_total(), money("200.00"));
        assert_eq!(txn.total_tax(), money("20.00"));
        assert_eq!(txn.total(), money("220.00"));
    }

    #[test]
    fn test_hydrate_with_lines_recomputes() {
        let stored = StoredTransaction {
            line_items: Some(lines()),
            ..stored_header()
        };
        let txn = BankTransaction::hydrate(stored);
        assert_eq!(txn.totals_state(), TotalsState::PersistedWithLines);
        assert_eq!(txn.total(), money("165.01"));
    }

    #[test]
    fn test_hydrate_truncated_lines_trusts_cache() {
        let stored = StoredTransaction {
            line_items: Some(lines()),
            line_items_truncated: true,
            ..stored_header()
        };
        let txn = BankTransaction::hydrate(stored);
        assert_eq!(txn.line_items().load_state(), LoadState::Partial);
        assert_eq!(txn.total(), money("220.00"));
    }

    #[test]
    fn test_line_added_after_hydrate_is_saved() {
        let mut txn = stored_header().into_transaction();
        txn.add_line_item(LineItem::new(money("10.00"), money("1.00")));

        assert_eq!(txn.total(), money("11.00"));

        let stored = txn.to_stored();
        let saved = stored.line_items.expect("appended line is written");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].line_amount(), money("10.00"));
        assert_eq!(stored.sub_total, Some(money("10.00")));
        assert_eq!(stored.total, Some(money("11.00")));
    }

    #[test]
    fn test_hydrate_keeps_default_line_amount_type() {
        let txn = stored_header().into_transaction();
        assert_eq!(txn.line_amount_type(), Some("Exclusive"));
    }

    #[test]
    fn test_hydrate_blank_id_is_new() {
        let stored = StoredTransaction {
            bank_transaction_id: Some("  ".to_string()),
            ..stored_header()
        };
        let txn = stored.into_transaction();
        assert!(txn.is_new_record());
        assert_eq!(txn.total(), money("0.00"));
    }

    #[test]
    fn test_inconsistent_stored_total_is_ignored() {
        let stored = StoredTransaction {
            total: Some(money("999.99")),
            ..stored_header()
        };
        let txn = stored.into_transaction();
        assert_eq!(txn.total(), money("220.00"));
    }

    #[test]
    fn test_hydrate_with_rounding() {
        let stored = StoredTransaction {
            line_items: Some(lines()),
            ..stored_header()
        };
        let txn = BankTransaction::hydrate_with(stored, Aggregator::new(RoundingMode::Bankers));
        assert_eq!(txn.sub_total(), money("150.00"));
    }

    #[test]
    fn test_api_names() {
        let json = r#"{
            "BankTransactionID": "bt-9",
            "Type": "RECEIVE",
            "Date": "2024-03-01",
            "LineAmountTypes": "Inclusive",
            "UpdatedDateUTC": "2024-03-02T10:00:00Z",
            "IsReconciled": true,
            "Contact": { "ContactID": "c-9", "Name": "Acme" },
            "BankAccount": { "AccountID": "a-9", "Code": "090" },
            "LineItems": [
                { "LineAmount": "100.005", "TaxAmount": "10.00" },
                { "LineAmount": "50.00", "TaxAmount": "5.00" }
            ],
            "SubTotal": "135.01",
            "TotalTax": "15.00",
            "Total": "150.01"
        }"#;

        let txn: BankTransaction = serde_json::from_str::<StoredTransaction>(json)
            .unwrap()
            .into_transaction();

        assert_eq!(txn.bank_transaction_id(), Some("bt-9"));
        assert_eq!(txn.date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(txn.reconciled());
        assert_eq!(txn.bank_account().and_then(|a| a.code.as_deref()), Some("090"));
        assert!(txn.is_valid());
        assert_eq!(txn.sub_total(), money("135.01"));
        assert_eq!(txn.total(), money("150.01"));
    }

    #[test]
    fn test_to_stored_round_trip_keeps_totals() {
        let mut txn = BankTransaction::new();
        txn.set_transaction_type("SPEND");
        txn.set_line_items(lines());

        let stored = txn.to_stored();
        assert_eq!(stored.sub_total, Some(money("150.01")));
        assert_eq!(stored.total, Some(money("165.01")));
        assert_eq!(stored.line_items.as_ref().map(Vec::len), Some(2));

        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"SubTotal\":\"150.01\""));
        assert!(!json.contains("BankTransactionID"));
    }

    #[test]
    fn test_to_stored_omits_unloaded_lines() {
        let txn = stored_header().into_transaction();
        let stored = txn.to_stored();
        assert!(stored.line_items.is_none());
        assert_eq!(stored.total, Some(money("220.00")));
    }
}
