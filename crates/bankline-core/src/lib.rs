//! # bankline-core: Bank Transaction Totals and Validation
//!
//! This crate models a bank transaction made of line items and computes its
//! totals under tax-exclusive and tax-inclusive conventions. Everything here
//! is a pure function of in-memory state; configuration loading is the only
//! filesystem access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bankline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           API transport / persistence (collaborators)           │   │
//! │  │      fetch transactions, resolve Contact + BankAccount refs     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ StoredTransaction                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ bankline-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────┐ ┌────────────┐ ┌─────────────┐ ┌────────────┐   │   │
//! │  │  │  hydrate  │ │transaction │ │ calculator  │ │   record   │   │   │
//! │  │  │  loader   │ │ totals +   │ │ Aggregator  │ │  Schema +  │   │   │
//! │  │  │           │ │ validation │ │             │ │  Record    │   │   │
//! │  │  └───────────┘ └────────────┘ └─────────────┘ └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • NO LOCKING • EXACT DECIMALS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line items, line amount types, references
//! - [`money`] - Exact decimal `Money` and `RoundingMode`
//! - [`calculator`] - `Aggregator`, folds line items into totals
//! - [`transaction`] - `BankTransaction`, recalculation policy, validation rules
//! - [`hydrate`] - Loader path for persisted transactions
//! - [`record`] - Schema declarations and the `Record` trait
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Exact Money**: Decimal arithmetic, explicit 2-place rounding per line
//! 2. **Derived Totals**: read-only accessors; only hydration writes the cache
//! 3. **Collected Validation**: every broken rule is reported at once
//! 4. **Explicit Errors**: typed errors, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bankline_core::{BankTransaction, LineAmountType, LineItem};
//!
//! let mut txn = BankTransaction::new();
//! txn.set_line_amount_type(LineAmountType::Inclusive);
//! txn.set_line_items(vec![
//!     LineItem::new("100.005".parse().unwrap(), "10.00".parse().unwrap()),
//!     LineItem::new("50.00".parse().unwrap(), "5.00".parse().unwrap()),
//! ]);
//!
//! assert_eq!(txn.sub_total().to_string(), "135.01");
//! assert_eq!(txn.total_tax().to_string(), "15.00");
//! assert_eq!(txn.total().to_string(), "150.01");
//!
//! // Contact, bank account and type are still missing.
//! assert_eq!(txn.validate().len(), 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod config;
pub mod error;
pub mod hydrate;
pub mod money;
pub mod record;
pub mod transaction;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::Aggregator;
pub use config::BanklineConfig;
pub use error::{ConfigError, CoreError, CoreResult, TotalField, ValidationError};
pub use hydrate::StoredTransaction;
pub use money::{Money, RoundingMode};
pub use record::{FieldValue, Record};
pub use transaction::{BankTransaction, LineItems, LoadState, Totals, TotalsState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fractional digits of every rounded monetary value.
pub const MONEY_SCALE: u32 = 2;
