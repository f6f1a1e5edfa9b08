//! # Domain Types
//!
//! Value types shared by the calculator, the transaction entity and the
//! hydration path.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │ LineAmountType  │   │ TransactionType │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  line_amount    │   │  Exclusive      │   │  SPEND          │       │
//! │  │  tax_amount     │   │  Inclusive      │   │  RECEIVE        │       │
//! │  │  quantity, ...  │   │  NoTax          │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   ContactRef    │   │ BankAccountRef  │  Resolved by the caller;    │
//! │  │  contact_id     │   │  account_id     │  the core only checks that  │
//! │  │  name           │   │  code           │  they are present.          │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Line Amount Type
// =============================================================================

/// How line amounts relate to tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineAmountType {
    /// Line amounts exclude tax; tax is added on top.
    Exclusive,
    /// Line amounts already include tax.
    Inclusive,
    /// No tax applies to the lines.
    NoTax,
}

impl LineAmountType {
    /// Every value, in the order the accounting API lists them.
    pub const ALL: [LineAmountType; 3] = [
        LineAmountType::Inclusive,
        LineAmountType::Exclusive,
        LineAmountType::NoTax,
    ];

    /// The API string for this value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineAmountType::Exclusive => "Exclusive",
            LineAmountType::Inclusive => "Inclusive",
            LineAmountType::NoTax => "NoTax",
        }
    }

    /// Exact-match parse of an API string.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl Default for LineAmountType {
    fn default() -> Self {
        LineAmountType::Exclusive
    }
}

impl fmt::Display for LineAmountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LineAmountType> for String {
    fn from(value: LineAmountType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for LineAmountType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineAmountType::parse(s).ok_or_else(|| ConfigError::InvalidValue {
            key: "line_amount_type".to_string(),
            reason: format!("'{}' is not one of Inclusive, Exclusive, NoTax", s),
        })
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of money for a bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money out of the bank account.
    Spend,
    /// Money into the bank account.
    Receive,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Spend, TransactionType::Receive];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Spend => "SPEND",
            TransactionType::Receive => "RECEIVE",
        }
    }

    /// Exact-match parse; `"spend"` and `"TRANSFER"` are both rejected.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        value.as_str().to_string()
    }
}

// =============================================================================
// References
// =============================================================================

/// Reference to a contact, as resolved by the relationship collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactRef {
    #[serde(rename = "ContactID")]
    pub contact_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ContactRef {
    pub fn new(contact_id: impl Into<String>) -> Self {
        ContactRef {
            contact_id: contact_id.into(),
            name: None,
        }
    }

    /// A reference with a blank id counts as absent.
    pub fn is_blank(&self) -> bool {
        self.contact_id.trim().is_empty()
    }
}

/// Reference to the bank account the transaction posts against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BankAccountRef {
    #[serde(rename = "AccountID")]
    pub account_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl BankAccountRef {
    pub fn new(account_id: impl Into<String>) -> Self {
        BankAccountRef {
            account_id: account_id.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_blank(&self) -> bool {
        self.account_id.trim().is_empty()
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// The two amounts the calculator reads from a line.
///
/// Implemented by [`LineItem`]; collaborators with their own line type can
/// implement it to fold their lines directly.
pub trait LineAmounts {
    fn line_amount(&self) -> Money;
    fn tax_amount(&self) -> Money;
}

/// A line on a bank transaction.
///
/// Amounts are kept exactly as supplied (any scale); rounding happens in the
/// calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,

    #[serde(default)]
    pub line_amount: Money,

    #[serde(default)]
    pub tax_amount: Money,
}

impl LineItem {
    /// Creates a line from its line and tax amounts.
    pub fn new(line_amount: Money, tax_amount: Money) -> Self {
        LineItem {
            description: None,
            quantity: None,
            unit_amount: None,
            account_code: None,
            tax_type: None,
            line_amount,
            tax_amount,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_account_code(mut self, code: impl Into<String>) -> Self {
        self.account_code = Some(code.into());
        self
    }
}

impl LineAmounts for LineItem {
    #[inline]
    fn line_amount(&self) -> Money {
        self.line_amount
    }

    #[inline]
    fn tax_amount(&self) -> Money {
        self.tax_amount
    }
}

impl<T: LineAmounts + ?Sized> LineAmounts for &T {
    fn line_amount(&self) -> Money {
        (**self).line_amount()
    }

    fn tax_amount(&self) -> Money {
        (**self).tax_amount()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_amount_type_default() {
        assert_eq!(LineAmountType::default(), LineAmountType::Exclusive);
    }

    #[test]
    fn test_line_amount_type_parse_is_exact() {
        assert_eq!(LineAmountType::parse("Inclusive"), Some(LineAmountType::Inclusive));
        assert_eq!(LineAmountType::parse("NoTax"), Some(LineAmountType::NoTax));
        assert_eq!(LineAmountType::parse("inclusive"), None);
        assert_eq!(LineAmountType::parse(""), None);
        assert!(matches!(
            "Gross".parse::<LineAmountType>(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "line_amount_type"
        ));
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(TransactionType::parse("SPEND"), Some(TransactionType::Spend));
        assert_eq!(TransactionType::parse("RECEIVE"), Some(TransactionType::Receive));
        assert_eq!(TransactionType::parse("TRANSFER"), None);
        assert_eq!(TransactionType::parse("spend"), None);
    }

    #[test]
    fn test_blank_references() {
        assert!(ContactRef::new("  ").is_blank());
        assert!(!ContactRef::new("c-1").is_blank());
        assert!(BankAccountRef::new("").is_blank());
        assert_eq!(BankAccountRef::new("a-1").with_code("090").code.as_deref(), Some("090"));
    }

    #[test]
    fn test_line_item_api_shape() {
        let json = r#"{"Description":"Coffee","LineAmount":"100.005","TaxAmount":"10.00"}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.description.as_deref(), Some("Coffee"));
        assert_eq!(item.line_amount(), "100.005".parse().unwrap());
        assert_eq!(item.tax_amount(), "10.00".parse().unwrap());
    }
}
