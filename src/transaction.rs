//! The transaction data model shared by the API client, the tracker and the views.
//!
//! Transactions are owned by the Transactions API. The client only ever holds
//! a copy of the last fetched list, plus a [Draft] of the form being edited.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use time::Date;

use crate::Error;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The identifier the Transactions API assigns to a transaction.
///
/// The API may use integers or strings for IDs, so both are accepted and sent
/// back in the same JSON representation they arrived in. IDs are opaque: they
/// are only ever copied from a listed transaction, never rebuilt from text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    /// An integer ID, e.g. `42`.
    Number(i64),
    /// A string ID, e.g. `"6650a1f3"`.
    Text(String),
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionId::Number(id) => write!(f, "{id}"),
            TransactionId::Text(id) => write!(f, "{id}"),
        }
    }
}

/// Whether money came in or went out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    #[default]
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used on the wire and in form values.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

/// A decimal amount of money, kept as the exact text the API sent.
///
/// The API does not say whether expenses are stored as negative numbers or as
/// positive numbers tagged with [TransactionType::Expense], so the amount is
/// never re-signed or re-formatted. [Amount::magnitude] gives the unsigned
/// text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount(String);

impl Amount {
    /// Wrap the decimal text `amount` without validating it.
    pub fn new(amount: impl Into<String>) -> Self {
        Self(amount.into())
    }

    /// The amount exactly as the API sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The amount without a leading sign.
    pub fn magnitude(&self) -> &str {
        self.0.trim_start_matches(['-', '+'])
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Keep the literal JSON text of numbers, so `4.50` stays "4.50".
    ///
    /// Only works with `serde_json`'s own deserializers (`from_str`,
    /// `from_slice`), not with [serde_json::Value].
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get();

        if text.starts_with('"') {
            let text: String = serde_json::from_str(text).map_err(serde::de::Error::custom)?;
            return Ok(Amount(text));
        }

        match serde_json::from_str::<serde_json::Number>(text) {
            Ok(_) => Ok(Amount(text.to_owned())),
            Err(_) => Err(serde::de::Error::custom(format!(
                "expected a number or a string for an amount, got {text}"
            ))),
        }
    }
}

/// A transaction as returned by the Transactions API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID assigned by the API.
    pub id: TransactionId,
    /// What the transaction was for.
    pub description: String,
    /// How much money changed hands.
    pub amount: Amount,
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Whether this was income or an expense.
    #[serde(rename = "type")]
    pub type_: TransactionType,
}

/// The form fields being composed for a new transaction or an edit.
///
/// Values are kept as the user typed them and are sent to the API verbatim,
/// validation is left to the browser's form constraints and the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// The description input.
    pub description: String,
    /// The amount input.
    pub amount: String,
    /// The date input, `YYYY-MM-DD` when filled in.
    pub date: String,
    /// The transaction type select.
    #[serde(rename = "type")]
    pub type_: TransactionType,
}

impl Draft {
    /// Copy the editable fields of `transaction` into a new draft.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            description: transaction.description.clone(),
            amount: transaction.amount.as_str().to_owned(),
            date: transaction.date.to_string(),
            type_: transaction.type_,
        }
    }

    /// Set the field named by `field` to `value`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] if `field` is [DraftField::Type]
    /// and `value` is neither "income" nor "expense".
    pub fn set(&mut self, field: DraftField, value: &str) -> Result<(), Error> {
        match field {
            DraftField::Description => self.description = value.to_owned(),
            DraftField::Amount => self.amount = value.to_owned(),
            DraftField::Date => self.date = value.to_owned(),
            DraftField::Type => self.type_ = value.parse()?,
        }

        Ok(())
    }
}

/// The names of the editable fields in a [Draft].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DraftField {
    Description,
    Amount,
    Date,
    Type,
}
