//! Core expense domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// The expense type used when a client does not provide one.
pub const DEFAULT_EXPENSE_TYPE: &str = "Debet";

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Parse an expense ID from a request path segment.
///
/// IDs are assigned by the database starting from one, so only unsigned
/// 32-bit integers are accepted.
///
/// # Errors
///
/// Returns [Error::InvalidId] if `raw_id` is not an unsigned 32-bit integer.
pub fn parse_expense_id(raw_id: &str) -> Result<ExpenseId, Error> {
    raw_id
        .parse::<u32>()
        .map(ExpenseId::from)
        .map_err(|_| Error::InvalidId)
}

/// A validated, non-empty expense title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ExpenseTitle(String);

impl ExpenseTitle {
    /// Create an expense title.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyExpenseTitle] if `title` is empty or only whitespace.
    /// Otherwise the title is kept exactly as given.
    pub fn new(title: &str) -> Result<Self, Error> {
        if title.trim().is_empty() {
            Err(Error::EmptyExpenseTitle)
        } else {
            Ok(Self(title.to_string()))
        }
    }

    /// Create an expense title without validation.
    ///
    /// The caller should ensure that the string is not empty, e.g. because it
    /// was read back from the database.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for ExpenseTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single expense, i.e. an event where money was spent or received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID assigned by the database.
    pub id: ExpenseId,
    /// What the money was spent on.
    pub title: ExpenseTitle,
    /// A free-text grouping such as "Food" or "Rent".
    pub category: String,
    /// A free-text classification such as "Debet" or "Credit".
    #[serde(rename = "type")]
    pub expense_type: String,
    /// The amount of money involved.
    pub amount: f64,
    /// When the expense happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// A validated expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What the money was spent on.
    pub title: ExpenseTitle,
    /// A free-text grouping such as "Food".
    pub category: String,
    /// The classification, already defaulted.
    pub expense_type: String,
    /// The amount of money involved.
    pub amount: f64,
    /// When the expense happened.
    pub date: OffsetDateTime,
}

/// The JSON body for creating or updating an expense.
///
/// Any `id` sent by the client is ignored. `type` is optional: new expenses
/// fall back to [DEFAULT_EXPENSE_TYPE] and updates keep the existing type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseData {
    /// What the money was spent on, must not be empty.
    pub title: String,
    /// A free-text grouping such as "Food".
    pub category: String,
    /// An optional classification, see [ExpenseData::into_new_expense] and [ExpenseData::apply_to].
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
    /// The amount of money involved.
    pub amount: f64,
    /// When the expense happened, as an RFC 3339 date-time.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl ExpenseData {
    /// Validate the payload for creating a new expense.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyExpenseTitle] if the title is empty.
    pub fn into_new_expense(self) -> Result<NewExpense, Error> {
        let title = ExpenseTitle::new(&self.title)?;
        let expense_type = match self.expense_type {
            Some(expense_type) if !expense_type.is_empty() => expense_type,
            _ => DEFAULT_EXPENSE_TYPE.to_owned(),
        };

        Ok(NewExpense {
            title,
            category: self.category,
            expense_type,
            amount: self.amount,
            date: self.date,
        })
    }

    /// Merge the payload into `expense`.
    ///
    /// The title, category, amount and date are always overwritten. The type
    /// is only overwritten when the payload has a non-empty type.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyExpenseTitle] if the title is empty.
    pub fn apply_to(self, expense: Expense) -> Result<Expense, Error> {
        let title = ExpenseTitle::new(&self.title)?;
        let expense_type = match self.expense_type {
            Some(expense_type) if !expense_type.is_empty() => expense_type,
            _ => expense.expense_type,
        };

        Ok(Expense {
            id: expense.id,
            title,
            category: self.category,
            expense_type,
            amount: self.amount,
            date: self.date,
        })
    }
}
