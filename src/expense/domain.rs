//! The expense record and its builder.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, category::CategoryName};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Money spent on something, filed under a category.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// How much was spent in hryvnias. Never negative.
    pub amount: f64,
    /// The name of the category the expense is filed under.
    pub category: CategoryName,
    /// The day the money was spent.
    pub date: Date,
    /// An optional note about what the money was spent on.
    pub comment: Option<String>,
    /// When the expense was recorded.
    pub created_at: Option<OffsetDateTime>,
}

impl Expense {
    /// Start building a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(amount: f64, category: CategoryName, date: Date) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            category,
            date,
            comment: None,
            created_at: None,
        }
    }
}

/// The fields of an [Expense] before it has been stored.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Expense::build(85.0, CategoryName::new("Транспорт")?, date!(2025 - 10 - 05))
///     .comment(Some("Таксі додому".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    /// How much was spent in hryvnias.
    pub amount: f64,
    /// The category to file the expense under.
    pub category: CategoryName,
    /// The day the money was spent.
    pub date: Date,
    /// An optional note. Blank comments are stored as `None`.
    pub comment: Option<String>,
    /// When the expense was recorded, defaults to the time it is stored.
    pub created_at: Option<OffsetDateTime>,
}

impl ExpenseBuilder {
    /// Set the comment. Blank comments are treated as no comment.
    pub fn comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment
            .map(|comment| comment.trim().to_owned())
            .filter(|comment| !comment.is_empty());
        self
    }

    /// Set the time the expense was recorded.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Parse an amount typed by a user.
///
/// Either a dot or a comma may be used as the decimal separator, spaces are
/// ignored.
///
/// # Errors
///
/// Returns an [Error::InvalidAmount] if the text is not a number, or is
/// negative, infinite or NaN.
pub fn parse_amount(raw: &str) -> Result<f64, Error> {
    let normalised = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>();

    match normalised.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(Error::InvalidAmount(raw.to_owned())),
    }
}

/// The column to list expenses by, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpenseOrder {
    /// By when the expense was recorded.
    #[default]
    CreatedAt,
    /// By the day the money was spent.
    Date,
}

impl ExpenseOrder {
    pub(crate) fn order_by_clause(self) -> &'static str {
        match self {
            ExpenseOrder::CreatedAt => "ORDER BY created_at DESC, id DESC",
            ExpenseOrder::Date => "ORDER BY date DESC, id DESC",
        }
    }
}
