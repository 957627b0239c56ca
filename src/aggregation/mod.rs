//! Filtering, sorting and summarising of a user's expenses.
//!
//! Everything here works on borrowed [Expense](crate::Expense)s that have
//! already been loaded for a single user. None of these functions touch the
//! database.

mod filter;
mod format;
mod totals;

pub use filter::{ExpenseFilters, filter_expenses, sort_for_display};
pub use format::{format_currency, ukrainian_plural};
pub use totals::{
    CategoryTotal, MonthlyOverview, MonthlyTotal, category_totals, current_month_total,
    monthly_overview, monthly_totals,
};

pub(crate) use filter::{format_date, parse_date};
