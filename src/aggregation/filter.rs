//! Narrowing a list of expenses down by category and date range.

use std::cmp::Reverse;

use serde::Deserialize;
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::expense::Expense;

/// The date format used in forms and query strings, e.g. "2025-10-05".
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a date in the `YYYY-MM-DD` format, treating blank input as absent.
pub(crate) fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    match Date::parse(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(error) => {
            tracing::warn!("Ignoring invalid date \"{raw}\": {error}");
            None
        }
    }
}

/// The filters a user can apply to their expense list.
///
/// A `None` field does not constrain the result. Filters are never stored,
/// they travel in the page's query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilters {
    /// Only keep expenses with exactly this category.
    pub category: Option<String>,
    /// Only keep expenses on or after this date.
    pub date_from: Option<Date>,
    /// Only keep expenses on or before this date.
    pub date_to: Option<Date>,
}

/// The filter fields as they appear in a query string.
#[derive(Debug, Default, Deserialize)]
struct RawExpenseFilters {
    category: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
}

impl ExpenseFilters {
    /// Build filters from raw query string values.
    ///
    /// Blank values and dates that are not in the `YYYY-MM-DD` format are
    /// treated as absent.
    pub fn from_raw(
        category: Option<&str>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Self {
        let category = category
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);

        Self {
            category,
            date_from: date_from.and_then(parse_date),
            date_to: date_to.and_then(parse_date),
        }
    }

    /// Extract the filters from the query string of `url`, e.g. the value of
    /// the `HX-Current-URL` header.
    ///
    /// Unknown query parameters are ignored.
    pub fn from_url(url: &str) -> Self {
        let query = match url.split_once('?') {
            Some((_, query)) => query,
            None => return Self::default(),
        };

        let raw: RawExpenseFilters = serde_urlencoded::from_str(query).unwrap_or_else(|error| {
            tracing::warn!("Could not parse expense filters from \"{url}\": {error}");
            RawExpenseFilters::default()
        });

        Self::from_raw(
            raw.category.as_deref(),
            raw.date_from.as_deref(),
            raw.date_to.as_deref(),
        )
    }

    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.date_from.is_none() && self.date_to.is_none()
    }

    /// Whether `expense` passes every filter that is set.
    pub fn matches(&self, expense: &Expense) -> bool {
        let category_matches = self
            .category
            .as_deref()
            .is_none_or(|category| expense.category.as_ref() == category);

        let date_from = self.date_from.unwrap_or(Date::MIN);
        let date_to = self.date_to.unwrap_or(Date::MAX);

        category_matches && (date_from..=date_to).contains(&expense.date)
    }

    /// Remove the category filter if it refers to `category`.
    ///
    /// Returns whether the filter was cleared.
    pub fn clear_category_if(&mut self, category: &str) -> bool {
        if self.category.as_deref() == Some(category) {
            self.category = None;
            true
        } else {
            false
        }
    }

    /// Replace the category filter if it refers to `old_name`.
    pub fn rename_category(&mut self, old_name: &str, new_name: &str) {
        if self.category.as_deref() == Some(old_name) {
            self.category = Some(new_name.to_owned());
        }
    }

    /// Append the filters, and optionally a page number, to `route` as a
    /// query string.
    pub fn to_url(&self, route: &str, page: Option<u64>) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }

        if let Some(date_from) = self.date_from {
            params.push(("date_from", format_date(date_from)));
        }

        if let Some(date_to) = self.date_to {
            params.push(("date_to", format_date(date_to)));
        }

        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }

        if params.is_empty() {
            return route.to_owned();
        }

        match serde_urlencoded::to_string(&params) {
            Ok(query) => format!("{route}?{query}"),
            Err(error) => {
                tracing::error!("Could not encode expense filters {self:?}: {error}");
                route.to_owned()
            }
        }
    }
}

/// Format `date` the way date inputs and query strings expect it.
pub(crate) fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Keep the expenses that pass `filters`, preserving their order.
pub fn filter_expenses<'a, I>(expenses: I, filters: &ExpenseFilters) -> Vec<&'a Expense>
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses
        .into_iter()
        .filter(|expense| filters.matches(expense))
        .collect()
}

/// Sort expenses newest first.
///
/// Expenses are ordered by when they were recorded. An expense without a
/// creation time is placed as if it was recorded at midnight UTC on its date.
pub fn sort_for_display(expenses: &mut [&Expense]) {
    expenses.sort_by_key(|expense| Reverse(display_timestamp(expense)));
}

fn display_timestamp(expense: &Expense) -> OffsetDateTime {
    expense
        .created_at
        .unwrap_or_else(|| expense.date.midnight().assume_utc())
}
