//! Grouping expenses by category and by month.

use std::collections::BTreeMap;

use time::{Date, Month};

use crate::expense::Expense;

/// The sum and number of expenses in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category name exactly as stored on the expenses.
    pub category: String,
    /// The sum of the amounts.
    pub total: f64,
    /// The number of expenses.
    pub count: usize,
}

/// Sum and count expenses per category, largest total first.
///
/// Only categories that appear in `expenses` are included. Categories with
/// equal totals are ordered by name.
pub fn category_totals<'a, I>(expenses: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for expense in expenses {
        let (total, count) = groups.entry(expense.category.as_ref()).or_default();
        *total += expense.amount;
        *count += 1;
    }

    let mut totals = groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_owned(),
            total,
            count,
        })
        .collect::<Vec<_>>();

    totals.sort_by(|a, b| b.total.total_cmp(&a.total));

    totals
}

/// The sum and number of expenses dated within one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// The calendar year.
    pub year: i32,
    /// The month of `year`.
    pub month: Month,
    /// A human readable label, e.g. "Жовтень 2025".
    pub label: String,
    /// The sum of the amounts.
    pub total: f64,
    /// The number of expenses.
    pub count: usize,
}

/// Sum and count expenses per calendar month, most recent month first.
///
/// Only months that contain at least one expense are included.
pub fn monthly_totals<'a, I>(expenses: I) -> Vec<MonthlyTotal>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut groups: BTreeMap<(i32, u8), (f64, usize)> = BTreeMap::new();

    for expense in expenses {
        let key = (expense.date.year(), expense.date.month() as u8);
        let (total, count) = groups.entry(key).or_default();
        *total += expense.amount;
        *count += 1;
    }

    groups
        .into_iter()
        .rev()
        .filter_map(|((year, month), (total, count))| {
            let month = Month::try_from(month).ok()?;

            Some(MonthlyTotal {
                year,
                month,
                label: format!("{} {year}", month_name(month)),
                total,
                count,
            })
        })
        .collect()
}

/// The Ukrainian name of `month` in the nominative case.
pub fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Січень",
        Month::February => "Лютий",
        Month::March => "Березень",
        Month::April => "Квітень",
        Month::May => "Травень",
        Month::June => "Червень",
        Month::July => "Липень",
        Month::August => "Серпень",
        Month::September => "Вересень",
        Month::October => "Жовтень",
        Month::November => "Листопад",
        Month::December => "Грудень",
    }
}

/// The sum of the amounts of the expenses dated in the same calendar month as
/// `today`.
pub fn current_month_total<'a, I>(expenses: I, today: Date) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    month_total(expenses, today.year(), today.month())
}

fn month_total<'a, I>(expenses: I, year: i32, month: Month) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses
        .into_iter()
        .filter(|expense| expense.date.year() == year && expense.date.month() == month)
        .map(|expense| expense.amount)
        .sum()
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyOverview {
    /// The sum of all expenses.
    pub total: f64,
    /// The number of expenses.
    pub count: usize,
    /// The sum of the expenses in the month containing today.
    pub current_month_total: f64,
    /// The sum of the expenses in the calendar month before the current one.
    pub previous_month_total: f64,
    /// The change from the previous month to the current month as a
    /// percentage, or `None` when nothing was spent in the previous month.
    pub change_percent: Option<f64>,
    /// `total` divided by the number of months that have expenses.
    pub average_per_month: f64,
    /// `total` divided by `count`.
    pub average_per_expense: f64,
}

/// Summarise `expenses` relative to the month containing `today`.
pub fn monthly_overview<'a, I>(expenses: I, today: Date) -> MonthlyOverview
where
    I: IntoIterator<Item = &'a Expense>,
{
    let expenses = expenses.into_iter().collect::<Vec<_>>();

    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
    let count = expenses.len();
    let month_count = monthly_totals(expenses.iter().copied()).len();

    let current_month_total = current_month_total(expenses.iter().copied(), today);
    let previous_month_total = match previous_month(today) {
        Some((year, month)) => month_total(expenses.iter().copied(), year, month),
        None => 0.0,
    };

    let change_percent = (previous_month_total > 0.0).then(|| {
        (current_month_total - previous_month_total) / previous_month_total * 100.0
    });

    MonthlyOverview {
        total,
        count,
        current_month_total,
        previous_month_total,
        change_percent,
        average_per_month: if month_count == 0 {
            0.0
        } else {
            total / month_count as f64
        },
        average_per_expense: if count == 0 { 0.0 } else { total / count as f64 },
    }
}

fn previous_month(today: Date) -> Option<(i32, Month)> {
    let last_day_of_previous_month = today.replace_day(1).ok()?.previous_day()?;

    Some((
        last_day_of_previous_month.year(),
        last_day_of_previous_month.month(),
    ))
}
