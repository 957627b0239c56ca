//! Database operations for expenses.
//!
//! Every query matches on the owner as well as the expense ID, so a user can
//! never read or change another user's expenses.

use rusqlite::{Connection, Row};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::UserID,
    category::CategoryName,
    expense::{Expense, ExpenseBuilder, ExpenseId, ExpenseOrder},
};

const EXPENSE_COLUMNS: &str = "id, amount, category, date, comment, created_at";

/// Store a new expense for `user_id` and return it with its generated ID.
///
/// The creation time defaults to now.
///
/// # Errors
/// Returns an [Error::InvalidAmount] if the amount is negative, or an
/// [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    builder: ExpenseBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let created_at = builder
        .created_at
        .unwrap_or_else(OffsetDateTime::now_utc)
        .to_offset(UtcOffset::UTC);

    connection
        .prepare(&format!(
            "INSERT INTO expense (user_id, amount, category, date, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount,
                builder.category.as_ref(),
                builder.date,
                &builder.comment,
                created_at,
            ),
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
                },
                _,
            ) => Error::InvalidAmount(builder.amount.to_string()),
            error => error.into(),
        })
}

/// Retrieve one of the user's expenses by its `id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `id` does not refer to one of the user's
/// expenses.
pub fn get_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve all of the user's expenses, newest first by `order`.
pub fn get_expenses(
    user_id: UserID,
    order: ExpenseOrder,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE user_id = :user_id {}",
            order.order_by_clause()
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Replace the amount, category, date and comment of one of the user's
/// expenses, keeping its creation time.
///
/// # Errors
/// Returns an [Error::UpdateMissingExpense] if `id` does not refer to one of
/// the user's expenses.
pub fn update_expense(
    id: ExpenseId,
    builder: ExpenseBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "UPDATE expense SET amount = ?1, category = ?2, date = ?3, comment = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                builder.amount,
                builder.category.as_ref(),
                builder.date,
                &builder.comment,
                id,
                user_id.as_i64(),
            ),
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
            error => error.into(),
        })
}

/// Delete one of the user's expenses.
///
/// # Errors
/// Returns an [Error::DeleteMissingExpense] if `id` does not refer to one of
/// the user's expenses.
pub fn delete_expense(id: ExpenseId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK(amount >= 0),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                comment TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category: String = row.get(2)?;

    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: CategoryName::new_unchecked(&raw_category),
        date: row.get(3)?,
        comment: row.get(4)?,
        created_at: Some(row.get(5)?),
    })
}
