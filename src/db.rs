//! Creates the tables for the application's domain models.

use rusqlite::Connection;

use crate::{auth::create_user_table, category::create_category_table, expense::create_expense_table};

/// Create the tables for users, categories and expenses if they do not exist.
///
/// Foreign keys are switched on for `connection` so that deleting a user also
/// deletes their categories and expenses.
///
/// # Errors
/// Returns an error if any of the SQL queries fail.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_user_table(connection)?;
    create_category_table(connection)?;
    create_expense_table(connection)?;

    Ok(())
}
