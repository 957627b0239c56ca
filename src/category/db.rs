//! Database operations for categories.
//!
//! Expenses refer to categories by name, so renaming or deleting a category
//! also updates or deletes the owner's expenses in the same transaction.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES},
};

/// Create a category for `user_id` and return it with its generated ID.
pub fn create_category(
    name: CategoryName,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name) VALUES (?1, ?2);",
            (user_id.as_i64(), name.as_ref()),
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateCategoryName(_) => Error::DuplicateCategoryName(name.to_string()),
            error => error,
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name })
}

/// Give a new user the [DEFAULT_CATEGORIES].
pub fn seed_default_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let transaction = connection.unchecked_transaction()?;

    let categories = DEFAULT_CATEGORIES
        .iter()
        .map(|name| create_category(CategoryName::new_unchecked(name), user_id, &transaction))
        .collect::<Result<Vec<_>, _>>()?;

    transaction.commit()?;

    Ok(categories)
}

/// Retrieve one of the user's categories by ID.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE id = :id AND user_id = :user_id;")?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's categories.
///
/// The order is unspecified, use [crate::CategoryRegistry] to sort them.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE user_id = :user_id;")?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename one of the user's categories and the expenses filed under it.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingCategory] if the category does not exist
/// or belongs to another user, or an [Error::DuplicateCategoryName] if the
/// user already has a category with the new name.
pub fn rename_category(
    category_id: CategoryId,
    new_name: &CategoryName,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let old_name = match get_category(category_id, user_id, &transaction) {
        Ok(category) => category.name,
        Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
        Err(error) => return Err(error),
    };

    transaction
        .execute(
            "UPDATE category SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            (new_name.as_ref(), category_id, user_id.as_i64()),
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateCategoryName(_) => Error::DuplicateCategoryName(new_name.to_string()),
            error => error,
        })?;

    transaction.execute(
        "UPDATE expense SET category = ?1 WHERE category = ?2 AND user_id = ?3",
        (new_name.as_ref(), old_name.as_ref(), user_id.as_i64()),
    )?;

    transaction.commit()?;

    Ok(())
}

/// Delete one of the user's categories together with its expenses.
///
/// Returns the deleted category.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingCategory] if the category does not exist
/// or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let transaction = connection.unchecked_transaction()?;

    let category = match get_category(category_id, user_id, &transaction) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    };

    transaction.execute(
        "DELETE FROM expense WHERE category = ?1 AND user_id = ?2",
        (category.name.as_ref(), user_id.as_i64()),
    )?;
    transaction.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    transaction.commit()?;

    Ok(category)
}

/// Count the user's expenses per category name.
pub fn count_expenses_per_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<String, u32>, Error> {
    let result: Result<HashMap<String, u32>, rusqlite::Error> = connection
        .prepare("SELECT category, COUNT(1) FROM expense WHERE user_id = ?1 GROUP BY category")?
        .query_map([user_id.as_i64()], |row| {
            let category = row.get(0)?;
            let count = row.get(1)?;

            Ok((category, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category { id, name })
}

#[cfg(test)]
mod category_query_tests {
    use std::collections::HashSet;

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{PasswordHash, UserID, create_user},
        category::{CategoryName, DEFAULT_CATEGORIES},
        db::initialize,
        expense::{Expense, create_expense, get_expenses},
        Email,
    };

    use super::{
        count_expenses_per_category, create_category, delete_category, get_categories,
        get_category, rename_category, seed_default_categories,
    };

    fn get_test_db_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            &Email::new_unchecked("olena@example.com"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (connection, user.id)
    }

    fn add_expense(amount: f64, category: &str, user_id: UserID, connection: &Connection) {
        create_expense(
            Expense::build(
                amount,
                CategoryName::new_unchecked(category),
                date!(2025 - 10 - 05),
            ),
            user_id,
            connection,
        )
        .expect("Could not create test expense");
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user_id) = get_test_db_connection();
        let name = CategoryName::new_unchecked("Кава");

        let category = create_category(name.clone(), user_id, &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(get_category(category.id, user_id, &connection), Ok(category));
    }

    #[test]
    fn create_duplicate_category_fails() {
        let (connection, user_id) = get_test_db_connection();
        let name = CategoryName::new_unchecked("Кава");
        create_category(name.clone(), user_id, &connection).unwrap();

        let result = create_category(name, user_id, &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName("Кава".to_owned())));
    }

    #[test]
    fn categories_are_scoped_by_user() {
        let (connection, user_id) = get_test_db_connection();
        let other_user = create_user(
            &Email::new_unchecked("taras@example.com"),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();
        let category =
            create_category(CategoryName::new_unchecked("Кава"), user_id, &connection).unwrap();
        create_category(CategoryName::new_unchecked("Кава"), other_user.id, &connection)
            .expect("Another user should be able to reuse a category name");

        assert_eq!(
            get_category(category.id, other_user.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(get_categories(user_id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn seeds_default_categories() {
        let (connection, user_id) = get_test_db_connection();

        seed_default_categories(user_id, &connection).expect("Could not seed categories");

        let got = get_categories(user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect::<HashSet<_>>();
        let want = DEFAULT_CATEGORIES
            .iter()
            .map(|name| name.to_string())
            .collect::<HashSet<_>>();
        assert_eq!(got, want);
    }

    #[test]
    fn rename_category_renames_expenses() {
        let (connection, user_id) = get_test_db_connection();
        let category =
            create_category(CategoryName::new_unchecked("Кава"), user_id, &connection).unwrap();
        add_expense(45.0, "Кава", user_id, &connection);
        add_expense(100.0, "Інше", user_id, &connection);
        let new_name = CategoryName::new_unchecked("Напої");

        rename_category(category.id, &new_name, user_id, &connection)
            .expect("Could not rename category");

        assert_eq!(
            get_category(category.id, user_id, &connection).unwrap().name,
            new_name
        );
        let counts = count_expenses_per_category(user_id, &connection).unwrap();
        assert_eq!(counts.get("Напої"), Some(&1));
        assert_eq!(counts.get("Кава"), None);
        assert_eq!(counts.get("Інше"), Some(&1));
    }

    #[test]
    fn rename_missing_category_fails() {
        let (connection, user_id) = get_test_db_connection();

        let result = rename_category(
            999,
            &CategoryName::new_unchecked("Напої"),
            user_id,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_category_deletes_its_expenses() {
        let (connection, user_id) = get_test_db_connection();
        let category =
            create_category(CategoryName::new_unchecked("Кава"), user_id, &connection).unwrap();
        add_expense(45.0, "Кава", user_id, &connection);
        add_expense(55.0, "Кава", user_id, &connection);
        add_expense(100.0, "Інше", user_id, &connection);

        let deleted = delete_category(category.id, user_id, &connection)
            .expect("Could not delete category");

        assert_eq!(deleted, category);
        assert_eq!(
            get_category(category.id, user_id, &connection),
            Err(Error::NotFound)
        );
        let remaining = get_expenses(user_id, Default::default(), &connection).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category.as_ref(), "Інше");
    }

    #[test]
    fn delete_other_users_category_fails() {
        let (connection, user_id) = get_test_db_connection();
        let category =
            create_category(CategoryName::new_unchecked("Кава"), user_id, &connection).unwrap();

        let result = delete_category(category.id, UserID::new(user_id.as_i64() + 1), &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
        assert!(get_category(category.id, user_id, &connection).is_ok());
    }
}
