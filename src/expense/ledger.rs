//! A user's expenses, categories and active filters for the duration of a
//! request.
//!
//! Changes go to the database first. The ledger only applies the same change
//! to its own copy once the database call has succeeded, so on error the
//! ledger still reflects what is stored.

use rusqlite::Connection;

use crate::{
    Error,
    aggregation::{ExpenseFilters, filter_expenses, sort_for_display},
    auth::UserID,
    category::{
        Category, CategoryId, CategoryName, CategoryRegistry, create_category, delete_category,
        get_categories, rename_category,
    },
    expense::{
        Expense, ExpenseBuilder, ExpenseId, ExpenseOrder, create_expense, delete_expense,
        get_expenses, update_expense,
    },
};

/// How the category of a new or edited expense was chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryChoice {
    /// One of the categories in the registry, by exact name.
    Existing(String),
    /// A new category typed in by the user.
    Custom(String),
}

/// The state a handler works with: the user's expenses and categories, and
/// the filters from the current page.
#[derive(Debug, Clone)]
pub struct ExpenseLedger {
    user_id: UserID,
    expenses: Vec<Expense>,
    categories: CategoryRegistry,
    filters: ExpenseFilters,
}

impl ExpenseLedger {
    /// Load the expenses and categories of `user_id`.
    pub fn load(
        user_id: UserID,
        filters: ExpenseFilters,
        connection: &Connection,
    ) -> Result<Self, Error> {
        let expenses = get_expenses(user_id, ExpenseOrder::CreatedAt, connection)?;
        let categories = CategoryRegistry::new(get_categories(user_id, connection)?);

        Ok(Self {
            user_id,
            expenses,
            categories,
            filters,
        })
    }

    /// All of the user's expenses, most recently recorded first.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn filters(&self) -> &ExpenseFilters {
        &self.filters
    }

    /// The expenses that pass the active filters, in display order.
    pub fn visible_expenses(&self) -> Vec<&Expense> {
        let mut visible = filter_expenses(&self.expenses, &self.filters);
        sort_for_display(&mut visible);

        visible
    }

    /// Run `remote` against the database and, only if it succeeds, pass its
    /// result to `apply` to update the ledger.
    fn commit<T, R>(
        &mut self,
        connection: &Connection,
        remote: impl FnOnce(&Connection) -> Result<T, Error>,
        apply: impl FnOnce(&mut Self, T) -> R,
    ) -> Result<R, Error> {
        let value = remote(connection)?;

        Ok(apply(self, value))
    }

    /// Resolve `choice` to a category name, creating the category first if it
    /// is a custom one.
    ///
    /// # Errors
    ///
    /// Returns an [Error::UnknownCategory] if an existing category was chosen
    /// that is not in the registry, or the validation errors of
    /// [CategoryRegistry::validate_new_name] for a custom category.
    pub fn resolve_category(
        &mut self,
        choice: CategoryChoice,
        connection: &Connection,
    ) -> Result<CategoryName, Error> {
        match choice {
            CategoryChoice::Existing(name) => {
                if self.categories.contains(&name) {
                    Ok(CategoryName::new_unchecked(&name))
                } else {
                    Err(Error::UnknownCategory(name))
                }
            }
            CategoryChoice::Custom(raw_name) => self
                .add_category(&raw_name, connection)
                .map(|category| category.name),
        }
    }

    /// Store a new expense.
    pub fn add_expense(
        &mut self,
        builder: ExpenseBuilder,
        connection: &Connection,
    ) -> Result<&Expense, Error> {
        let user_id = self.user_id;

        self.commit(
            connection,
            |connection| create_expense(builder, user_id, connection),
            |ledger, expense| ledger.expenses.insert(0, expense),
        )?;

        Ok(&self.expenses[0])
    }

    /// Replace the details of an existing expense.
    pub fn update_expense(
        &mut self,
        id: ExpenseId,
        builder: ExpenseBuilder,
        connection: &Connection,
    ) -> Result<&Expense, Error> {
        let user_id = self.user_id;

        let position = self.commit(
            connection,
            |connection| update_expense(id, builder, user_id, connection),
            |ledger, updated| match ledger.expenses.iter().position(|e| e.id == updated.id) {
                Some(position) => {
                    ledger.expenses[position] = updated;
                    position
                }
                None => {
                    ledger.expenses.push(updated);
                    ledger.expenses.len() - 1
                }
            },
        )?;

        Ok(&self.expenses[position])
    }

    /// Delete an expense.
    pub fn delete_expense(&mut self, id: ExpenseId, connection: &Connection) -> Result<(), Error> {
        let user_id = self.user_id;

        self.commit(
            connection,
            |connection| delete_expense(id, user_id, connection),
            |ledger, ()| ledger.expenses.retain(|expense| expense.id != id),
        )
    }

    /// Validate `raw_name` and store it as a new category.
    pub fn add_category(
        &mut self,
        raw_name: &str,
        connection: &Connection,
    ) -> Result<Category, Error> {
        let name = self.categories.validate_new_name(raw_name)?;
        let user_id = self.user_id;

        self.commit(
            connection,
            |connection| create_category(name, user_id, connection),
            |ledger, category| {
                ledger.categories.insert(category.clone());
                category
            },
        )
    }

    /// Rename a category, moving its expenses and any filter on it to the new
    /// name.
    pub fn rename_category(
        &mut self,
        id: CategoryId,
        raw_name: &str,
        connection: &Connection,
    ) -> Result<CategoryName, Error> {
        let name = self.categories.validate_rename(id, raw_name)?;
        let user_id = self.user_id;

        self.commit(
            connection,
            |connection| rename_category(id, &name, user_id, connection).map(|()| name),
            |ledger, name| {
                if let Some(old_name) = ledger.categories.rename(id, name.clone()) {
                    for expense in &mut ledger.expenses {
                        if expense.category == old_name {
                            expense.category = name.clone();
                        }
                    }

                    ledger
                        .filters
                        .rename_category(old_name.as_ref(), name.as_ref());
                }

                name
            },
        )
    }

    /// Delete a category along with its expenses, and clear the category
    /// filter if it pointed at the deleted category.
    pub fn delete_category(
        &mut self,
        id: CategoryId,
        connection: &Connection,
    ) -> Result<Category, Error> {
        let user_id = self.user_id;

        self.commit(
            connection,
            |connection| delete_category(id, user_id, connection),
            |ledger, category| {
                ledger.categories.remove(id);
                ledger
                    .expenses
                    .retain(|expense| expense.category != category.name);
                ledger.filters.clear_category_if(category.name.as_ref());

                category
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Email, Error,
        aggregation::ExpenseFilters,
        auth::{PasswordHash, UserID, create_user},
        category::{CategoryName, seed_default_categories},
        db::initialize,
        expense::{Expense, ExpenseOrder, get_expenses},
    };

    use super::{CategoryChoice, ExpenseLedger};

    fn get_test_db_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            &Email::new_unchecked("olena@example.com"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        seed_default_categories(user.id, &connection).unwrap();

        (connection, user.id)
    }

    fn name(raw: &str) -> CategoryName {
        CategoryName::new_unchecked(raw)
    }

    #[test]
    fn add_expense_updates_database_and_ledger() {
        let (connection, user_id) = get_test_db_connection();
        let mut ledger = ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection)
            .unwrap();

        let expense = ledger
            .add_expense(
                Expense::build(120.0, name("Їжа"), date!(2025 - 10 - 05)),
                &connection,
            )
            .unwrap()
            .clone();

        assert_eq!(ledger.expenses(), &[expense.clone()]);
        assert_eq!(
            get_expenses(user_id, ExpenseOrder::CreatedAt, &connection).unwrap(),
            vec![expense]
        );
    }

    #[test]
    fn failed_delete_leaves_ledger_unchanged() {
        let (connection, user_id) = get_test_db_connection();
        let mut ledger = ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection)
            .unwrap();
        ledger
            .add_expense(
                Expense::build(120.0, name("Їжа"), date!(2025 - 10 - 05)),
                &connection,
            )
            .unwrap();
        let before = ledger.expenses().to_vec();

        let result = ledger.delete_expense(9999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingExpense));
        assert_eq!(ledger.expenses(), before.as_slice());
    }

    #[test]
    fn delete_expense_removes_it_from_the_ledger() {
        let (connection, user_id) = get_test_db_connection();
        let mut ledger = ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection)
            .unwrap();
        let id = ledger
            .add_expense(
                Expense::build(120.0, name("Їжа"), date!(2025 - 10 - 05)),
                &connection,
            )
            .unwrap()
            .id;

        ledger.delete_expense(id, &connection).unwrap();

        assert!(ledger.expenses().is_empty());
    }

    #[test]
    fn duplicate_custom_category_is_rejected_without_changes() {
        let (connection, user_id) = get_test_db_connection();
        let mut ledger = ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection)
            .unwrap();
        let before = ledger.categories().clone();

        let result = ledger.resolve_category(CategoryChoice::Custom("їжа".to_owned()), &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName("Їжа".to_owned())));
        assert_eq!(ledger.categories(), &before);
    }

    #[test]
    fn custom_category_is_added_to_registry() {
        let (connection, user_id) = get_test_db_connection();
        let mut ledger = ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection)
            .unwrap();

        let resolved = ledger
            .resolve_category(CategoryChoice::Custom("кава".to_owned()), &connection)
            .unwrap();

        assert_eq!(resolved, name("Кава"));
        assert!(ledger.categories().contains("Кава"));
        let reloaded =
            ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection).unwrap();
        assert!(reloaded.categories().contains("Кава"));
    }

    #[test]
    fn unknown_existing_category_is_rejected() {
        let (connection, user_id) = get_test_db_connection();
        let mut ledger = ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection)
            .unwrap();

        let result =
            ledger.resolve_category(CategoryChoice::Existing("Кава".to_owned()), &connection);

        assert_eq!(result, Err(Error::UnknownCategory("Кава".to_owned())));
    }

    #[test]
    fn deleting_category_removes_expenses_and_clears_filter() {
        let (connection, user_id) = get_test_db_connection();
        let filters = ExpenseFilters {
            category: Some("Розваги".to_owned()),
            ..Default::default()
        };
        let mut ledger = ExpenseLedger::load(user_id, filters, &connection).unwrap();
        for (amount, category) in [(300.0, "Розваги"), (120.0, "Їжа"), (80.0, "Розваги")] {
            ledger
                .add_expense(
                    Expense::build(amount, name(category), date!(2025 - 10 - 05)),
                    &connection,
                )
                .unwrap();
        }
        assert_eq!(ledger.visible_expenses().len(), 2);
        let fun_id = ledger.categories().find_by_name("Розваги").unwrap().id;

        let deleted = ledger.delete_category(fun_id, &connection).unwrap();

        assert_eq!(deleted.name, name("Розваги"));
        assert_eq!(ledger.filters(), &ExpenseFilters::default());
        assert_eq!(ledger.expenses().len(), 1);
        assert_eq!(ledger.visible_expenses().len(), 1);
        assert!(!ledger.categories().contains("Розваги"));
        let stored = get_expenses(user_id, ExpenseOrder::CreatedAt, &connection).unwrap();
        assert!(stored.iter().all(|expense| expense.category != name("Розваги")));
    }

    #[test]
    fn renaming_category_moves_expenses_and_filter() {
        let (connection, user_id) = get_test_db_connection();
        let filters = ExpenseFilters {
            category: Some("Їжа".to_owned()),
            ..Default::default()
        };
        let mut ledger = ExpenseLedger::load(user_id, filters, &connection).unwrap();
        ledger
            .add_expense(
                Expense::build(120.0, name("Їжа"), date!(2025 - 10 - 05)),
                &connection,
            )
            .unwrap();
        let food_id = ledger.categories().find_by_name("Їжа").unwrap().id;

        let new_name = ledger
            .rename_category(food_id, "продукти", &connection)
            .unwrap();

        assert_eq!(new_name, name("Продукти"));
        assert_eq!(ledger.expenses()[0].category, name("Продукти"));
        assert_eq!(ledger.filters().category.as_deref(), Some("Продукти"));
        assert_eq!(ledger.visible_expenses().len(), 1);
    }
}
