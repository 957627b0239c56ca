//! Expenses: the record itself, storage, the in-request ledger and the pages
//! for recording, listing, editing and deleting expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod ledger;
mod list;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{
    create_expense, create_expense_table, delete_expense, get_expense, get_expenses,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{Expense, ExpenseBuilder, ExpenseId, ExpenseOrder, parse_amount};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use ledger::{CategoryChoice, ExpenseLedger};
pub use list::get_expenses_page;
pub(crate) use list::filters_form_view;
