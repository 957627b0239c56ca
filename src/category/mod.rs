//! Expense categories: validation, storage and the pages for managing them.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod registry;

pub use create::create_category_endpoint;
pub use db::{
    count_expenses_per_category, create_category, create_category_table, delete_category,
    get_categories, get_category, rename_category, seed_default_categories,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryFormData, CategoryId, CategoryName, DEFAULT_CATEGORIES};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;
pub use registry::CategoryRegistry;
