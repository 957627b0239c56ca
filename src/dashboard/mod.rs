//! Dashboard module
//!
//! Provides an overview page with monthly headline numbers and a breakdown of
//! spending by category.

mod cards;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
