//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::ExpenseFilters,
    auth::{UserID, current_page_url},
    category::CategoryId,
    endpoints,
    expense::ExpenseLedger,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a category together with its expenses.
///
/// The client is sent back to the page it came from. If that page filtered by
/// the deleted category, the filter is dropped from the URL.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    headers: HeaderMap,
) -> Response {
    let current_page =
        current_page_url(&headers).unwrap_or_else(|| endpoints::CATEGORIES_VIEW.to_owned());
    let (route, filters) = match current_page.split_once('?') {
        Some((route, _)) => (route, ExpenseFilters::from_url(&current_page)),
        None => (current_page.as_str(), ExpenseFilters::default()),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut ledger = match ExpenseLedger::load(user_id, filters, &connection) {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("Could not load expenses for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    match ledger.delete_category(category_id, &connection) {
        Ok(category) => {
            tracing::debug!("Deleted category \"{}\" for user {user_id}", category.name);

            (
                HxRedirect(ledger.filters().to_url(route, None)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::DeleteMissingCategory) => Error::DeleteMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
