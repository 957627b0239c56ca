//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::ExpenseFilters,
    auth::UserID,
    category::{CategoryFormData, list::new_category_form_view},
    endpoints,
    expense::ExpenseLedger,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Validate the submitted name and add it to the user's categories.
///
/// Invalid or duplicate names are reported inline and nothing is stored.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut ledger = match ExpenseLedger::load(user_id, ExpenseFilters::default(), &connection) {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("Could not load categories for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    match ledger.add_category(&form.name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyCategoryName
            | Error::InvalidCategoryName(_)
            | Error::DuplicateCategoryName(_)),
        ) => new_category_form_view(&form.name, Some(&error.to_string())).into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_alert_response()
        }
    }
}
