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
    endpoints,
    expense::{ExpenseId, ExpenseLedger},
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete an expense and reload the page the request came from.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseEndpointState>,
    Extension(user_id): Extension<UserID>,
    headers: HeaderMap,
) -> Response {
    let redirect_url =
        current_page_url(&headers).unwrap_or_else(|| endpoints::EXPENSES_VIEW.to_owned());

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
            tracing::error!("Could not load expenses for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    match ledger.delete_expense(expense_id, &connection) {
        Ok(()) => (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response(),
        Err(Error::DeleteMissingExpense) => Error::DeleteMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::{HeaderMap, HeaderValue, StatusCode},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        CategoryName, Email, Error,
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        endpoints,
        expense::{Expense, ExpenseId, create_expense, get_expense},
        test_utils::assert_hx_redirect,
    };

    use super::{DeleteExpenseEndpointState, delete_expense_endpoint};

    fn get_state() -> (DeleteExpenseEndpointState, UserID, ExpenseId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            &Email::new_unchecked("olena@example.ua"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let expense = create_expense(
            Expense::build(42.0, CategoryName::new_unchecked("Їжа"), date!(2025 - 10 - 01)),
            user.id,
            &connection,
        )
        .unwrap();

        (
            DeleteExpenseEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
            expense.id,
        )
    }

    #[tokio::test]
    async fn delete_redirects_to_current_page() {
        let (state, user_id, expense_id) = get_state();
        let mut headers = HeaderMap::new();
        headers.insert(
            "hx-current-url",
            HeaderValue::from_static("https://localhost:3000/expenses?page=2"),
        );

        let response = delete_expense_endpoint(
            Path(expense_id),
            State(state.clone()),
            Extension(user_id),
            headers,
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/expenses?page=2");
        assert_eq!(
            get_expense(expense_id, user_id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_without_current_page_redirects_to_expenses() {
        let (state, user_id, expense_id) = get_state();

        let response =
            delete_expense_endpoint(Path(expense_id), State(state), Extension(user_id), HeaderMap::new())
                .await;

        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
    }

    #[tokio::test]
    async fn delete_of_other_users_expense_is_not_found() {
        let (state, user_id, expense_id) = get_state();

        let response = delete_expense_endpoint(
            Path(expense_id),
            State(state.clone()),
            Extension(UserID::new(999)),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(get_expense(expense_id, user_id, &state.db_connection.lock().unwrap()).is_ok());
    }
}
