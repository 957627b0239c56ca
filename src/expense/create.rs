//! The page and endpoint for recording a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{ExpenseFilters, format_date},
    auth::UserID,
    category::{CategoryRegistry, get_categories},
    endpoints,
    expense::{
        Expense, ExpenseLedger,
        form::{ExpenseFormData, ExpenseFormValues, expense_form_fields},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, hryvnia_input_styles, loading_spinner},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the new expense page and endpoint.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the page for recording an expense. The date defaults to today in
/// the server's timezone.
pub async fn get_new_expense_page(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        CategoryRegistry::new(get_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new expense page: {error}")
        })?)
    };

    let today = format_date(local_today(&state.local_timezone)?);
    let form_data = ExpenseFormData {
        date: today,
        ..Default::default()
    };

    let form = new_expense_form_view(&ExpenseFormValues::from_form(&form_data), &categories, None);
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("Нова витрата", &[hryvnia_input_styles()], &content).into_response())
}

fn new_expense_form_view(
    values: &ExpenseFormValues<'_>,
    categories: &CategoryRegistry,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::EXPENSES_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Нова витрата" }

            (expense_form_fields(values, categories, error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                " Додати витрату"
            }
        }
    }
}

/// Store a new expense and redirect to the expense list.
///
/// A custom category is added to the registry first. Validation errors are
/// shown in the form and nothing is stored.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseFormData>,
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
            tracing::error!("Could not load expenses for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(error) => {
            return new_expense_form_view(
                &ExpenseFormValues::from_form(&form),
                ledger.categories(),
                Some(&error.to_string()),
            )
            .into_response();
        }
    };

    let category = match ledger.resolve_category(validated.category, &connection) {
        Ok(category) => category,
        Err(
            error @ (Error::EmptyCategoryName
            | Error::InvalidCategoryName(_)
            | Error::DuplicateCategoryName(_)
            | Error::UnknownCategory(_)),
        ) => {
            return new_expense_form_view(
                &ExpenseFormValues::from_form(&form),
                ledger.categories(),
                Some(&error.to_string()),
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not resolve category for a new expense: {error}");
            return error.into_alert_response();
        }
    };

    let builder = Expense::build(validated.amount, category, validated.date)
        .comment(validated.comment);

    if let Err(error) = ledger.add_expense(builder, &connection) {
        tracing::error!("could not create expense: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
