//! The page and endpoint for changing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
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
        Expense, ExpenseId, ExpenseLedger, get_expense,
        form::{ExpenseFormData, ExpenseFormValues, expense_form_fields},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, hryvnia_input_styles, loading_spinner},
    navigation::NavBar,
    not_found::get_404_not_found_response,
};

/// The state needed for the edit expense page and endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit form prefilled with the expense's current values.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = match get_expense(expense_id, user_id, &connection) {
        Ok(expense) => expense,
        Err(Error::NotFound) => return Ok(get_404_not_found_response()),
        Err(error) => {
            tracing::error!("Could not get expense {expense_id} for user {user_id}: {error}");
            return Err(error);
        }
    };
    let categories = get_categories(user_id, &connection)
        .map(CategoryRegistry::new)
        .inspect_err(|error| {
            tracing::error!("Could not get categories for user {user_id}: {error}")
        })?;

    let form_data = form_data_from_expense(&expense);
    let update_endpoint = endpoints::format_endpoint(endpoints::EXPENSE, expense_id);
    let form = edit_expense_form_view(
        &update_endpoint,
        &ExpenseFormValues::from_form(&form_data),
        &categories,
        None,
    );

    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("Редагування витрати", &[hryvnia_input_styles()], &content).into_response())
}

fn form_data_from_expense(expense: &Expense) -> ExpenseFormData {
    ExpenseFormData {
        amount: format!("{:.2}", expense.amount),
        category: expense.category.to_string(),
        custom_category: String::new(),
        date: format_date(expense.date),
        comment: expense.comment.clone().unwrap_or_default(),
    }
}

fn edit_expense_form_view(
    update_endpoint: &str,
    values: &ExpenseFormValues<'_>,
    categories: &CategoryRegistry,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Редагування витрати" }

            (expense_form_fields(values, categories, error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                " Зберегти"
            }
        }
    }
}

/// Replace the amount, category, date and comment of an expense. The time it
/// was recorded does not change.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
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

    let update_endpoint = endpoints::format_endpoint(endpoints::EXPENSE, expense_id);
    let show_error = |ledger: &ExpenseLedger, error: Error| {
        edit_expense_form_view(
            &update_endpoint,
            &ExpenseFormValues::from_form(&form),
            ledger.categories(),
            Some(&error.to_string()),
        )
        .into_response()
    };

    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(error) => return show_error(&ledger, error),
    };

    if ledger.expenses().iter().all(|expense| expense.id != expense_id) {
        return Error::UpdateMissingExpense.into_alert_response();
    }

    let category = match ledger.resolve_category(validated.category, &connection) {
        Ok(category) => category,
        Err(
            error @ (Error::EmptyCategoryName
            | Error::InvalidCategoryName(_)
            | Error::DuplicateCategoryName(_)
            | Error::UnknownCategory(_)),
        ) => return show_error(&ledger, error),
        Err(error) => {
            tracing::error!("Could not resolve category for expense {expense_id}: {error}");
            return error.into_alert_response();
        }
    };

    let builder = Expense::build(validated.amount, category, validated.date)
        .comment(validated.comment);

    match ledger.update_expense(expense_id, builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
