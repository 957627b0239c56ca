//! Category rename page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::ExpenseFilters,
    auth::UserID,
    category::{CategoryFormData, CategoryId, get_category},
    endpoints,
    expense::ExpenseLedger,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, link,
    },
    navigation::NavBar,
};

/// The state needed for the rename page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the rename form for one of the user's categories.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);

    match get_category(category_id, user_id, &connection) {
        Ok(category) => {
            Ok(edit_category_view(&update_endpoint, category.name.as_ref(), None).into_response())
        }
        Err(Error::NotFound) => Ok(edit_category_view(
            &update_endpoint,
            "",
            Some("Категорію не знайдено"),
        )
        .into_response()),
        Err(error) => {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
            Err(error)
        }
    }
}

/// Rename a category. The user's expenses in the category and any filter on
/// it follow the new name.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
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

    if ledger.categories().get(category_id).is_none() {
        return Error::UpdateMissingCategory.into_alert_response();
    }

    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);

    match ledger.rename_category(category_id, &form.name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyCategoryName
            | Error::InvalidCategoryName(_)
            | Error::DuplicateCategoryName(_)),
        ) => edit_category_form_view(&update_endpoint, &form.name, Some(&error.to_string()))
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while renaming category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(
    update_endpoint: &str,
    category_name: &str,
    error_message: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let form = edit_category_form_view(update_endpoint, category_name, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Перейменувати категорію" }
            (form)
            p class="mt-4 text-sm" { (link(endpoints::CATEGORIES_VIEW, "Назад до категорій")) }
        }
    };

    base("Перейменувати категорію", &[], &content)
}

fn edit_category_form_view(
    update_endpoint: &str,
    category_name: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Назва" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(category_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Зберегти" }
        }
    }
}
