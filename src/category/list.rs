//! Categories page: the registry with expense counts and a form for adding
//! a category.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::ukrainian_plural,
    auth::UserID,
    category::{Category, CategoryRegistry, count_expenses_per_category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct CategoryRow<'a> {
    category: &'a Category,
    expense_count: u32,
    edit_url: String,
    delete_url: String,
}

impl CategoryRow<'_> {
    fn confirm_message(&self) -> String {
        format!(
            "Видалити категорію «{}»? Разом з нею буде видалено {} {}.",
            self.category.name,
            self.expense_count,
            ukrainian_plural(self.expense_count as usize)
        )
    }
}

/// Render the categories page in Ukrainian alphabetical order.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let registry = CategoryRegistry::new(
        get_categories(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?,
    );
    let counts = count_expenses_per_category(user_id, &connection).inspect_err(|error| {
        tracing::error!("Could not count expenses per category: {error}")
    })?;

    let rows = registry
        .iter()
        .map(|category| CategoryRow {
            category,
            expense_count: counts.get(category.name.as_ref()).copied().unwrap_or(0),
            edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
            delete_url: endpoints::format_endpoint(endpoints::CATEGORY, category.id),
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&rows).into_response())
}

/// The form for adding a category, with an optional validation error.
pub(super) fn new_category_form_view(name: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Нова категорія" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Наприклад, Подарунки"
                    value=(name)
                    required
                    autofocus[error_message.is_some()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Додати категорію" }
        }
    }
}

fn categories_view(rows: &[CategoryRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |row: &CategoryRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (row.category.name) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (row.expense_count) " " (ukrainian_plural(row.expense_count as usize))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            &row.confirm_message(),
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Категорії" }

                div class="max-w-md" { (new_category_form_view("", None)) }

                section class="dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Назва" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Витрати" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Дії" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "Категорій ще немає. Додайте першу за допомогою форми вище."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Категорії", &[], &content)
}
