//! The expense list page: filters, a page of expenses and page navigation.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    aggregation::{ExpenseFilters, format_date, ukrainian_plural},
    auth::UserID,
    category::CategoryRegistry,
    endpoints,
    expense::{Expense, ExpenseLedger},
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, currency_rounded_with_tooltip, edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, page_bounds, page_count, pagination_view},
};

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[day].[month].[year]");

const DELETE_CONFIRM_MESSAGE: &str = "Ви впевнені, що хочете видалити цю витрату?";

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string of the expenses page.
///
/// Everything is kept as text so that a malformed value falls back to its
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    pub category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<String>,
}

struct ExpenseRow<'a> {
    expense: &'a Expense,
    edit_url: String,
    delete_url: String,
}

/// Render the user's expenses that pass the filters in the query string,
/// newest first, one page at a time.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let filters = ExpenseFilters::from_raw(
        query.category.as_deref(),
        query.date_from.as_deref(),
        query.date_to.as_deref(),
    );

    let ledger = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        ExpenseLedger::load(user_id, filters, &connection).inspect_err(|error| {
            tracing::error!("Could not load expenses for user {user_id}: {error}")
        })?
    };

    let requested_page = query
        .page
        .as_deref()
        .and_then(|page| page.trim().parse::<u64>().ok())
        .unwrap_or(state.pagination_config.default_page);
    let page_size = state.pagination_config.default_page_size;

    let visible = ledger.visible_expenses();
    let (page, range) = page_bounds(requested_page, page_size, visible.len());
    let pages = page_count(visible.len(), page_size);

    let rows = visible[range]
        .iter()
        .map(|expense| ExpenseRow {
            expense,
            edit_url: endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
            delete_url: endpoints::format_endpoint(endpoints::EXPENSE, expense.id),
        })
        .collect::<Vec<_>>();

    let filters = ledger.filters();
    let pagination = (pages > 1).then(|| {
        pagination_view(page, pages, state.pagination_config.max_pages, |page| {
            filters.to_url(endpoints::EXPENSES_VIEW, Some(page))
        })
    });

    Ok(expenses_view(
        &rows,
        visible.len(),
        ledger.expenses().len(),
        ledger.categories(),
        filters,
        pagination,
    )
    .into_response())
}

/// A GET form that reloads `action` with the chosen filters.
///
/// `hidden` holds other query parameters of the page that should survive
/// applying the filters, and "Очистити" links to `clear_url`.
pub(crate) fn filters_form_view(
    action: &str,
    clear_url: &str,
    hidden: &[(&str, &str)],
    categories: &CategoryRegistry,
    filters: &ExpenseFilters,
) -> Markup {
    let selected_category = filters.category.as_deref().unwrap_or_default();
    let date_from = filters.date_from.map(format_date).unwrap_or_default();
    let date_to = filters.date_to.map(format_date).unwrap_or_default();

    html! {
        form
            method="get"
            action=(action)
            class="grid gap-4 md:grid-cols-4 md:items-end"
        {
            @for (name, value) in hidden {
                input type="hidden" name=(name) value=(value);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Категорія" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "Всі категорії" }

                    @for category in categories.iter() {
                        option
                            value=(category.name)
                            selected[selected_category == category.name.as_ref()]
                        { (category.name) }
                    }
                }
            }

            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "Від дати" }
                input
                    name="date_from"
                    id="date_from"
                    type="date"
                    value=(date_from)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "До дати" }
                input
                    name="date_to"
                    id="date_to"
                    type="date"
                    value=(date_to)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Застосувати" }
                a href=(clear_url) class=(LINK_STYLE) { "Очистити" }
            }
        }
    }
}

fn dashboard_url(filters: &ExpenseFilters) -> String {
    filters.to_url(endpoints::DASHBOARD_VIEW, None)
}

fn expenses_view(
    rows: &[ExpenseRow],
    expense_count: usize,
    total_count: usize,
    categories: &CategoryRegistry,
    filters: &ExpenseFilters,
    pagination: Option<Markup>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let table_row = |row: &ExpenseRow| {
        let date = row
            .expense
            .date
            .format(DISPLAY_DATE_FORMAT)
            .unwrap_or_else(|_| format_date(row.expense.date));

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (date) }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (row.expense.category) }
                }

                td class={(TABLE_CELL_STYLE) " text-right"}
                {
                    (currency_rounded_with_tooltip(row.expense.amount))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some(comment) = &row.expense.comment {
                        (comment)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url,
                            &row.delete_url,
                            DELETE_CONFIRM_MESSAGE,
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
                div class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold"
                    {
                        "Останні витрати (" (expense_count) " " (ukrainian_plural(expense_count)) ")"
                    }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Додати витрату" }
                }

                (filters_form_view(
                    endpoints::EXPENSES_VIEW,
                    endpoints::EXPENSES_VIEW,
                    &[],
                    categories,
                    filters,
                ))

                @if !filters.is_empty() {
                    div class="flex justify-between flex-wrap gap-4 text-sm"
                    {
                        p id="filter-summary" class="text-gray-500 dark:text-gray-400"
                        {
                            "Показано "
                            span class="font-semibold text-gray-900 dark:text-white"
                            { (expense_count) }
                            " з "
                            span class="font-semibold text-gray-900 dark:text-white"
                            { (total_count) }
                            " витрат"
                        }

                        @if expense_count > 0 {
                            a href=(dashboard_url(filters)) class=(LINK_STYLE)
                            {
                                "Графік за цими фільтрами"
                            }
                        }
                    }
                }

                section class="dark:bg-gray-800 overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Дата" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Категорія" }
                                th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Сума" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Коментар" }
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
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        @if filters.is_empty() {
                                            "Витрат ще немає. "
                                            a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                                            { "Додайте першу витрату" }
                                            "."
                                        } @else {
                                            "Немає витрат, що відповідають фільтрам."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if let Some(pagination) = pagination {
                    (pagination)
                }
            }
        }
    );

    base("Витрати", &[], &content)
}
