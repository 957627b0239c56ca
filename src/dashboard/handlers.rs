//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    aggregation::{ExpenseFilters, category_totals, monthly_overview},
    auth::UserID,
    dashboard::{
        cards::{category_list_view, overview_cards_view},
        charts::{ChartKind, DashboardChart, category_chart, charts_script},
    },
    endpoints,
    expense::{ExpenseLedger, filters_form_view},
    html::{HeadElement, LINK_STYLE, base, link},
    navigation::NavBar,
    timezone::local_today,
};

const CATEGORY_CHART_ID: &str = "category-chart";

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// "pie" or "bar".
    pub chart: Option<String>,
    /// Only chart expenses in this category.
    pub category: Option<String>,
    /// Only chart expenses on or after this date.
    pub date_from: Option<String>,
    /// Only chart expenses on or before this date.
    pub date_to: Option<String>,
}

/// Display a page with an overview of the user's spending.
///
/// The overview cards always cover every expense. The category chart and
/// list only cover the expenses that pass the filters in the query string.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);
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

    let expenses = ledger.expenses();

    if expenses.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let today = local_today(&state.local_timezone)?;
    let overview = monthly_overview(expenses, today);
    let visible = ledger.visible_expenses();
    let totals = category_totals(visible.iter().copied());
    let chart_kind = ChartKind::from_query(query.chart.as_deref());
    let filters = ledger.filters();

    let charts = if totals.is_empty() {
        Vec::new()
    } else {
        vec![DashboardChart {
            id: CATEGORY_CHART_ID,
            options: category_chart(&totals, chart_kind).to_string(),
        }]
    };

    let content = html! {
        (overview_cards_view(&overview))

        section class="w-full mb-4 bg-white dark:bg-gray-800 p-4 rounded-lg shadow-md"
        {
            (filters_form_view(
                endpoints::DASHBOARD_VIEW,
                &chart_url(&ExpenseFilters::default(), chart_kind),
                &[("chart", chart_kind.as_query_value())],
                ledger.categories(),
                filters,
            ))
        }

        @if totals.is_empty() {
            p id="no-matching-expenses" class="w-full mb-8 text-center text-gray-500 dark:text-gray-400"
            {
                "Немає витрат, що відповідають фільтрам."
            }
        } @else {
            section class="w-full grid grid-cols-1 xl:grid-cols-3 gap-4 mb-8"
            {
                div class="xl:col-span-2 bg-white dark:bg-gray-800 p-4 rounded-lg shadow-md"
                {
                    (chart_toggle_view(chart_kind, filters))

                    div
                        id=(CATEGORY_CHART_ID)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }

                div class="bg-white dark:bg-gray-800 p-4 rounded-lg shadow-md"
                {
                    h3 class="text-xl font-semibold mb-2" { "За категоріями" }
                    (category_list_view(&totals))
                }
            }
        }
    };

    Ok(dashboard_view(nav_bar, &charts, &content).into_response())
}

/// The dashboard URL showing `kind` with `filters` applied.
fn chart_url(filters: &ExpenseFilters, kind: ChartKind) -> String {
    let url = filters.to_url(endpoints::DASHBOARD_VIEW, None);
    let separator = if url.contains('?') { '&' } else { '?' };

    format!("{url}{separator}chart={}", kind.as_query_value())
}

/// Links that reload the page with the other chart type.
fn chart_toggle_view(active: ChartKind, filters: &ExpenseFilters) -> Markup {
    html! {
        div id="chart-toggle" class="flex justify-end gap-4 mb-2 text-sm"
        {
            @for kind in [ChartKind::Pie, ChartKind::Bar] {
                @if kind == active {
                    span aria-current="true" class="font-semibold text-gray-900 dark:text-white"
                    {
                        (kind.label())
                    }
                } @else {
                    a
                        href=(chart_url(filters, kind))
                        class=(LINK_STYLE)
                    {
                        (kind.label())
                    }
                }
            }
        }
    }
}

/// Renders the dashboard page when the user has no expenses yet.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_expense_link = link(endpoints::NEW_EXPENSE_VIEW, "першу витрату");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Тут поки порожньо"
            }

            p
            {
                "Графіки з'являться, щойно ви додасте " (new_expense_link) "."
            }
        }
    );

    base("Огляд", &[], &content)
}

fn dashboard_view(nav_bar: NavBar, charts: &[DashboardChart], content: &Markup) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (content)
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Огляд", &scripts, &content)
}
