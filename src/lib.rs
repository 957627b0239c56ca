//! Hryvnia is a web app for recording personal expenses and seeing where the
//! money goes.
//!
//! This library provides a REST API that directly serves HTML pages. Expenses
//! are stored per user in SQLite and summarised by category and by month.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    CategoryTotal, ExpenseFilters, MonthlyOverview, MonthlyTotal, category_totals,
    current_month_total, filter_expenses, format_currency, monthly_overview, monthly_totals,
    sort_for_display, ukrainian_plural,
};
pub use app_state::AppState;
pub use auth::{
    Email, PasswordHash, SessionChange, SessionChangeKind, SessionEvents, SessionSubscription,
    User, UserID, ValidatedPassword, create_user, get_user_by_email, update_password,
};
pub use category::{CategoryName, CategoryRegistry, DEFAULT_CATEGORIES, seed_default_categories};
pub use db::initialize as initialize_db;
pub use expense::{Expense, ExpenseBuilder, ExpenseId, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install SIGTERM handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Variants that are shown to the user next to a form field carry Ukrainian
/// messages since they are rendered verbatim in the UI.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("Пароль занадто слабкий: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is not in a valid format.
    #[error("Введіть коректну адресу електронної пошти")]
    InvalidEmail,

    /// A user with the email address already exists.
    #[error("Користувач з такою поштою вже існує")]
    DuplicateEmail,

    /// A category name was empty after trimming whitespace.
    #[error("Назва категорії не може бути порожньою")]
    EmptyCategoryName,

    /// A category name contained characters outside the Ukrainian alphabet,
    /// apostrophes, hyphens and spaces.
    #[error("Категорія \"{0}\" може містити лише українські літери, апостроф, дефіс і пробіл")]
    InvalidCategoryName(String),

    /// A category with the same normalised name already exists.
    #[error("Категорія \"{0}\" вже існує")]
    DuplicateCategoryName(String),

    /// An expense was submitted without choosing a category.
    #[error("Оберіть категорію")]
    MissingCategory,

    /// An expense referred to a category that is not in the user's registry.
    #[error("Невідома категорія \"{0}\"")]
    UnknownCategory(String),

    /// The expense amount was missing, not a number or negative.
    #[error("Введіть невід'ємну суму, наприклад 120 або 99.50")]
    InvalidAmount(String),

    /// The expense date was missing or not in the `YYYY-MM-DD` format.
    #[error("Вкажіть дату у форматі РРРР-ММ-ДД")]
    InvalidExpenseDate(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update an expense that does not exist or belongs to another user.
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist or belongs to another user.
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to rename a category that does not exist or belongs to another user.
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist or belongs to another user.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.name") =>
            {
                Error::DuplicateCategoryName(String::new())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Некоректний часовий пояс",
                fix: &format!(
                    "Не вдалося визначити часовий пояс \"{timezone}\". Перевірте налаштування \
                    сервера: потрібна канонічна назва, наприклад Europe/Kyiv."
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for htmx requests.
    fn into_alert_response(self) -> Response {
        let (status, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert {
                    message: "Некоректний часовий пояс".to_owned(),
                    details: format!(
                        "Не вдалося визначити часовий пояс \"{timezone}\". \
                        Перевірте налаштування сервера."
                    ),
                },
            ),
            Error::UpdateMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Не вдалося оновити витрату".to_owned(),
                    details: "Витрату не знайдено.".to_owned(),
                },
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Не вдалося видалити витрату".to_owned(),
                    details: "Витрату не знайдено. Оновіть сторінку, можливо її вже видалено."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Не вдалося перейменувати категорію".to_owned(),
                    details: "Категорію не знайдено.".to_owned(),
                },
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Не вдалося видалити категорію".to_owned(),
                    details: "Категорію не знайдено. Оновіть сторінку, можливо її вже видалено."
                        .to_owned(),
                },
            ),
            error @ (Error::EmptyCategoryName
            | Error::InvalidCategoryName(_)
            | Error::DuplicateCategoryName(_)
            | Error::MissingCategory
            | Error::UnknownCategory(_)
            | Error::InvalidAmount(_)
            | Error::InvalidExpenseDate(_)) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "Перевірте введені дані".to_owned(),
                    details: error.to_string(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert {
                        message: "Щось пішло не так".to_owned(),
                        details: "Сталася неочікувана помилка, подробиці в журналі сервера."
                            .to_owned(),
                    },
                )
            }
        };

        (status, alert).into_response()
    }
}
