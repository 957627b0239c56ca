//! The page shown for unknown routes and missing records.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Не знайдено",
        "404",
        "Сторінку не знайдено.",
        "Можливо, її видалено або адреса містить помилку.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
