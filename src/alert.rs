//! Alert fragments for reporting failed htmx requests.
//!
//! Alerts are swapped into the `#alert-container` element rendered by
//! [crate::html::base].

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const ALERT_STYLE: &str = "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 shadow-lg";

/// An error message with details, e.g. how to fix the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// A short summary shown in bold.
    pub message: String,
    /// Extra details shown under the message, omitted when empty.
    pub details: String,
}

impl Alert {
    /// Render the alert as an out-of-band swap for `#alert-container`.
    pub fn into_html(self) -> Markup {
        let Alert { message, details } = self;

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(ALERT_STYLE) role="alert"
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        div
                        {
                            p class="font-semibold" { (message) }

                            @if !details.is_empty() {
                                p class="mt-1" { (details) }
                            }
                        }

                        button
                            type="button"
                            aria-label="Закрити"
                            class="font-bold"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                        {
                            "×"
                        }
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
