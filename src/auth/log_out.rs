//! Log-out route handler that invalidates the auth cookie and redirects users.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    auth::{
        SessionChange, SessionChangeKind, SessionEvents, get_token_from_cookies,
        invalidate_auth_cookie,
    },
    endpoints,
};

/// The state needed to log out.
#[derive(Debug, Clone)]
pub struct LogOutState {
    pub cookie_key: Key,
    pub session_events: SessionEvents,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_events: state.session_events.clone(),
        }
    }
}

impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(State(state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    let user_id = get_token_from_cookies(&jar).ok().map(|token| token.user_id);
    let jar = invalidate_auth_cookie(jar);

    state.session_events.publish(SessionChange {
        kind: SessionChangeKind::SignedOut,
        user_id,
    });

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{
            DEFAULT_COOKIE_DURATION, SessionChange, SessionChangeKind, SessionEvents, UserID,
            cookie::COOKIE_TOKEN, set_auth_cookie,
        },
        endpoints,
    };

    use super::{LogOutState, get_log_out};

    fn get_state() -> LogOutState {
        LogOutState {
            cookie_key: create_cookie_key("42"),
            session_events: SessionEvents::default(),
        }
    }

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie_and_redirects() {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let jar = set_auth_cookie(jar, UserID::new(123), DEFAULT_COOKIE_DURATION).unwrap();

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
    }

    #[tokio::test]
    async fn log_out_publishes_signed_out_event() {
        let state = get_state();
        let mut subscription = state.session_events.subscribe();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let jar = set_auth_cookie(jar, UserID::new(123), DEFAULT_COOKIE_DURATION).unwrap();

        get_log_out(State(state), jar).await;

        assert_eq!(
            subscription.try_recv(),
            Some(SessionChange::new(
                SessionChangeKind::SignedOut,
                UserID::new(123)
            ))
        );
    }

    #[tokio::test]
    async fn log_out_without_session_reports_no_user() {
        let state = get_state();
        let mut subscription = state.session_events.subscribe();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        get_log_out(State(state), jar).await;

        assert_eq!(
            subscription.try_recv(),
            Some(SessionChange {
                kind: SessionChangeKind::SignedOut,
                user_id: None
            })
        );
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_cookie_expired(response: &Response<Body>) {
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("token cookie not set");

        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
