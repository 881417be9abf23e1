//! Dashboard pages: vehicle list with creation dialog, and vehicle detail.

use super::current_user;
use crate::{
    api::{SharedIdentity, SharedStore},
    identity::User,
    session::{cookie::clear_session_cookie, guard::LOGIN_PATH, SessionConfig},
    vehicles::NewVehicleForm,
    views::{
        html::{detail_page, list_page},
        CreateOutcome, VehicleDetailView, VehicleListView, ViewState,
    },
};
use axum::{
    extract::{Extension, Form, Path, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Any value opens the "Add vehicle" dialog.
    new: Option<String>,
}

/// The cookie did not resolve to a user: drop it and start over at the login
/// page, otherwise the guard would bounce `/login` back to the dashboard.
fn sign_in_again(session: &SessionConfig) -> Response {
    debug!("session credential did not resolve to a user");
    let mut headers = HeaderMap::new();
    match clear_session_cookie(session) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(e) => warn!("Failed to build clearing cookie: {e}"),
    }
    (headers, Redirect::to(LOGIN_PATH)).into_response()
}

fn render_list(status: StatusCode, view: &VehicleListView, user: &User) -> Response {
    (status, Html(list_page(view, Some(user.email())))).into_response()
}

pub async fn list(
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
    session: Extension<SessionConfig>,
) -> Response {
    let Some(user) = current_user(&headers, &identity).await else {
        return sign_in_again(&session);
    };

    let mut view = VehicleListView::new();
    view.load(store.0.as_ref(), Some(&user)).await;
    view.dialog_open = query.new.is_some();

    let status = if view.state == ViewState::Error {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    render_list(status, &view, &user)
}

pub async fn create(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
    session: Extension<SessionConfig>,
    Form(form): Form<NewVehicleForm>,
) -> Response {
    let Some(user) = current_user(&headers, &identity).await else {
        return sign_in_again(&session);
    };

    let mut view = VehicleListView::new();
    view.load(store.0.as_ref(), Some(&user)).await;

    let status = match view.create(store.0.as_ref(), Some(&user), form).await {
        CreateOutcome::Created => StatusCode::OK,
        CreateOutcome::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        CreateOutcome::Failed => StatusCode::BAD_GATEWAY,
        CreateOutcome::SignedOut => return sign_in_again(&session),
    };
    render_list(status, &view, &user)
}

pub async fn detail(
    headers: HeaderMap,
    Path(plate): Path<String>,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
    session: Extension<SessionConfig>,
) -> Response {
    let Some(user) = current_user(&headers, &identity).await else {
        return sign_in_again(&session);
    };

    let mut view = VehicleDetailView::new();
    view.load(store.0.as_ref(), Some(&user), &plate).await;

    let status = match view.state {
        ViewState::Ready => StatusCode::OK,
        ViewState::NotFound => StatusCode::NOT_FOUND,
        _ if view.plate_missing() => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Html(detail_page(&view, Some(user.email())))).into_response()
}
