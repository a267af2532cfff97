use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    add_comment, delete_comment, get_comment, list_user_comments, page_comments, update_comment,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/add", post(add_comment))
        .route("/update", post(update_comment))
        .route("/user", get(list_user_comments))
        .route("/page", post(page_comments))
        .route("/{id}", get(get_comment).delete(delete_comment))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
