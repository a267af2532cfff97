use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    add_post, delete_post, get_post, list_user_posts, page_posts, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/add", post(add_post))
        .route("/update", post(update_post))
        .route("/user", get(list_user_posts))
        .route("/page", post(page_posts))
        .route("/{id}", get(get_post).delete(delete_post))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
