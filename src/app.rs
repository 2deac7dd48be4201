use axum::{
    Router,
    http::Method,
    routing::{get, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, TraceLayer},
};
use tracing::Level;

use crate::{
    handlers::{
        create_product, delete_product, healthcheck, list_items, list_products,
        method_not_allowed, route_not_found, update_product,
    },
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(healthcheck).fallback(method_not_allowed))
        .route("/items", get(list_items).fallback(method_not_allowed))
        .route(
            "/products",
            get(list_products)
                .post(create_product)
                .fallback(method_not_allowed),
        )
        .route(
            "/products/:id",
            put(update_product)
                .delete(delete_product)
                .fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ]),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO)),
        )
        .with_state(state)
}
