use axum::{
    Router,
    routing::get,
};

use doctor_cell::router::doctor_routes;
use receptionist_cell::router::receptionist_routes;
use shared_database::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "HMS API is running!" }))
        .nest("/doctor", doctor_routes(state.clone()))
        .nest("/receptionist", receptionist_routes(state))
}
