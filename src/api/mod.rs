//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

use crate::storage::Storage;

pub use boxes::BoxResponse;
pub use boxes::UpdateBoxForm;
pub use boxes::VerifyBoxForm;
pub use boxes::VerifyResponse;
pub use request::Form;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Success;

mod boxes;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let boxes = Router::new()
        .route(
            "/",
            get(boxes::list::<S>)
                .put(boxes::update::<S>)
                .delete(boxes::reset::<S>),
        )
        .route("/verify", post(boxes::verify_password::<S>));

    Router::new().nest("/boxes", boxes)
}

/// Fallback for everything that is not a known route
pub async fn not_found() -> Error {
    Error::not_found("Route not found")
}
