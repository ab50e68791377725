#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

//! Keybox
//!
//! A fixed set of boxes, each holding a title and some content behind its own password.

use std::net::SocketAddr;

use anyhow::Result;
use anyhow::bail;
use axum::Extension;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::router;
use crate::boxes::BoxCount;
use crate::boxes::DEFAULT_BOX_COUNT;
use crate::boxes::ensure_initial_boxes;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;
use crate::utils::env_var_or_else;
use crate::utils::env_var_parsed_or;

pub use crate::storage::Config as StorageConfig;

pub mod api;
pub mod boxes;
pub mod cipher;
pub mod client;
mod password;
pub mod storage;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Invalid `BOX_COUNT`
/// - Database connection or migrations
/// - Initial boxes setup
pub async fn setup_app(config: StorageConfig) -> Result<Router> {
    let box_count = setup_box_count()?;

    match config {
        StorageConfig::DetectConfig => {
            let database_url = env_var_or_else("DATABASE_URL", String::new);

            if database_url.is_empty() {
                tracing::info!("`DATABASE_URL` is not set, keeping boxes in memory");

                setup_storage(Memory::new(), box_count).await
            } else {
                setup_storage(Postgres::new(&database_url).await?, box_count).await
            }
        }
        StorageConfig::ExistingConnection(pool) => {
            setup_storage(Postgres::new_with_pool(pool).await?, box_count).await
        }
        StorageConfig::InMemory => setup_storage(Memory::new(), box_count).await,
    }
}

/// Make sure the initial boxes exist before serving anything
async fn setup_storage<S: Storage>(storage: S, box_count: BoxCount) -> Result<Router> {
    ensure_initial_boxes(&storage, box_count.0).await?;

    Ok(create_router(storage, box_count))
}

/// Create the router for the keybox
fn create_router<S: Storage>(storage: S, box_count: BoxCount) -> Router {
    Router::new()
        .nest("/api", router::<S>())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(box_count))
}

fn setup_box_count() -> Result<BoxCount> {
    let box_count = env_var_parsed_or("BOX_COUNT", DEFAULT_BOX_COUNT)?;

    if box_count < 1 {
        bail!("`BOX_COUNT` should be at least 1, got {box_count}");
    }

    Ok(BoxCount(box_count))
}

/// Address to listen on
///
/// Uses `ADDRESS`, with an optional override of just the port via `PORT`
///
/// # Errors
///
/// Will return `Err` when either can not be parsed
pub fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    let port = env_var_or_else("PORT", String::new);
    if !port.is_empty() {
        address.set_port(port.parse::<u16>()?);
    }

    Ok(address)
}
