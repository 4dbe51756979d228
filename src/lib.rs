// Image Drop - upload images to S3 and hand out links to them

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> anyhow::Result<axum::Router> {
    routes::create_router(state)
}
