pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
mod utils;

use tracing_subscriber::EnvFilter;

pub use config::StoreConfig;
pub use error::{AppError, AppResult};
pub use models::{
    Blacklist, Clip, ClipContent, ClipFilter, ContentType, Favorite, FavoriteContent,
    FavoriteItem, ImageFormat, LastSnapshot, MatchCounts, Summary, TextFormat,
};
pub use services::clip_store::ClipStore;
pub use services::notifier::{Notifier, RefreshCallback, RefreshEvent, SubscriptionId};

/// Installs the compact fmt subscriber. `RUST_LOG` overrides the `info`
/// default; a second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
