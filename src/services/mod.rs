pub mod clip_store;
pub mod notifier;
pub mod retention;
