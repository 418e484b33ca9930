pub mod app;
pub mod client;
pub mod config;
pub mod cycle;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod regions;
pub mod report;
pub mod roster;
pub mod state;
pub mod ui;
pub mod visitor;

pub use app::router;
pub use config::Config;
pub use state::AppState;
