pub mod architect_handlers;
pub mod ba_handlers;
pub mod main_handlers;
pub mod requirement_handlers;

pub use main_handlers::AppState;
