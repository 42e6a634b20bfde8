pub mod ai;
pub mod auth;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod mailer;
pub mod messages;
pub mod router;
pub mod session;
pub mod settings;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::{AppState, AppStateInner};
