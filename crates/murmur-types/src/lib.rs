pub mod api;
pub mod genai;
pub mod models;
pub mod moderation;
pub mod validation;
