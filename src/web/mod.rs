pub mod admin;
pub mod admin_utils;
pub mod auth;
pub mod files;
pub mod landing;
pub mod router;
pub mod state;
pub mod templates;

pub use state::AppState;
pub use templates::render_login_page;
