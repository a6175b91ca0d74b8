pub mod config;
pub mod discover;
pub mod login;
pub mod saved;

pub use config::config_page;
pub use discover::discover_page;
pub use login::login_page;
pub use saved::saved_page;
