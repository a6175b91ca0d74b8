pub mod errors;
pub mod html;

pub use errors::{error_response, ResultResp};

// Normal HTML response
pub use html::{asset_response, html_response, redirect, redirect_with_cookie};
