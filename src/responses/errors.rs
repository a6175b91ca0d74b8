use crate::errors::ServerError;
use crate::templates::html_error_response;
use astra::Response;
use tracing::{error, warn};

pub type ResultResp = Result<Response, ServerError>;

/// Logs `err` and turns it into the HTML error page.
pub fn error_response(err: ServerError) -> Response {
    match err.status() {
        500.. => error!(error = %err, "request failed"),
        _ => warn!(error = %err, "request rejected"),
    }
    html_error_response(err)
}
