//! Endpoint announcement.

use tracing::debug;

use crate::ports::{BrowserOpener, StatusReporter};

/// Tell the user where the dashboard is and try to open it.
///
/// A browser failure is reported and the URL repeated; it never ends the
/// session. Returns whether the browser was opened.
pub fn announce_endpoint<B, R>(browser: &B, reporter: &R, namespace: &str, url: &str) -> bool
where
    B: BrowserOpener,
    R: StatusReporter,
{
    reporter.info(&format!("Dapr dashboard found in namespace:\t{}", namespace));
    reporter.info(&format!("Dapr dashboard available at:\t{}\n", url));

    match browser.open(url) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, url, "browser launch failed");
            reporter.failure("Failed to start Dapr dashboard in browser automatically");
            reporter.failure(&format!("Visit {} in your browser to view the dashboard", url));
            false
        }
    }
}
