//! Default-browser adapter.

use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::BrowserOpener;

/// Opens URLs with the platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        debug!(url, "opening browser");
        webbrowser::open(url).map_err(|e| Error::BrowserOpen(e.to_string()))
    }
}
