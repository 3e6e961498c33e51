//! Browser port (interface).

use crate::error::Result;

/// Port for opening a URL in the user's default browser.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}
