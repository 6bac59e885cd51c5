//! Hands unmatched links to the desktop.

use tracing::{info, warn};

use crate::domain::ports::LinkOpenerPort;

/// Opens links in the system browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLinkOpener;

impl LinkOpenerPort for SystemLinkOpener {
    fn open(&self, url: &str) {
        info!(url, "Opening link for manual review");
        if let Err(e) = opener::open_browser(url) {
            warn!(url, error = %e, "Failed to open link");
        }
    }
}

/// Logs links instead of opening them, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLinkOpener;

impl LinkOpenerPort for DisabledLinkOpener {
    fn open(&self, url: &str) {
        info!(url, "Link needs manual review");
    }
}
