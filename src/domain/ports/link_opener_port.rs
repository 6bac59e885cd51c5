/// Port for handing a link to the desktop for manual viewing.
#[cfg_attr(test, mockall::automock)]
pub trait LinkOpenerPort: Send + Sync {
    /// Opens `url`. Failures are logged by the implementation, never raised.
    fn open(&self, url: &str);
}
