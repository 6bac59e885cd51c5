//! Maps image URLs to local file names.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::entities::MessageId;

/// Size suffix some CDNs append to the file name.
const LARGE_SUFFIX: &str = ":large";

/// Format given as a trailing `@ext` instead of a file extension.
pub(crate) static AT_EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(jpg|jpeg|gif|png)$").expect("valid regex"));

/// Derives a file name from the last path segment of `url`.
///
/// The query string and a trailing `:large` are dropped, and an `@ext`
/// format suffix becomes `.ext`.
#[must_use]
pub fn resolve_filename(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let segment = segment.strip_suffix(LARGE_SUFFIX).unwrap_or(segment);

    AT_EXTENSION_RE
        .replace(segment, ".$1")
        .into_owned()
}

/// Name an image is stored under: the message id keeps identically named
/// assets from different messages apart.
#[must_use]
pub fn stored_filename(message_id: MessageId, url: &str) -> String {
    format!("{message_id}_{}", resolve_filename(url))
}
