use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute URL into the canonical form used as a crawl key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host lowercasing and default-port removal come from the `url` crate's
/// own serialization.
///
/// # Examples
///
/// ```
/// use larder::url::canonicalize;
///
/// let url = canonicalize("HTTPS://Example.com:443/page#section").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn canonicalize(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}
