use url::Url;

/// Returns the origin of a URL: scheme, host and non-default port
///
/// Two URLs belong to the same site exactly when their origins are equal.
/// The origin is also the key under which robots.txt rules are cached.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use larder::url::site_origin;
///
/// let url = Url::parse("https://Example.com/path?q=1").unwrap();
/// assert_eq!(site_origin(&url), "https://example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
/// assert_eq!(site_origin(&url), "http://127.0.0.1:8080");
/// ```
pub fn site_origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Checks whether two URLs share the same origin
pub fn same_site(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
