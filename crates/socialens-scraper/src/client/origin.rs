//! URL origin helpers for request headers and log fields.

/// Extracts the scheme+host origin used as the `Referer` of browser-profile
/// requests.
///
/// Given `"https://example.com/blog/post"`, returns `"https://example.com"`.
/// Falls back to the first three `/`-separated parts when parsing fails.
#[must_use]
pub fn extract_origin(url: &str) -> String {
    reqwest::Url::parse(url).map_or_else(
        |_| {
            url.trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Extracts the hostname from a URL for log fields.
///
/// Falls back to the full URL string if parsing fails.
pub(crate) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
