// ABOUTME: Browser-impersonation headers expected by the mastering service
// ABOUTME: Values are pinned to the web client version the endpoints accept

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:75.0) Gecko/20100101 Firefox/75.0";
pub const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
pub const ACCEPT_ANY: &str = "*/*";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";
pub const ORIGIN: &str = "https://emastered.com";
pub const REFERER: &str = "https://emastered.com/";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

fn browser_base(accept: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let pairs: [(&'static str, &'static str); 7] = [
        ("user-agent", USER_AGENT),
        ("accept", accept),
        ("accept-language", ACCEPT_LANGUAGE),
        ("accept-encoding", ACCEPT_ENCODING),
        ("origin", ORIGIN),
        ("connection", "keep-alive"),
        ("referer", REFERER),
    ];
    for (name, value) in pairs {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Headers for the JSON status endpoint.
pub fn status_headers() -> HeaderMap {
    let mut headers = browser_base(ACCEPT_JSON);
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers
}

/// Status headers plus the XHR marker and form content type.
pub fn registration_headers() -> HeaderMap {
    let mut headers = status_headers();
    headers.insert(
        HeaderName::from_static("content-type"),
        HeaderValue::from_static(FORM_CONTENT_TYPE),
    );
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static(XML_HTTP_REQUEST),
    );
    headers
}

/// Content type is left to the multipart encoder so it carries the boundary.
pub fn upload_headers() -> HeaderMap {
    browser_base(ACCEPT_ANY)
}
