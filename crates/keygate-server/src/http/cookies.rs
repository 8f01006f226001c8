//! Refresh cookie parsing and `Set-Cookie` rendering

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use keygate_core::CookieConfig;

/// Value of cookie `name` from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// `Set-Cookie` value carrying a refresh token
pub fn refresh_cookie(config: &CookieConfig, token: &str, max_age_ms: u64) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite={}",
        config.name,
        token,
        config.path,
        max_age_ms / 1000,
        config.same_site
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the refresh cookie
pub fn clear_refresh_cookie(config: &CookieConfig) -> String {
    refresh_cookie(config, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use keygate_core::SameSite;

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; refresh_token=abc.def"));
        assert_eq!(read_cookie(&headers, "refresh_token").as_deref(), Some("abc.def"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(read_cookie(&headers, "refresh_token"), None);
    }

    #[test]
    fn renders_configured_attributes() {
        let config = CookieConfig {
            same_site: SameSite::None,
            secure: true,
            ..CookieConfig::default()
        };
        assert_eq!(
            refresh_cookie(&config, "tok", 7_000),
            "refresh_token=tok; Path=/auth; Max-Age=7; HttpOnly; SameSite=None; Secure"
        );
        assert!(clear_refresh_cookie(&CookieConfig::default()).contains("Max-Age=0"));
    }
}
