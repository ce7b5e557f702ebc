use std::net::Ipv4Addr;
use url::Url;

/// Normalizes a user-supplied URL before it is stored or probed.
///
/// A missing scheme defaults to https. Anything other than http(s), a URL
/// without a host, and loopback/private/link-local targets are rejected so
/// the prober cannot be pointed at internal infrastructure.
pub fn normalize_url(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    // Only a scheme-less input gets the https default; anything carrying its
    // own scheme must survive the http(s) check below on its own.
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let parsed = Url::parse(&with_scheme).map_err(|e| format!("Invalid URL format: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err("URL must use HTTP or HTTPS protocol".to_string()),
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| "URL must have a valid host".to_string())?;

    if is_blocked_host(host) {
        return Err("Domain is not allowed".to_string());
    }

    Ok(parsed.to_string())
}

fn is_blocked_host(host: &str) -> bool {
    let host = host.trim_matches(|c| c == '[' || c == ']').to_ascii_lowercase();

    if host == "localhost" || host.ends_with(".localhost") || host == "::1" {
        return true;
    }

    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return addr.is_loopback()
            || addr.is_private()
            || addr.is_link_local()
            || addr.is_unspecified();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_https_when_scheme_is_missing() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com/");
    }

    #[test]
    fn keeps_an_explicit_http_scheme() {
        assert_eq!(
            normalize_url("http://example.com/status").unwrap(),
            "http://example.com/status"
        );
    }

    #[test]
    fn rejects_non_http_schemes() {
        for target in [
            "ftp://example.com",
            "file:///etc/passwd",
            "gopher://example.com",
            "ws://example.com/socket",
        ] {
            let result = normalize_url(target);
            assert!(result.is_err(), "{} should be rejected, got {:?}", target, result);
        }
    }

    #[test]
    fn rejects_loopback_and_private_hosts() {
        for target in [
            "http://localhost:3000",
            "http://127.0.0.1",
            "http://10.1.2.3",
            "http://192.168.1.10/admin",
            "http://172.16.0.1",
            "http://0.0.0.0",
            "http://[::1]:8080",
        ] {
            assert!(normalize_url(target).is_err(), "{} should be blocked", target);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_url("https://").is_err());
        assert!(normalize_url("not a url at all").is_err());
    }
}
