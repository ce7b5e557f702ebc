use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::models::url::UrlStatus;

/// Timeout for probes triggered by a user request (add/edit URL, run-now).
pub const ON_DEMAND_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for probes fired by the background scheduler.
pub const BATCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Redirect hops followed before the last response is taken as final.
pub const MAX_REDIRECTS: usize = 10;

/// Outcome of a single reachability check. Always complete; probe failures
/// are classified here, never surfaced as errors to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub status: UrlStatus,
    pub response_time_ms: i32,
    pub response_code: i32,
    pub error_message: String,
}

/// Builds the outbound client used for probes.
///
/// Requests carry a browser-like header set; plenty of sites answer a bare
/// client with a 403 they would never show a browser, which would skew
/// classification. Redirects stop (rather than fail) after [`MAX_REDIRECTS`]
/// hops so the last response received still gets classified.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::DNT, HeaderValue::from_static("1"));

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .redirect(redirect::Policy::custom(|attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.stop()
            } else {
                attempt.follow()
            }
        }))
        .build()
}

/// Checks a single URL and classifies the outcome.
///
/// A HEAD request goes out first. If it fails at the transport level the
/// check is retried once with GET, since some servers reject HEAD outright.
/// An HTTP error status from HEAD is classified directly without a retry.
pub async fn probe(client: &Client, url: &str) -> ProbeResult {
    let start = Instant::now();
    match client.head(url).send().await {
        Ok(resp) => classify(resp.status(), start.elapsed()),
        Err(head_err) => {
            tracing::debug!("HEAD {} failed ({}), retrying with GET", url, head_err);

            let start = Instant::now();
            match client.get(url).send().await {
                Ok(resp) => classify(resp.status(), start.elapsed()),
                Err(get_err) => ProbeResult {
                    status: UrlStatus::Error,
                    response_time_ms: start.elapsed().as_millis() as i32,
                    response_code: 0,
                    error_message: error_text(&get_err),
                },
            }
        }
    }
}

fn classify(status: StatusCode, elapsed: Duration) -> ProbeResult {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    let response_time_ms = elapsed.as_millis() as i32;

    let (status, error_message) = match code {
        200..=399 => (UrlStatus::Online, String::new()),
        400..=499 => (UrlStatus::Offline, format!("Client error: {} {}", code, reason)),
        500..=599 => (UrlStatus::Offline, format!("Server error: {} {}", code, reason)),
        _ => (UrlStatus::Error, format!("Unexpected response: {} {}", code, reason)),
    };

    ProbeResult {
        status,
        response_time_ms,
        response_code: code as i32,
        error_message,
    }
}

/// Flattens a reqwest error and its source chain into one line, so a dial
/// failure reads "error sending request ...: connection refused" instead of
/// just the outer wrapper.
fn error_text(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::Redirect;
    use axum::routing::get;
    use axum::Router;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn classifies_success_codes_as_online() {
        for code in [200, 204, 301, 302, 399] {
            let result = classify(StatusCode::from_u16(code).unwrap(), Duration::from_millis(12));
            assert_eq!(result.status, UrlStatus::Online, "code {}", code);
            assert_eq!(result.response_code, code as i32);
            assert!(result.error_message.is_empty());
        }
    }

    #[test]
    fn classifies_client_errors_as_offline() {
        let result = classify(StatusCode::NOT_FOUND, Duration::from_millis(5));
        assert_eq!(result.status, UrlStatus::Offline);
        assert_eq!(result.response_code, 404);
        assert_eq!(result.error_message, "Client error: 404 Not Found");
    }

    #[test]
    fn classifies_server_errors_as_offline() {
        let result = classify(StatusCode::SERVICE_UNAVAILABLE, Duration::from_millis(5));
        assert_eq!(result.status, UrlStatus::Offline);
        assert_eq!(result.response_code, 503);
        assert_eq!(result.error_message, "Server error: 503 Service Unavailable");
    }

    #[test]
    fn classifies_non_standard_codes_as_error() {
        let result = classify(StatusCode::from_u16(101).unwrap(), Duration::from_millis(5));
        assert_eq!(result.status, UrlStatus::Error);
        assert_eq!(result.response_code, 101);
        assert!(result.error_message.starts_with("Unexpected response:"));
    }

    #[tokio::test]
    async fn probes_a_healthy_server_as_online() {
        let base = serve(Router::new().route("/", get(|| async { "ok" }))).await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let result = probe(&client, &base).await;

        assert_eq!(result.status, UrlStatus::Online);
        assert_eq!(result.response_code, 200);
        assert!(result.error_message.is_empty());
    }

    #[tokio::test]
    async fn probes_a_503_as_offline_with_reason() {
        let base = serve(Router::new().route(
            "/",
            get(|| async { AxumStatus::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let result = probe(&client, &base).await;

        assert_eq!(result.status, UrlStatus::Offline);
        assert_eq!(result.response_code, 503);
        assert_eq!(result.error_message, "Server error: 503 Service Unavailable");
    }

    #[tokio::test]
    async fn probes_an_unreachable_host_as_error() {
        // Grab a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = build_client(Duration::from_secs(5)).unwrap();
        let result = probe(&client, &format!("http://{}", addr)).await;

        assert_eq!(result.status, UrlStatus::Error);
        assert_eq!(result.response_code, 0);
        assert!(!result.error_message.is_empty());
    }

    #[tokio::test]
    async fn follows_short_redirect_chains_to_the_final_response() {
        let router = Router::new()
            .route("/ok", get(|| async { "done" }))
            .route(
                "/hop/:n",
                get(|Path(n): Path<u32>| async move {
                    if n == 0 {
                        Redirect::temporary("/ok")
                    } else {
                        Redirect::temporary(&format!("/hop/{}", n - 1))
                    }
                }),
            );
        let base = serve(router).await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let result = probe(&client, &format!("{}/hop/5", base)).await;

        assert_eq!(result.status, UrlStatus::Online);
        assert_eq!(result.response_code, 200);
    }

    #[tokio::test]
    async fn caps_redirect_loops_at_the_last_response() {
        let router = Router::new().route("/loop", get(|| async { Redirect::temporary("/loop") }));
        let base = serve(router).await;
        let client = build_client(Duration::from_secs(5)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(10), probe(&client, &format!("{}/loop", base)))
            .await
            .expect("redirect loop must terminate at the cap");

        // The last 307 received is treated as the final response.
        assert_eq!(result.status, UrlStatus::Online);
        assert_eq!(result.response_code, 307);
    }
}
