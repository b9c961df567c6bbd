//! HTTP transport for token requests
//!
//! Adapts `reqwest` to the `oauth2` crate's request and response types.

use thiserror::Error;

/// Transport failure while talking to the token endpoint
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// Request could not be sent or the body could not be read
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// Response parts could not be reassembled
    #[error(transparent)]
    Http(#[from] http::Error),
}

/// Perform one token request without following redirects
///
/// Request headers are forwarded unchanged and the response body is fully
/// buffered before returning.
///
/// # Errors
///
/// Returns [`HttpClientError`] if the client cannot be built, the request
/// fails to send, or the response cannot be read.
pub async fn async_http_client(
    request: oauth2::HttpRequest,
) -> Result<oauth2::HttpResponse, HttpClientError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let method = request.method().clone();
    let url = request.uri().to_string();
    let headers = request.headers().clone();
    let body = request.into_body();

    let mut request_builder = client.request(method, &url).body(body);
    for (name, value) in &headers {
        request_builder = request_builder.header(name.as_str(), value.as_bytes());
    }

    let response = request_builder.send().await?;

    let status_code = response.status();
    let headers = response.headers().to_owned();
    let body = response.bytes().await?.to_vec();

    let mut builder = http::Response::builder().status(status_code);
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }

    Ok(builder.body(body)?)
}
