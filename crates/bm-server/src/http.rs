//! warp adapter
//!
//! One catch-all filter turns every HTTP request into a [`Request`],
//! dispatches it through the [`Router`] and converts the [`Response`] back.

use crate::config::ServerConfig;
use crate::context::Request;
use crate::error::ServerError;
use crate::response::Response;
use crate::router::Router;
use bytes::Bytes;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::header::LOCATION;
use warp::http::{HeaderMap, Method, StatusCode};
use warp::path::FullPath;
use warp::{Filter, Reply};

/// Build a request from warp's parts
///
/// # Errors
/// Returns a 400 response when a non-empty body is not JSON
pub fn to_request(
    method: Method,
    path: &str,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Request, Response> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(path, error = %e, "Rejecting malformed JSON body");
            Response::err_status(StatusCode::BAD_REQUEST, "Invalid JSON body")
        })?;
        Some(value)
    };

    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect();

    Ok(Request {
        method,
        path: path.to_string(),
        query,
        headers,
        body,
    })
}

/// Convert a response into a warp reply
#[must_use]
pub fn into_reply(response: Response) -> warp::reply::Response {
    match response {
        Response::Redirect { location } => warp::reply::with_header(
            warp::reply::with_status(warp::reply(), StatusCode::FOUND),
            LOCATION,
            location,
        )
        .into_response(),
        other => {
            let status = other.status();
            warp::reply::with_status(warp::reply::json(&other.body()), status).into_response()
        }
    }
}

async fn handle(
    router: Arc<Router>,
    method: Method,
    path: FullPath,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<warp::reply::Response, Infallible> {
    let response = match to_request(method.clone(), path.as_str(), query, &headers, &body) {
        Ok(request) => router.dispatch(request).await,
        Err(response) => response,
    };

    tracing::info!(
        %method,
        path = path.as_str(),
        status = response.status().as_u16(),
        "Request"
    );
    Ok(into_reply(response))
}

/// Catch-all filter serving every route of `router`
pub fn routes(
    router: Arc<Router>,
) -> impl Filter<Extract = (warp::reply::Response,), Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || Arc::clone(&router))
        .and(warp::method())
        .and(warp::path::full())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::header::headers_cloned())
        .and(warp::body::bytes())
        .and_then(handle)
}

/// Serve `router` on the configured address until the process ends
///
/// # Errors
/// Returns `ServerError::Io` if the address cannot be bound
pub async fn serve(config: &ServerConfig, router: Router) -> Result<(), ServerError> {
    let (addr, server) = warp::serve(routes(Arc::new(router)))
        .try_bind_ephemeral(config.bind)
        .map_err(|e| ServerError::Io(std::io::Error::other(e)))?;

    tracing::info!(%addr, serve_path = config.serve_path(), "Breezemoon server listening");
    server.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_request_parses_json_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("csrftoken", "abc".parse().unwrap());
        let request = to_request(
            Method::POST,
            "/bm",
            HashMap::new(),
            &headers,
            br#"{"breezemoonContent":"hi"}"#,
        )
        .unwrap();

        assert_eq!(request.header("csrftoken"), Some("abc"));
        assert_eq!(request.json_str("breezemoonContent"), Some("hi"));
    }

    #[test]
    fn to_request_empty_body_is_none() {
        let request = to_request(Method::GET, "/", HashMap::new(), &HeaderMap::new(), b"").unwrap();
        assert!(request.body.is_none());
    }

    #[test]
    fn to_request_rejects_malformed_json() {
        let Err(response) = to_request(Method::POST, "/bm", HashMap::new(), &HeaderMap::new(), b"{nope")
        else {
            panic!("malformed body accepted");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn into_reply_sets_status_and_location() {
        let reply = into_reply(Response::redirect("/guide"));
        assert_eq!(reply.status(), StatusCode::FOUND);
        assert_eq!(reply.headers()[LOCATION], "/guide");

        let reply = into_reply(Response::err_status(StatusCode::FORBIDDEN, "Forbidden"));
        assert_eq!(reply.status(), StatusCode::FORBIDDEN);
    }
}
