//! Request routing.
//!
//! Priority order: `OPTIONS` preflight, `/api/has-changed`, `/who_am_i`, then static files
//! from the artifact directory. Path matching ignores ASCII case.

use crate::identity::identity_text;
use crate::server::context::ServerContext;

use std::fs::read;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Component, Path};

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE, HeaderMap, HeaderValue,
};
use hyper::{Method, Response, StatusCode, Uri};
use log::{debug, error, info, warn};
use url::form_urlencoded;

pub const HAS_CHANGED_PATH: &str = "/api/has-changed";
pub const WHO_AM_I_PATH: &str = "/who_am_i";
pub const FORCE_QUERY_KEY: &str = "force";

const TEXT_PLAIN: &str = "text/plain";
const OCTET_STREAM: &str = "application/octet-stream";
const CORS_WILDCARD: &str = "*";
const CORS_MAX_AGE_SECS: &str = "86400";

pub(crate) type HttpResponse = Response<Full<Bytes>>;

/// Route one request. Never panics; handler panics become 500s.
pub(crate) fn handle(context: &ServerContext, method: &Method, uri: &Uri) -> HttpResponse {
    debug!("{method} {uri}");

    match catch_unwind(AssertUnwindSafe(|| route(context, method, uri))) {
        Ok(response) => response,
        Err(_) => {
            error!("Handler panicked while serving {method} {uri}");
            respond(StatusCode::INTERNAL_SERVER_ERROR, None, Bytes::new())
        }
    }
}

fn route(context: &ServerContext, method: &Method, uri: &Uri) -> HttpResponse {
    if method == Method::OPTIONS {
        return respond(StatusCode::NO_CONTENT, None, Bytes::new());
    }

    let path = uri.path();

    if path.eq_ignore_ascii_case(HAS_CHANGED_PATH) {
        return has_changed(context, uri.query());
    }

    if path.eq_ignore_ascii_case(WHO_AM_I_PATH) {
        return who_am_i(context);
    }

    if method != Method::GET && method != Method::HEAD {
        return respond(StatusCode::METHOD_NOT_ALLOWED, None, Bytes::new());
    }

    static_file(context, path)
}

/// Change-poll endpoint.
///
/// The body reports `changed || force` as read before any reset. The export and the reset
/// both happen under the change lock, and the flag is only cleared when the export
/// succeeded, so a failed export is retried on the next poll.
fn has_changed(context: &ServerContext, query: Option<&str>) -> HttpResponse {
    let force = query.is_some_and(has_force_flag);
    let changed = context.tracker.currently_changed();
    let triggered = changed || force;

    if triggered {
        let mut guard = context.tracker.lock();

        match context.chosen_port() {
            None => debug!("No port chosen, skipping export"),
            Some(port) => {
                let was_changed = guard.is_changed();
                match context.exporter.export(port) {
                    Ok(path) => {
                        info!("Re-exported {} (force={force})", path.display());
                        if was_changed {
                            guard.reset_flag();
                        }
                    }
                    Err(e) => error!("Export failed, artifact is stale: {e}"),
                }
            }
        }
    }

    let body = if triggered { "true" } else { "false" };
    respond(StatusCode::OK, Some(TEXT_PLAIN), Bytes::from_static(body.as_bytes()))
}

fn who_am_i(context: &ServerContext) -> HttpResponse {
    let text = identity_text(context.identity.as_ref());
    respond(StatusCode::OK, Some(TEXT_PLAIN), Bytes::from(text))
}

fn static_file(context: &ServerContext, request_path: &str) -> HttpResponse {
    let Some(file_name) = request_file_name(request_path) else {
        debug!("Rejected request path {request_path}");
        return respond(StatusCode::NOT_FOUND, None, Bytes::new());
    };

    let path = context.exporter.layout().base_dir().join(&file_name);
    if !path.is_file() {
        debug!("Not found: {}", path.display());
        return respond(StatusCode::NOT_FOUND, None, Bytes::new());
    }

    match read(&path) {
        Ok(content) => {
            debug!("Serving {} ({} bytes)", path.display(), content.len());
            respond(StatusCode::OK, Some(OCTET_STREAM), Bytes::from(content))
        }
        Err(e) => {
            warn!("File serving error for {}: {e}", path.display());
            respond(StatusCode::INTERNAL_SERVER_ERROR, None, Bytes::new())
        }
    }
}

/// The last segment of `request_path`, percent-decoded, if it names a plain file.
///
/// Anything that decodes to more than one path component (`..`, `.`, `a%2Fb`, `..%5C`,
/// a drive prefix, an embedded NUL) is rejected.
pub fn request_file_name(request_path: &str) -> Option<String> {
    let segment = request_path.rsplit('/').next()?;
    let decoded = urlencoding::decode(segment).ok()?;

    if decoded.contains(['/', '\\', '\0']) {
        return None;
    }

    let mut components = Path::new(&*decoded).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name.to_str().map(str::to_owned),
        _ => None,
    }
}

/// `true` if the query string carries a `force` key, with or without a value.
pub fn has_force_flag(query: &str) -> bool {
    form_urlencoded::parse(query.as_bytes())
        .any(|(key, _)| key.eq_ignore_ascii_case(FORCE_QUERY_KEY))
}

fn add_cors_headers(headers: &mut HeaderMap) {
    let wildcard = HeaderValue::from_static(CORS_WILDCARD);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, wildcard.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, wildcard.clone());
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, wildcard);
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(CORS_MAX_AGE_SECS),
    );
}

fn respond(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    add_cors_headers(headers);
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    response
}
