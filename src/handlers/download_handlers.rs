//! HTTP handler for the attachment download.
//! The file is buffered fully by `DownloadService`; this module only shapes
//! the response headers.

use crate::{
    errors::AppError,
    services::{download_service::DownloadService, mime, storage_service::Storage},
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
/// `GET /download` - serve the configured record's file as an attachment.
pub async fn download_file<S: Storage>(
    State(service): State<DownloadService<S>>,
) -> Result<Response, AppError> {
    let download = service.fetch_download().await?;
    tracing::info!(
        "serving {} ({} bytes, {})",
        download.file_name,
        download.body.len(),
        download.content_type
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&download.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(mime::DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(download.body.len()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        attachment_disposition(&download.file_name),
    );

    let mut response = Response::new(Body::from(download.body));
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Build `attachment; filename=...` for `file_name`.
///
/// Token-safe names go out verbatim. Anything else is quoted with control
/// characters dropped, so a name can never split the header. Non-ASCII
/// names additionally get an RFC 5987 `filename*` parameter.
fn attachment_disposition(file_name: &str) -> HeaderValue {
    let cleaned: String = file_name.chars().filter(|c| !c.is_control()).collect();

    let value = if !cleaned.is_empty() && cleaned.bytes().all(is_token_byte) {
        format!("attachment; filename={}", cleaned)
    } else {
        let mut value = String::from("attachment; filename=\"");
        for c in cleaned.chars() {
            match c {
                '"' | '\\' => {
                    value.push('\\');
                    value.push(c);
                }
                c if c.is_ascii() => value.push(c),
                _ => value.push('_'),
            }
        }
        value.push('"');
        if !cleaned.is_ascii() {
            value.push_str("; filename*=UTF-8''");
            value.push_str(&percent_encode(&cleaned));
        }
        value
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// RFC 5987 `attr-char` passthrough, everything else `%XX`.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
