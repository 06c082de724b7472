//! Minimal HTTP transport seam shared by the API client and the identity
//! provider backend.
//!
//! Client-side (hydrate): requests go out through `gloo-net`.
//! Server-side (SSR) and native tests: `BrowserTransport` returns
//! `TransportError::Unavailable`; tests substitute their own `Transport`.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use async_trait::async_trait;

/// HTTP verbs used by this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A file selected for upload.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub source: FileSource,
}

/// Where the bytes of an [`UploadFile`] live.
#[derive(Clone, Debug)]
pub enum FileSource {
    Bytes(Vec<u8>),
    #[cfg(feature = "hydrate")]
    Browser(web_sys::File),
}

impl UploadFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), content_type: None, source: FileSource::Bytes(bytes) }
    }

    #[cfg(feature = "hydrate")]
    pub fn from_browser(file: web_sys::File) -> Self {
        let content_type = Some(file.type_()).filter(|t| !t.is_empty());
        Self { name: file.name(), content_type, source: FileSource::Browser(file) }
    }

    /// Lowercased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Request body variants.
#[derive(Clone, Debug)]
pub enum RequestBody {
    Empty,
    /// Serialized JSON text.
    Json(String),
    /// Multipart form with a single file part. The transport sets the
    /// content type and boundary.
    Multipart { field: String, file: UploadFile },
}

/// Fully-built outgoing request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    /// Attach a JSON body and the matching content type.
    #[must_use]
    pub fn json(self, body: &serde_json::Value) -> Self {
        let mut request = self.header("Content-Type", "application/json");
        request.body = RequestBody::Json(body.to_string());
        request
    }

    #[must_use]
    pub fn multipart(mut self, field: &str, file: UploadFile) -> Self {
        self.body = RequestBody::Multipart { field: field.to_owned(), file };
        self
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body text of a completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was obtained.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("http transport not available on server")]
    Unavailable,
}

/// Sends one request and returns the response, whatever its status.
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Browser `fetch` transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            browser_send(request).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            Err(TransportError::Unavailable)
        }
    }
}

#[cfg(feature = "hydrate")]
async fn browser_send(request: HttpRequest) -> Result<HttpResponse, TransportError> {
    use gloo_net::http::Request;

    let network = |e: gloo_net::Error| TransportError::Network(e.to_string());

    let mut builder = match request.method {
        Method::Get => Request::get(&request.url),
        Method::Post => Request::post(&request.url),
    };
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    let outgoing = match request.body {
        RequestBody::Empty => builder.build().map_err(network)?,
        RequestBody::Json(text) => builder.body(text).map_err(network)?,
        RequestBody::Multipart { field, file } => {
            let form = multipart_form(&field, file)?;
            builder.body(form).map_err(network)?
        }
    };
    let response = outgoing.send().await.map_err(network)?;
    let status = response.status();
    let body = response.text().await.map_err(network)?;
    Ok(HttpResponse { status, body })
}

#[cfg(feature = "hydrate")]
fn multipart_form(field: &str, file: UploadFile) -> Result<web_sys::FormData, TransportError> {
    let js = |e: wasm_bindgen::JsValue| TransportError::Network(format!("{e:?}"));
    let form = web_sys::FormData::new().map_err(js)?;
    match file.source {
        FileSource::Browser(handle) => {
            form.append_with_blob_and_filename(field, &handle, &file.name).map_err(js)?;
        }
        FileSource::Bytes(bytes) => {
            let array = js_sys::Uint8Array::from(bytes.as_slice());
            let parts = js_sys::Array::of1(&array);
            let options = web_sys::BlobPropertyBag::new();
            if let Some(content_type) = &file.content_type {
                options.set_type(content_type);
            }
            let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js)?;
            form.append_with_blob_and_filename(field, &blob, &file.name).map_err(js)?;
        }
    }
    Ok(form)
}
