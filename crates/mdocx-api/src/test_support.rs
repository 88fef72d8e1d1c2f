//! Shared helpers for router-level tests.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, header::CONTENT_TYPE};
use axum::response::Response;
use mdocx_config::ServerConfig;
use mdocx_convert::{ConvertError, ConvertResult, Converter};
use mdocx_telemetry::Metrics;
use serde::de::DeserializeOwned;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::http::router::ApiServer;

const BOUNDARY: &str = "mdocx-test-boundary";

#[derive(Clone, Copy)]
enum Behaviour {
    CopyInput,
    Fail(&'static str),
    TimeOut,
    NoOutput,
}

/// Converter double that records invocations and acts without a subprocess.
pub(crate) struct FakeConverter {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeConverter {
    fn with(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    /// Writes the uploaded Markdown bytes to the output path.
    pub(crate) fn copy_input() -> Arc<Self> {
        Self::with(Behaviour::CopyInput)
    }

    /// Exits unsuccessfully with the given diagnostic output.
    pub(crate) fn fail(stderr: &'static str) -> Arc<Self> {
        Self::with(Behaviour::Fail(stderr))
    }

    pub(crate) fn time_out() -> Arc<Self> {
        Self::with(Behaviour::TimeOut)
    }

    /// Reports success without producing a document.
    pub(crate) fn succeed_without_output() -> Arc<Self> {
        Self::with(Behaviour::NoOutput)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> ConvertResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::CopyInput => {
                tokio::fs::copy(input, output)
                    .await
                    .map_err(|source| ConvertError::Io {
                        operation: "copy",
                        path: output.to_path_buf(),
                        source,
                    })?;
                Ok(())
            }
            Behaviour::Fail(stderr) => Err(ConvertError::Failed {
                program: PathBuf::from("pandoc"),
                code: Some(64),
                stderr: stderr.to_string(),
            }),
            Behaviour::TimeOut => Err(ConvertError::Timeout {
                program: PathBuf::from("pandoc"),
                timeout: Duration::from_secs(120),
            }),
            Behaviour::NoOutput => Ok(()),
        }
    }
}

/// API server wired to a fake converter and a scratch work directory.
pub(crate) struct TestServer {
    api: ApiServer,
    converter: Arc<FakeConverter>,
    metrics: Metrics,
    _work_dir: Option<TempDir>,
}

impl TestServer {
    pub(crate) fn new(converter: Arc<FakeConverter>) -> Result<Self> {
        Self::build(converter, |_| {})
    }

    pub(crate) fn with_work_dir(converter: Arc<FakeConverter>, work_dir: PathBuf) -> Result<Self> {
        let metrics = Metrics::new()?;
        let config = ServerConfig {
            work_dir: Some(work_dir),
            ..ServerConfig::default()
        };
        let shared: Arc<dyn Converter> = Arc::<FakeConverter>::clone(&converter);
        let api = ApiServer::new(&config, shared, metrics.clone());
        Ok(Self {
            api,
            converter,
            metrics,
            _work_dir: None,
        })
    }

    pub(crate) fn with_upload_limit(converter: Arc<FakeConverter>, limit: usize) -> Result<Self> {
        Self::build(converter, |config| config.max_upload_bytes = limit)
    }

    pub(crate) fn with_retention(converter: Arc<FakeConverter>, ttl: Duration) -> Result<Self> {
        Self::build(converter, |config| config.retention.ttl = ttl)
    }

    fn build(
        converter: Arc<FakeConverter>,
        customize: impl FnOnce(&mut ServerConfig),
    ) -> Result<Self> {
        let work_dir = tempfile::tempdir()?;
        let metrics = Metrics::new()?;
        let mut config = ServerConfig {
            work_dir: Some(work_dir.path().to_path_buf()),
            ..ServerConfig::default()
        };
        customize(&mut config);
        let shared: Arc<dyn Converter> = Arc::<FakeConverter>::clone(&converter);
        let api = ApiServer::new(&config, shared, metrics.clone());
        Ok(Self {
            api,
            converter,
            metrics,
            _work_dir: Some(work_dir),
        })
    }

    pub(crate) async fn send(&self, request: Request<Body>) -> Result<Response> {
        let response: Result<Response, Infallible> =
            self.api.router().clone().oneshot(request).await;
        Ok(response?)
    }

    pub(crate) fn calls(&self) -> usize {
        self.converter.calls()
    }

    pub(crate) const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub(crate) const fn api(&self) -> &ApiServer {
        &self.api
    }

    pub(crate) fn into_api(self) -> ApiServer {
        self.api
    }
}

/// One part of a multipart form body.
pub(crate) struct FormPart {
    name: String,
    file_name: Option<String>,
    data: Vec<u8>,
}

/// Plain form value without a filename.
pub(crate) fn text_field(name: &str, value: &str) -> FormPart {
    FormPart {
        name: name.to_string(),
        file_name: None,
        data: value.as_bytes().to_vec(),
    }
}

/// File part under the upload field name.
pub(crate) fn upload_field(file_name: &str, data: &[u8]) -> FormPart {
    FormPart {
        name: "markdown_file".to_string(),
        file_name: Some(file_name.to_string()),
        data: data.to_vec(),
    }
}

/// `POST /convert` request carrying the given parts.
pub(crate) fn multipart_request(parts: &[FormPart]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match &part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: text/markdown\r\n\r\n",
                part.name
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                part.name
            ),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut request = Request::new(Body::from(body));
    *request.method_mut() = Method::POST;
    *request.uri_mut() = axum::http::Uri::from_static("/convert");
    if let Ok(value) = format!("multipart/form-data; boundary={BOUNDARY}").parse() {
        request.headers_mut().insert(CONTENT_TYPE, value);
    }
    request
}

pub(crate) fn get_request(uri: &str) -> Result<Request<Body>> {
    Ok(Request::get(uri).body(Body::empty())?)
}

pub(crate) async fn read_bytes(response: Response) -> Result<Vec<u8>> {
    Ok(to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = read_bytes(response).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
