use std::error::Error as _;
use std::time::Duration;

use analyzer_logging::{analyzer_debug, analyzer_info, analyzer_warn};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{AnalysisResponse, AnalysisUpload, ClientError, FailureKind, HealthStatus};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const ANALYZE_PATH: &str = "analyze-resume/";
pub const RESUME_FIELD: &str = "resume";
pub const JOB_DESCRIPTION_FIELD: &str = "job_description";

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request deadline. Analysis can take a while, so none by default.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: 8 * 1024 * 1024,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves `path` against the base URL, which may or may not end in `/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut base = Url::parse(self.base_url.trim())
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("unsupported api url: {}", self.base_url),
            ));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(path)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, upload: AnalysisUpload) -> Result<AnalysisResponse, ClientError>;

    async fn health(&self) -> Result<HealthStatus, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        // Fail on a bad base URL now rather than on first submit.
        settings.endpoint(ANALYZE_PATH)?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let detail = self
                .read_body(response)
                .await
                .ok()
                .and_then(|body| error_detail(&body));
            let status_text = status
                .canonical_reason()
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| status.to_string());
            return Err(
                ClientError::new(FailureKind::HttpStatus(status.as_u16()), status_text)
                    .with_detail(detail),
            );
        }

        let body = self.read_body(response).await?;
        serde_json::from_slice(&body).map_err(|err| {
            ClientError::new(
                FailureKind::InvalidResponse,
                format!("unexpected response body: {err}"),
            )
        })
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl AnalysisApi for ReqwestAnalysisClient {
    async fn analyze(&self, upload: AnalysisUpload) -> Result<AnalysisResponse, ClientError> {
        let url = self.settings.endpoint(ANALYZE_PATH)?;
        analyzer_info!(
            "POST {} resume={} bytes={} job_description={}",
            url,
            upload.resume.file_name,
            upload.resume.content.len(),
            upload.job_description.is_some()
        );
        let form = build_form(upload)?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let result = self.read_json::<AnalysisResponse>(response).await;
        match &result {
            Ok(response) => analyzer_info!("Analysis received ({} chars)", response.analysis.len()),
            Err(err) => analyzer_warn!(
                "Analysis failed: {} ({}){}",
                err.message,
                err.kind,
                err.detail
                    .as_deref()
                    .map(|detail| format!(" detail: {detail}"))
                    .unwrap_or_default()
            ),
        }
        result
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.settings.endpoint("")?;
        analyzer_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json::<HealthStatus>(response).await
    }
}

/// Builds the multipart body; an empty job description is left out entirely.
fn build_form(upload: AnalysisUpload) -> Result<Form, ClientError> {
    let AnalysisUpload {
        resume,
        job_description,
    } = upload;

    let length = resume.content.len() as u64;
    let resume_part = Part::stream_with_length(resume.content, length)
        .file_name(resume.file_name)
        .mime_str(PDF_CONTENT_TYPE)
        .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

    let mut form = Form::new().part(RESUME_FIELD, resume_part);
    if let Some(text) = job_description.filter(|text| !text.is_empty()) {
        form = form.text(JOB_DESCRIPTION_FIELD, text);
    }
    Ok(form)
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn too_large(max_bytes: u64, actual: u64) -> ClientError {
    ClientError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    ClientError::new(kind, describe_chain(&err))
}

// reqwest's top-level message hides the interesting part ("connection refused") in the source chain.
fn describe_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
