//! Content service client.
//!
//! One method per generate endpoint plus the two uncached validation
//! calls. The generate flow is: derive key → consult cache → fetch with
//! retry → normalize → cache the normalized array → return it. Cache hits
//! are returned verbatim; the cached value is exactly what a previous call
//! returned.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use germanprep_cache::{derive_key, CacheStore, MemoryBackend, StorageBackend};
use germanprep_core::model::{
    GenerateParams, ListeningQuestion, ReadingQuestion, Skill, SpeakingQuestion,
    ValidationReport, WritingQuestion,
};
use germanprep_core::normalize::{
    normalize_listening, normalize_reading, normalize_speaking, normalize_writing,
};

use crate::config::ClientConfig;
use crate::error::{preview, ClientError};
use crate::retry::{fetch_with_retry, RetryPolicy};

/// Client for the question-generation and validation endpoints.
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    cache: CacheStore,
}

impl ContentClient {
    /// Build a client over an injected storage backend.
    pub fn new(
        config: &ClientConfig,
        backend: Arc<dyn StorageBackend>,
    ) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry_policy(),
            cache: CacheStore::new(backend),
        })
    }

    /// Build a client whose cache lives only for the process lifetime.
    pub fn with_memory_cache(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config, Arc::new(MemoryBackend::new()))
    }

    #[instrument(skip(self, params), fields(topic = %params.topic, level = %params.level))]
    pub async fn generate_listening(
        &self,
        params: &GenerateParams,
        use_cache: bool,
    ) -> Result<Vec<ListeningQuestion>, ClientError> {
        self.generate(Skill::Listening, params, use_cache, normalize_listening)
            .await
    }

    #[instrument(skip(self, params), fields(topic = %params.topic, level = %params.level))]
    pub async fn generate_reading(
        &self,
        params: &GenerateParams,
        use_cache: bool,
    ) -> Result<Vec<ReadingQuestion>, ClientError> {
        self.generate(Skill::Reading, params, use_cache, normalize_reading)
            .await
    }

    #[instrument(skip(self, params), fields(topic = %params.topic, level = %params.level))]
    pub async fn generate_writing(
        &self,
        params: &GenerateParams,
        use_cache: bool,
    ) -> Result<Vec<WritingQuestion>, ClientError> {
        self.generate(Skill::Writing, params, use_cache, normalize_writing)
            .await
    }

    #[instrument(skip(self, params), fields(topic = %params.topic, level = %params.level))]
    pub async fn generate_speaking(
        &self,
        params: &GenerateParams,
        use_cache: bool,
    ) -> Result<Vec<SpeakingQuestion>, ClientError> {
        self.generate(Skill::Speaking, params, use_cache, normalize_speaking)
            .await
    }

    /// Validate a writing response. Never cached; always a fresh round
    /// trip.
    #[instrument(skip(self, task, user_response), fields(response_len = user_response.len()))]
    pub async fn validate_writing(
        &self,
        task: &WritingQuestion,
        user_response: &str,
    ) -> Result<ValidationReport, ClientError> {
        if user_response.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "user response must not be empty".to_string(),
            ));
        }
        let task_json = serde_json::to_string(task)
            .map_err(|e| ClientError::InvalidInput(format!("failed to encode writing task: {e}")))?;

        let url = format!("{}/validate/writing", self.base_url);
        let form = [
            ("writing_task", task_json.as_str()),
            ("user_response", user_response),
        ];
        let response = fetch_with_retry(
            || {
                self.http
                    .post(&url)
                    .header(ACCEPT, "application/json")
                    .form(&form)
                    .send()
            },
            &self.retry,
        )
        .await?;

        let body = success_body(response).await?;
        serde_json::from_str(&body).map_err(|_| ClientError::Parse {
            preview: preview(&body),
        })
    }

    /// Validate a recorded speaking response. Never cached.
    #[instrument(skip(self, task, audio), fields(audio_bytes = audio.len()))]
    pub async fn validate_speaking(
        &self,
        task: &SpeakingQuestion,
        audio: &[u8],
    ) -> Result<ValidationReport, ClientError> {
        if audio.is_empty() {
            return Err(ClientError::InvalidInput(
                "audio recording must not be empty".to_string(),
            ));
        }
        let task_json = serde_json::to_string(task).map_err(|e| {
            ClientError::InvalidInput(format!("failed to encode speaking task: {e}"))
        })?;

        let url = format!("{}/validate/speaking", self.base_url);
        let response = fetch_with_retry(
            || {
                let part = reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("recording.mp3")
                    .mime_str("audio/mpeg")
                    .expect("static mime type is valid");
                let multipart = reqwest::multipart::Form::new()
                    .part("file", part)
                    .text("speaking_task", task_json.clone());
                self.http
                    .post(&url)
                    .header(ACCEPT, "application/json")
                    .multipart(multipart)
                    .send()
            },
            &self.retry,
        )
        .await?;

        let body = success_body(response).await?;
        serde_json::from_str(&body).map_err(|_| ClientError::Parse {
            preview: preview(&body),
        })
    }

    /// Wipe every cached question set.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn generate<R, Q>(
        &self,
        skill: Skill,
        params: &GenerateParams,
        use_cache: bool,
        normalize: fn(R) -> Q,
    ) -> Result<Vec<Q>, ClientError>
    where
        R: DeserializeOwned,
        Q: Serialize + DeserializeOwned,
    {
        let key = derive_key(skill, params).map_err(|e| ClientError::InvalidInput(e.to_string()))?;

        if use_cache {
            if let Some(cached) = self.cache.get::<Vec<Q>>(&key) {
                debug!(%key, "returning cached questions");
                return Ok(cached);
            }
        }

        let url = format!("{}/generate/{}", self.base_url, skill);
        let query = query_for(skill, params);
        let response = fetch_with_retry(
            || {
                self.http
                    .post(&url)
                    .header(ACCEPT, "application/json")
                    .query(&query)
                    .send()
            },
            &self.retry,
        )
        .await?;

        let body = success_body(response).await?;
        let raw: Vec<R> = serde_json::from_str(&body).map_err(|_| ClientError::Parse {
            preview: preview(&body),
        })?;
        let questions: Vec<Q> = raw.into_iter().map(normalize).collect();

        if use_cache {
            self.cache.set(&key, &questions);
        }
        Ok(questions)
    }
}

/// Query parameters for one generate endpoint. Each endpoint understands
/// only its own discriminators; the rest are not sent.
fn query_for(skill: Skill, params: &GenerateParams) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("topic", params.topic.clone()),
        ("level", params.level.to_string()),
    ];
    if skill != Skill::Listening {
        if let Some(start) = params.item_id_start {
            query.push(("item_id_start", start.to_string()));
        }
    }
    match skill {
        Skill::Reading => {
            if let Some(v) = &params.prefer_type {
                query.push(("prefer_type", v.clone()));
            }
        }
        Skill::Writing => {
            if let Some(v) = &params.task_type {
                query.push(("task_type", v.clone()));
            }
        }
        Skill::Speaking => {
            if let Some(v) = &params.interaction_type {
                query.push(("interaction_type", v.clone()));
            }
        }
        Skill::Listening => {}
    }
    query
}

/// Return the body of a success response, or convert a non-success one
/// into `HttpStatus` carrying any JSON `detail`/`error` field the service
/// included.
async fn success_body(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = extract_error_detail(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
        return Err(ClientError::HttpStatus {
            status: status.as_u16(),
            detail,
        });
    }
    response
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))
}

fn extract_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for field in ["detail", "error"] {
        if let Some(s) = value.get(field).and_then(|v| v.as_str()) {
            return Some(s.to_string());
        }
    }
    None
}
