use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::vocabulary::VocabEntry;
use crate::scheduler::mastery::clamp_score;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

const CORRECT_FEEDBACK: f64 = 0.89;
const CLOSE_FEEDBACK: f64 = 0.67;
const CORRECT_VERDICT: f64 = 0.8;
const CLOSE_VERDICT: f64 = 0.65;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("similarity service not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("similarity response missing cosine")]
    MissingCosine,
}

/// Semantic similarity between a learner's answer and a reference translation.
pub trait SimilarityService: Send + Sync {
    /// Raw cosine similarity in [-1, 1].
    fn cosine<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> BoxFuture<'a, Result<f64, SimilarityError>>;
}

/// Used when no endpoint is configured; only exact matches score.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSimilarity;

impl SimilarityService for DisabledSimilarity {
    fn cosine<'a>(
        &'a self,
        _source: &'a str,
        _target: &'a str,
    ) -> BoxFuture<'a, Result<f64, SimilarityError>> {
        async { Err(SimilarityError::NotConfigured) }.boxed()
    }
}

#[derive(Debug, Serialize)]
struct SimilarityRequest<'a> {
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct SimilarityResponse {
    cosine: Option<f64>,
}

/// Client for an embedding service that answers `POST {source, target}` with
/// `{cosine, feedback}`.
#[derive(Clone)]
pub struct HttpSimilarity {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSimilarity {
    /// Fails when the HTTP client cannot be built with the given timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SimilarityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, source: &str, target: &str) -> Result<f64, SimilarityError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&SimilarityRequest { source, target })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SimilarityError::HttpStatus { status, body });
        }

        let parsed = resp.json::<SimilarityResponse>().await?;
        parsed
            .cosine
            .filter(|c| c.is_finite())
            .ok_or(SimilarityError::MissingCosine)
    }
}

impl SimilarityService for HttpSimilarity {
    fn cosine<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> BoxFuture<'a, Result<f64, SimilarityError>> {
        self.request(source, target).boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerVerdict {
    Correct,
    Close,
    Wrong,
}

impl AnswerVerdict {
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity >= CORRECT_VERDICT {
            Self::Correct
        } else if similarity >= CLOSE_VERDICT {
            Self::Close
        } else {
            Self::Wrong
        }
    }
}

pub fn feedback_label(cosine: f64) -> &'static str {
    if cosine >= CORRECT_FEEDBACK {
        "Correct or very close"
    } else if cosine >= CLOSE_FEEDBACK {
        "Close"
    } else {
        "Not similar"
    }
}

/// Maps a cosine in [-1, 1] onto the [0, 1] display scale.
pub fn display_score(cosine: f64) -> f64 {
    clamp_score((cosine + 1.0) / 2.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvaluation {
    /// Score recorded for mastery, in [0, 1].
    pub similarity: f64,
    /// Best raw cosine, absent for exact matches and failed lookups.
    pub cosine: Option<f64>,
    pub display: f64,
    pub feedback: &'static str,
    pub verdict: AnswerVerdict,
    pub exact_match: bool,
}

impl AnswerEvaluation {
    fn perfect() -> Self {
        Self {
            similarity: 1.0,
            cosine: None,
            display: 1.0,
            feedback: "Perfect",
            verdict: AnswerVerdict::Correct,
            exact_match: true,
        }
    }

    fn unscored() -> Self {
        Self {
            similarity: 0.0,
            cosine: None,
            display: 0.0,
            feedback: feedback_label(0.0),
            verdict: AnswerVerdict::Wrong,
            exact_match: false,
        }
    }

    fn from_cosine(cosine: f64) -> Self {
        let similarity = clamp_score(cosine);
        Self {
            similarity,
            cosine: Some(cosine),
            display: display_score(cosine),
            feedback: feedback_label(cosine),
            verdict: AnswerVerdict::from_similarity(similarity),
            exact_match: false,
        }
    }
}

/// Scores `answer` for `entry`. An exact match with any translation skips the
/// service; otherwise the answer is compared with the entry's word by the
/// (multilingual) similarity service. Service failures score 0.
pub async fn evaluate_answer(
    service: &dyn SimilarityService,
    entry: &VocabEntry,
    answer: &str,
) -> AnswerEvaluation {
    let answer = answer.trim();
    if answer.is_empty() {
        return AnswerEvaluation::unscored();
    }

    let lowered = answer.to_lowercase();
    if entry
        .translations
        .iter()
        .any(|t| t.trim().to_lowercase() == lowered)
    {
        return AnswerEvaluation::perfect();
    }

    match service.cosine(answer, entry.word.trim()).await {
        Ok(cosine) => AnswerEvaluation::from_cosine(cosine),
        Err(SimilarityError::NotConfigured) => AnswerEvaluation::unscored(),
        Err(err) => {
            warn!(word = %entry.word, error = %err, "similarity scoring failed");
            AnswerEvaluation::unscored()
        }
    }
}
