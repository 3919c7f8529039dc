use std::sync::Arc;
use tracing::{debug, error, info};

use crate::client::{RecommendationService, TransportError};
use crate::model::{Movie, RecommendResponse};

pub const VALIDATION_MESSAGE: &str = "please describe how you feel";
pub const NO_MATCHES_MESSAGE: &str = "no matches, try another description";
pub const TRANSPORT_MESSAGE: &str =
    "something went wrong while looking for recommendations, please try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Empty or whitespace-only prompt, caught before any request.
    Validation,
    /// Well-formed answer without any movies.
    NoMatches,
    /// Network, status or decode failure.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::Validation => VALIDATION_MESSAGE,
            FailureKind::NoMatches => NO_MATCHES_MESSAGE,
            FailureKind::Transport => TRANSPORT_MESSAGE,
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Submitting,
    Success(Vec<Movie>),
    Failed(Failure),
}

impl RequestState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestState::Submitting)
    }

    pub fn movies(&self) -> &[Movie] {
        match self {
            RequestState::Success(movies) => movies,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a request is already in flight")]
    InFlight,
    #[error("{}", VALIDATION_MESSAGE)]
    EmptyPrompt,
}

/// The one outstanding request. Created by [`RequestController::begin`].
pub struct PendingRequest {
    seq: u64,
    prompt: String,
    service: Arc<dyn RecommendationService>,
}

impl PendingRequest {
    pub async fn send(self) -> Completion {
        let result = self.service.recommend(&self.prompt).await;
        Completion {
            seq: self.seq,
            result,
        }
    }
}

pub struct Completion {
    seq: u64,
    result: Result<RecommendResponse, TransportError>,
}

/// Owns the submission lifecycle: Idle -> Submitting -> Success | Failed,
/// and back to Submitting on the next prompt.
pub struct RequestController {
    service: Arc<dyn RecommendationService>,
    placeholder_poster: String,
    state: RequestState,
    seq: u64,
}

impl RequestController {
    pub fn new(
        service: Arc<dyn RecommendationService>,
        placeholder_poster: impl Into<String>,
    ) -> Self {
        Self {
            service,
            placeholder_poster: placeholder_poster.into(),
            state: RequestState::Idle,
            seq: 0,
        }
    }

    pub fn current_state(&self) -> &RequestState {
        &self.state
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_submitting()
    }

    /// Validate the prompt and move to Submitting. The caller drives the
    /// returned request and hands its completion back to [`resolve`].
    ///
    /// [`resolve`]: RequestController::resolve
    pub fn begin(&mut self, prompt: &str) -> Result<PendingRequest, SubmitRejected> {
        if self.state.is_submitting() {
            debug!("Ignoring submit while a request is in flight");
            return Err(SubmitRejected::InFlight);
        }

        if prompt.trim().is_empty() {
            self.state = RequestState::Failed(Failure::new(FailureKind::Validation));
            return Err(SubmitRejected::EmptyPrompt);
        }

        self.seq += 1;
        self.state = RequestState::Submitting;
        info!(seq = self.seq, "Submitting prompt");

        Ok(PendingRequest {
            seq: self.seq,
            prompt: prompt.to_string(),
            service: self.service.clone(),
        })
    }

    /// Apply the outcome of the in-flight request. Completions that do not
    /// belong to it (e.g. after [`cancel`]) are ignored.
    ///
    /// [`cancel`]: RequestController::cancel
    pub fn resolve(&mut self, completion: Completion) -> &RequestState {
        if !self.state.is_submitting() || completion.seq != self.seq {
            debug!(seq = completion.seq, "Discarding completion of a stale request");
            return &self.state;
        }

        self.state = match completion.result {
            Ok(response) if !response.is_empty() => {
                let movies = response.into_movies(&self.placeholder_poster);
                info!(seq = completion.seq, count = movies.len(), "Recommendations received");
                RequestState::Success(movies)
            }
            Ok(_) => {
                info!(seq = completion.seq, "No recommendations for prompt");
                RequestState::Failed(Failure::new(FailureKind::NoMatches))
            }
            Err(e) => {
                error!(seq = completion.seq, error = %e, "Recommendation request failed");
                RequestState::Failed(Failure::new(FailureKind::Transport))
            }
        };

        &self.state
    }

    /// Submit and wait for the outcome.
    pub async fn submit(&mut self, prompt: &str) -> &RequestState {
        match self.begin(prompt) {
            Ok(pending) => {
                let completion = pending.send().await;
                self.resolve(completion)
            }
            Err(_) => &self.state,
        }
    }

    /// Abandon the in-flight request, if any, and return to Idle.
    pub fn cancel(&mut self) {
        if self.state.is_submitting() {
            info!(seq = self.seq, "Cancelling in-flight request");
            self.state = RequestState::Idle;
        }
    }
}
