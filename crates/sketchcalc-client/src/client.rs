//! HTTP client for the recognition service.
//!
//! Requests run on a background thread so the drawing loop never blocks;
//! outcomes come back as [`RecognitionEvent`]s drained with
//! [`RecognitionClient::poll`].

use crate::config::ClientConfig;
use crate::encode::EncodeError;
use crate::protocol::{CalculateRequest, CalculateResponse};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] EncodeError),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Server returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Outcome of a background request.
#[derive(Debug)]
pub enum RecognitionEvent {
    /// The service answered with a decodable body (any `status`).
    Completed {
        request_id: u64,
        response: CalculateResponse,
    },
    /// The request could not be completed.
    Failed { request_id: u64, error: ClientError },
}

impl RecognitionEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            RecognitionEvent::Completed { request_id, .. } => *request_id,
            RecognitionEvent::Failed { request_id, .. } => *request_id,
        }
    }
}

/// Send one request and wait for the answer.
fn post_calculate(
    agent: &ureq::Agent,
    url: &str,
    request: &CalculateRequest,
) -> ClientResult<CalculateResponse> {
    let response = match agent.post(url).send_json(request) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            return Err(ClientError::Status { code, body });
        }
        Err(ureq::Error::Transport(transport)) => {
            return Err(ClientError::Transport(transport.to_string()));
        }
    };

    response
        .into_json::<CalculateResponse>()
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Recognition service client.
pub struct RecognitionClient {
    config: ClientConfig,
    agent: ureq::Agent,
    /// Id handed to the next submission.
    next_request_id: u64,
    /// Cloned into each worker thread.
    event_tx: Sender<RecognitionEvent>,
    event_rx: Receiver<RecognitionEvent>,
}

impl RecognitionClient {
    pub fn new(config: ClientConfig) -> Self {
        let (event_tx, event_rx) = channel();
        Self {
            config,
            agent: ureq::AgentBuilder::new().build(),
            next_request_id: 1,
            event_tx,
            event_rx,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Blocking call to `POST /calculate`.
    pub fn calculate(&self, request: &CalculateRequest) -> ClientResult<CalculateResponse> {
        post_calculate(&self.agent, &self.config.calculate_url(), request)
    }

    /// Start a request on a background thread and return its id.
    pub fn submit(&mut self, request: CalculateRequest) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let agent = self.agent.clone();
        let url = self.config.calculate_url();
        let event_tx = self.event_tx.clone();

        log::info!("Submitting request {} to {}", request_id, url);
        thread::spawn(move || {
            let event = match post_calculate(&agent, &url, &request) {
                Ok(response) => RecognitionEvent::Completed { request_id, response },
                Err(error) => RecognitionEvent::Failed { request_id, error },
            };
            if event_tx.send(event).is_err() {
                log::debug!("Client dropped before request {} finished", request_id);
            }
        });

        request_id
    }

    /// Poll for finished requests (non-blocking).
    pub fn poll(&mut self) -> Vec<RecognitionEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Block until the next request finishes.
    pub fn wait(&mut self) -> Option<RecognitionEvent> {
        self.event_rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Variables;

    fn unreachable() -> RecognitionClient {
        RecognitionClient::new(ClientConfig::default().with_api_url("http://127.0.0.1:9"))
    }

    fn request() -> CalculateRequest {
        CalculateRequest {
            image: "data:image/jpeg;base64,".to_string(),
            dict_of_vars: Variables::new(),
        }
    }

    #[test]
    fn test_unreachable_service_fails() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = unreachable();
        assert!(matches!(client.calculate(&request()), Err(ClientError::Transport(_))));
    }

    #[test]
    fn test_submit_reports_failure_event() {
        let mut client = unreachable();
        let first = client.submit(request());
        let second = client.submit(request());
        assert_eq!(second, first + 1);

        let mut ids = vec![
            client.wait().unwrap().request_id(),
            client.wait().unwrap().request_id(),
        ];
        ids.sort();
        assert_eq!(ids, vec![first, second]);
        assert!(client.poll().is_empty());
    }
}
