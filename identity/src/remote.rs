//! HTTP client for a remote liveness classifier.

use crate::verifier::{HumanCheck, IdentityError, IdentityVerifier};
use async_trait::async_trait;
use tracing::debug;

/// Calls a classifier service over HTTP.
///
/// The service receives the raw capture bytes via POST and answers
/// `{"face_detected": bool, "is_human": bool, "detail": string?}`.
pub struct RemoteVerifier {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteVerifier {
    /// Create a client for the given classifier endpoint.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for RemoteVerifier {
    async fn verify_human(&self, image: &[u8]) -> Result<HumanCheck, IdentityError> {
        let response = self
            .client
            .post(format!("{}/verify", self.endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Unavailable(format!(
                "classifier returned HTTP {}",
                response.status()
            )));
        }

        let check: HumanCheck = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("malformed classifier reply: {e}")))?;

        debug!(
            face_detected = check.face_detected,
            is_human = check.is_human,
            "classifier verdict"
        );
        Ok(check)
    }
}
