//! The verification capability trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The classifier's verdict on a capture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanCheck {
    /// A face was located in the frame.
    pub face_detected: bool,
    /// The face belongs to a live human (not a photo of a photo, a screen,
    /// a drawing, an animal).
    pub is_human: bool,
    /// Free-text classifier rationale, when provided.
    #[serde(default)]
    pub detail: Option<String>,
}

/// The classifier could not produce a verdict. Distinguished from a
/// definitive negative [`HumanCheck`]: an error is retryable, a negative
/// verdict is not.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity classifier unavailable: {0}")]
    Unavailable(String),
}

/// An opaque, possibly slow, possibly failing remote classifier.
///
/// Implementations must not retry internally and must not enforce their own
/// deadline — the coordinator owns both.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Check whether `image` contains a live human face.
    async fn verify_human(&self, image: &[u8]) -> Result<HumanCheck, IdentityError>;
}

/// Deterministic verifier for tests and classifier-less deployments:
/// always returns the configured verdict.
pub struct NullVerifier {
    check: HumanCheck,
}

impl NullVerifier {
    pub fn accepting() -> Self {
        Self {
            check: HumanCheck {
                face_detected: true,
                is_human: true,
                detail: None,
            },
        }
    }

    pub fn rejecting() -> Self {
        Self {
            check: HumanCheck {
                face_detected: false,
                is_human: false,
                detail: Some("no face detected".into()),
            },
        }
    }

    pub fn returning(check: HumanCheck) -> Self {
        Self { check }
    }
}

#[async_trait]
impl IdentityVerifier for NullVerifier {
    async fn verify_human(&self, _image: &[u8]) -> Result<HumanCheck, IdentityError> {
        Ok(self.check.clone())
    }
}
