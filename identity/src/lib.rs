//! Liveness/identity verification boundary.
//!
//! The engine never analyzes images itself. It asks an external classifier
//! "is there a live human face in this capture?" and treats the answer as one
//! of three things: a definitive yes, a definitive no, or a failure. Failures
//! are retryable; a definitive no is not. Retry policy and deadlines belong
//! to the caller, not to implementations of this trait.

pub mod remote;
pub mod verifier;

pub use remote::RemoteVerifier;
pub use verifier::{HumanCheck, IdentityError, IdentityVerifier, NullVerifier};
