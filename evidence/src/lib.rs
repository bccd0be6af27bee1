//! Resolution evidence validation.
//!
//! An evidence photo proves work happened at the reported location. The
//! coordinate must come from the image's own embedded metadata — device GPS
//! is a citizen-side convenience at submission time, never a fallback here,
//! because the photo itself is the auditable artifact.

pub mod extract;
pub mod validator;

pub use extract::{MetadataExtractor, NullExtractor, SidecarExtractor};
pub use validator::{EvidenceCheck, EvidenceError, EvidenceValidator};
