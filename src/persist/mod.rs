//! Serialization of annotation payloads.

pub mod envelope;

pub use envelope::{decode, encode, AnnotationEnvelope, CameraPose};
