//! The wire envelope stored on review records.
//!
//! A record's annotation payload is a JSON object carrying the shape set and,
//! optionally, a camera pose captured at authoring time. Older records stored
//! a bare shape array; decoding accepts both.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::annotate::ShapeSet;

/// Camera pose captured alongside an annotation, echoed back verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPose {
    pub position: [f64; 3],
    pub target: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationEnvelope {
    pub shapes: ShapeSet,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub camera: Option<CameraPose>,
}

/// Encode a shape set for storage. An empty set encodes to nothing at all, so
/// records with no drawing carry no payload.
pub fn encode(shapes: &ShapeSet, camera: Option<&CameraPose>) -> Option<String> {
    if shapes.is_empty() {
        return None;
    }
    let envelope = AnnotationEnvelope {
        shapes: shapes.clone(),
        camera: camera.cloned(),
    };
    match serde_json::to_string(&envelope) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize annotation payload: {}", e);
            None
        }
    }
}

/// Decode a stored payload. Accepts the envelope form and the legacy bare
/// shape array. Unparseable input decodes to an empty set rather than
/// failing the caller.
pub fn decode(payload: &str) -> (ShapeSet, Option<CameraPose>) {
    if let Ok(envelope) = serde_json::from_str::<AnnotationEnvelope>(payload) {
        return (envelope.shapes, envelope.camera);
    }
    if let Ok(shapes) = serde_json::from_str::<ShapeSet>(payload) {
        return (shapes, None);
    }
    debug!("Unparseable annotation payload ({} bytes), treating as empty", payload.len());
    (ShapeSet::new(), None)
}
