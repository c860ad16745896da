//! Review records: the comment store the annotations hang off.
//!
//! Records live in an external review system; here they load from a JSON file
//! picked by the user and new records are appended in memory. File reads and
//! parsing run off-thread on the IO task pool.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::annotate::{AnnotationMode, EditSession, SnapshotHistory};
use crate::config::UpdateLastRecordsPathRequest;
use crate::persist;

use super::PlaybackPosition;

/// One review comment, possibly with an annotation payload attached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    /// Playback position the record was made at; records without one never
    /// participate in correlation
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Encoded annotation payload, absent when nothing was drawn. Earlier
    /// record files used the short key.
    #[serde(
        rename = "annotationPayload",
        alias = "annotation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub annotation: Option<String>,
}

impl ReviewRecord {
    pub fn has_drawing(&self) -> bool {
        self.annotation.as_deref().is_some_and(|a| !a.is_empty())
    }
}

#[derive(Resource, Default)]
pub struct RecordStore {
    pub records: Vec<ReviewRecord>,
    pub source_path: Option<PathBuf>,
}

/// Request to load records from a file (the UI runs the file dialog)
#[derive(Message)]
pub struct LoadRecordsRequest {
    pub path: PathBuf,
}

/// Request to commit the current shape set as a new record
#[derive(Message)]
pub struct SubmitAnnotationRequest;

struct LoadOutcome {
    path: PathBuf,
    records: Option<Vec<ReviewRecord>>,
    error: Option<String>,
}

#[derive(Component)]
pub struct LoadRecordsTask(Task<LoadOutcome>);

pub fn start_record_loads(
    mut commands: Commands,
    mut events: MessageReader<LoadRecordsRequest>,
) {
    for event in events.read() {
        let path = event.path.clone();
        let task_pool = IoTaskPool::get();
        let task = task_pool.spawn(async move {
            let json = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    return LoadOutcome {
                        path,
                        records: None,
                        error: Some(format!("Failed to read records file: {}", e)),
                    };
                }
            };

            match serde_json::from_str::<Vec<ReviewRecord>>(&json) {
                Ok(records) => LoadOutcome {
                    path,
                    records: Some(records),
                    error: None,
                },
                Err(e) => LoadOutcome {
                    path,
                    records: None,
                    error: Some(format!("Failed to parse records file: {}", e)),
                },
            }
        });

        commands.spawn(LoadRecordsTask(task));
    }
}

/// Poll pending loads; a malformed file leaves the store untouched
pub fn poll_record_loads(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadRecordsTask)>,
    mut store: ResMut<RecordStore>,
    mut config_events: MessageWriter<UpdateLastRecordsPathRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        if let Some(error) = outcome.error {
            warn!("{}", error);
            continue;
        }
        let Some(records) = outcome.records else {
            continue;
        };

        info!(count = records.len(), path = ?outcome.path, "records loaded");
        store.records = records;
        store.source_path = Some(outcome.path.clone());
        config_events.write(UpdateLastRecordsPathRequest { path: outcome.path });
    }
}

/// Turn the current draft into a new record at the playback position and
/// reset the session for the next one.
pub fn handle_submissions(
    mut events: MessageReader<SubmitAnnotationRequest>,
    mut store: ResMut<RecordStore>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
    position: Res<PlaybackPosition>,
) {
    for _ in events.read() {
        // Only a draft can be submitted; read-only displays already exist as
        // records
        if matches!(session.mode, AnnotationMode::Read { .. }) {
            continue;
        }

        let annotation = persist::encode(&session.shapes, None);
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            timestamp: Some(position.position),
            annotation,
        };
        info!(id = %record.id, timestamp = ?record.timestamp, "annotation submitted");
        store.records.push(record);

        session.clear();
        history.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_annotation_parses() {
        let json = format!(r#"{{"id": "{}", "timestamp": 12.5}}"#, Uuid::new_v4());
        let record: ReviewRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.timestamp, Some(12.5));
        assert!(!record.has_drawing());
    }

    #[test]
    fn test_record_without_timestamp_parses() {
        let json = format!(r#"{{"id": "{}"}}"#, Uuid::new_v4());
        let record: ReviewRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn test_annotation_key_omitted_when_absent() {
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            timestamp: Some(3.0),
            annotation: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("annotation"));
    }

    #[test]
    fn test_payload_field_uses_store_key() {
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            timestamp: Some(3.0),
            annotation: Some(r#"{"shapes":[]}"#.to_string()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"annotationPayload\""));
    }

    #[test]
    fn test_payload_field_accepts_short_key() {
        let json = format!(
            r#"{{"id": "{}", "timestamp": 1.0, "annotation": "{{}}"}}"#,
            Uuid::new_v4()
        );
        let record: ReviewRecord = serde_json::from_str(&json).unwrap();
        assert!(record.has_drawing());
    }

    #[test]
    fn test_empty_annotation_is_not_a_drawing() {
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            timestamp: Some(3.0),
            annotation: Some(String::new()),
        };
        assert!(!record.has_drawing());
    }
}
