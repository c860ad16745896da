//! Time correlation between the playback clock and stored records.
//!
//! The engine decides which record's annotation (if any) should be on screen
//! for the current position. It reads the clock and never writes it on the
//! continuous path; only an explicit record jump seeks.

use bevy::prelude::*;
use uuid::Uuid;

use crate::annotate::{AnnotationMode, EditSession, SnapshotHistory};
use crate::config::AppConfig;
use crate::persist;

use super::records::{RecordStore, ReviewRecord};
use super::{PlaybackPosition, PlaybackState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaKind {
    /// Time-based media; positions are seconds
    Continuous { frame_rate: f64 },
    /// Item-based media; positions are indices
    Discrete,
}

/// Match window around a record timestamp.
///
/// Continuous media never matches tighter than one frame, and never tighter
/// than the configured floor; at typical frame rates the floor dominates.
pub fn tolerance(media: MediaKind, floor: f64) -> f64 {
    match media {
        MediaKind::Continuous { frame_rate } if frame_rate > 0.0 => floor.max(1.0 / frame_rate),
        MediaKind::Continuous { .. } => floor,
        MediaKind::Discrete => 0.0,
    }
}

fn in_window(position: f64, timestamp: f64, media: MediaKind, floor: f64) -> bool {
    match media {
        MediaKind::Continuous { .. } => {
            (position - timestamp).abs() <= tolerance(media, floor)
        }
        // Discrete positions compare as integer indices
        MediaKind::Discrete => position.round() == timestamp.round(),
    }
}

/// Pick the record whose annotation should display at `position`.
///
/// Only records with a drawing and a timestamp participate. When several
/// windows overlap, the previously matched record wins so the display does
/// not flicker between neighbors; otherwise the first match in store order.
pub fn find_match(
    position: f64,
    media: MediaKind,
    floor: f64,
    records: &[ReviewRecord],
    previous: Option<Uuid>,
) -> Option<&ReviewRecord> {
    let mut first = None;
    for record in records {
        if !record.has_drawing() {
            continue;
        }
        let Some(timestamp) = record.timestamp else {
            continue;
        };
        if !in_window(position, timestamp, media, floor) {
            continue;
        }
        if previous == Some(record.id) {
            return Some(record);
        }
        first.get_or_insert(record);
    }
    first
}

/// Correlation engine state between evaluations
#[derive(Resource, Default)]
pub struct CorrelationState {
    pub matched: Option<Uuid>,
    since_last_eval: f32,
}

/// Seek to a record and show its annotation immediately
#[derive(Message)]
pub struct JumpToRecordRequest {
    pub record: Uuid,
}

/// Throttled correlation pass over the record store.
pub fn correlate_playback(
    time: Res<Time>,
    position: Res<PlaybackPosition>,
    media: Res<super::MediaDescriptor>,
    store: Res<RecordStore>,
    config: Res<AppConfig>,
    mut state: ResMut<CorrelationState>,
    mut session: ResMut<EditSession>,
) {
    state.since_last_eval += time.delta_secs();
    if state.since_last_eval < config.data.correlation_interval {
        return;
    }
    state.since_last_eval = 0.0;

    // Authoring wins over playback: never clobber a draft
    if session.mode == AnnotationMode::Edit {
        return;
    }

    let matched = find_match(
        position.position,
        media.kind,
        config.data.tolerance_floor,
        &store.records,
        state.matched,
    );

    match matched {
        Some(record) => {
            state.matched = Some(record.id);
            // The display is the ground truth, not the hysteresis id: the
            // session may have dropped the annotation (draft started and
            // submitted) while the clock never left this window
            if session.mode == (AnnotationMode::Read { record: record.id }) {
                return;
            }
            let payload = record.annotation.as_deref().unwrap_or_default();
            let (shapes, _camera) = persist::decode(payload);
            debug!(record = %record.id, shapes = shapes.len(), "playback matched a record");
            session.show_read_only(shapes, record.id);
        }
        None => {
            state.matched = None;
            if matches!(session.mode, AnnotationMode::Read { .. }) {
                session.clear();
            }
        }
    }
}

/// An explicit record click seeks the clock and displays the annotation at
/// once, bypassing the throttle and the edit-mode suppression.
pub fn handle_record_jumps(
    mut events: MessageReader<JumpToRecordRequest>,
    store: Res<RecordStore>,
    mut position: ResMut<PlaybackPosition>,
    mut playback: ResMut<PlaybackState>,
    mut state: ResMut<CorrelationState>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
) {
    for event in events.read() {
        let Some(record) = store.records.iter().find(|r| r.id == event.record) else {
            warn!(record = %event.record, "jump to unknown record ignored");
            continue;
        };

        if let Some(timestamp) = record.timestamp {
            position.position = timestamp;
        }
        playback.playing = false;

        // An in-flight draft is dropped; the click is explicit user intent
        if session.mode == AnnotationMode::Edit {
            history.reset();
        }

        let payload = record.annotation.as_deref().unwrap_or_default();
        let (shapes, _camera) = persist::decode(payload);
        state.matched = Some(record.id);
        session.show_read_only(shapes, record.id);
    }
}
