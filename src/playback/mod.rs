//! Playback clock and media description.
//!
//! The clock is the single source of truth for the playback position. The
//! correlation engine only ever reads it; seeking happens here, either from
//! the transport UI or from an explicit record jump.

pub mod correlate;
pub mod records;

pub use correlate::{JumpToRecordRequest, MediaKind};
pub use records::{LoadRecordsRequest, RecordStore, ReviewRecord, SubmitAnnotationRequest};

use bevy::prelude::*;

/// Current playback position, in seconds for continuous media and in item
/// index for discrete media
#[derive(Resource, Default)]
pub struct PlaybackPosition {
    pub position: f64,
}

#[derive(Resource, Default)]
pub struct PlaybackState {
    pub playing: bool,
}

/// What is being reviewed
#[derive(Resource)]
pub struct MediaDescriptor {
    pub kind: MediaKind,
    /// Seconds for continuous media, item count for discrete
    pub duration: f64,
}

impl Default for MediaDescriptor {
    fn default() -> Self {
        Self {
            kind: MediaKind::Continuous { frame_rate: 30.0 },
            duration: 60.0,
        }
    }
}

/// Advance the clock while playing. Discrete media has no self-advancing
/// clock; its position changes only through the transport or record jumps.
pub fn advance_clock(
    time: Res<Time>,
    state: Res<PlaybackState>,
    media: Res<MediaDescriptor>,
    mut position: ResMut<PlaybackPosition>,
) {
    if !state.playing {
        return;
    }
    if !matches!(media.kind, MediaKind::Continuous { .. }) {
        return;
    }
    position.position += time.delta_secs_f64();
    if media.duration > 0.0 && position.position >= media.duration {
        position.position %= media.duration;
    }
}

pub struct PlaybackPlugin;

impl Plugin for PlaybackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlaybackPosition>()
            .init_resource::<PlaybackState>()
            .init_resource::<MediaDescriptor>()
            .init_resource::<RecordStore>()
            .init_resource::<correlate::CorrelationState>()
            .add_message::<LoadRecordsRequest>()
            .add_message::<SubmitAnnotationRequest>()
            .add_message::<JumpToRecordRequest>()
            .add_systems(
                Update,
                (
                    advance_clock,
                    records::start_record_loads.run_if(on_message::<LoadRecordsRequest>),
                    records::poll_record_loads,
                    records::handle_submissions.run_if(on_message::<SubmitAnnotationRequest>),
                    correlate::handle_record_jumps,
                    correlate::correlate_playback,
                ),
            );
    }
}
