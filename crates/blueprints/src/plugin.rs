//! Bevy plugin registration and per-frame ordering.

use bevy::prelude::*;

use crate::build::{
    detect_commit_requests, process_commit_requests, tick_build_jobs, BlueprintCommitted,
    BuildFinished, BuildInProgress, BuildQueue, CommitBlueprint, PendingCommits, PiecePlaced,
    TerrainEdit,
};
use crate::capture::{handle_capture_requests, BlueprintCaptured, CaptureBlueprint};
use crate::catalog::PieceCatalog;
use crate::distribution::{
    apply_remote_payload, detect_remote_payload, publish_blueprint_files, sync_host_role,
    HostRole, PendingRemotePayload, RawBlueprintFiles,
};
use crate::ghost::{step_ghost_preview, sync_ghost_preview, GhostOffset, GhostState};
use crate::materialize::apply_placeholder_settings;
use crate::registry::BlueprintRegistry;
use crate::selection::PlacementTable;
use crate::session::{
    apply_session_transitions, detect_session_events, register_pending, EndWorldSession,
    PendingSessionTransitions, SessionState, StartWorldSession,
};
use crate::settings::{flush_setting_changes, register_default_settings, SettingChanged, SettingsStore};

/// Ordered phases of the blueprint pipeline in `Update`.
///
/// Configured as a chain: `Input` → `Lifecycle` → `Preview` → `Build` → `Notify`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlueprintSet {
    /// Lightweight event readers that queue work for the exclusive phases.
    Input,
    /// Session start/end, follower sync, captures, pending registration.
    Lifecycle,
    /// Ghost state machine and step keys.
    Preview,
    /// Commits and throttled build jobs.
    Build,
    /// Publishing, setting change events and their subscribers.
    Notify,
}

pub struct BlueprintsPlugin;

impl Plugin for BlueprintsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SettingsStore>()
            .init_resource::<PieceCatalog>()
            .init_resource::<PlacementTable>()
            .init_resource::<BlueprintRegistry>()
            .init_resource::<RawBlueprintFiles>()
            .init_resource::<HostRole>()
            .init_resource::<SessionState>()
            .init_resource::<GhostState>()
            .init_resource::<GhostOffset>()
            .init_resource::<BuildQueue>()
            .init_resource::<BuildInProgress>()
            .init_resource::<PendingCommits>()
            .init_resource::<PendingRemotePayload>()
            .init_resource::<PendingSessionTransitions>()
            .add_event::<SettingChanged>()
            .add_event::<StartWorldSession>()
            .add_event::<EndWorldSession>()
            .add_event::<CommitBlueprint>()
            .add_event::<TerrainEdit>()
            .add_event::<PiecePlaced>()
            .add_event::<BlueprintCommitted>()
            .add_event::<BuildFinished>()
            .add_event::<CaptureBlueprint>()
            .add_event::<BlueprintCaptured>();

        register_default_settings(&mut app.world_mut().resource_mut::<SettingsStore>());

        app.configure_sets(
            Update,
            (
                BlueprintSet::Input,
                BlueprintSet::Lifecycle,
                BlueprintSet::Preview,
                BlueprintSet::Build,
                BlueprintSet::Notify,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                sync_host_role,
                detect_session_events,
                detect_commit_requests,
                detect_remote_payload,
            )
                .in_set(BlueprintSet::Input),
        )
        .add_systems(
            Update,
            (
                apply_session_transitions,
                apply_remote_payload,
                handle_capture_requests,
                register_pending,
            )
                .chain()
                .in_set(BlueprintSet::Lifecycle),
        )
        .add_systems(
            Update,
            (sync_ghost_preview, step_ghost_preview)
                .chain()
                .in_set(BlueprintSet::Preview),
        )
        .add_systems(
            Update,
            (process_commit_requests, tick_build_jobs)
                .chain()
                .in_set(BlueprintSet::Build),
        )
        .add_systems(
            Update,
            (
                publish_blueprint_files,
                flush_setting_changes,
                apply_placeholder_settings,
            )
                .chain()
                .in_set(BlueprintSet::Notify),
        );
    }
}
