//! World-session lifecycle.
//!
//! All blueprint state is scoped to one session: placeholders exist only
//! while a world is loaded, and ending the session tears every one of them
//! down so the next session registers from scratch.

use bevy::prelude::*;

use crate::build::{BuildInProgress, BuildQueue};
use crate::catalog::PieceCatalog;
use crate::ghost::clear_preview;
use crate::materialize::teardown_placeholder;
use crate::registry::{register_all, BlueprintRegistry};

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct StartWorldSession;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct EndWorldSession;

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    active: bool,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionTransition {
    Start,
    End,
}

#[derive(Resource, Debug, Default)]
pub(crate) struct PendingSessionTransitions(pub(crate) Vec<SessionTransition>);

pub(crate) fn detect_session_events(
    mut starts: EventReader<StartWorldSession>,
    mut ends: EventReader<EndWorldSession>,
    mut pending: ResMut<PendingSessionTransitions>,
) {
    // End first: a start in the same frame wins.
    for _ in ends.read() {
        pending.0.push(SessionTransition::End);
    }
    for _ in starts.read() {
        pending.0.push(SessionTransition::Start);
    }
}

pub(crate) fn apply_session_transitions(world: &mut World) {
    let transitions = std::mem::take(&mut world.resource_mut::<PendingSessionTransitions>().0);
    for transition in transitions {
        match transition {
            SessionTransition::Start => start_session(world),
            SessionTransition::End => end_session(world),
        }
    }
}

pub fn start_session(world: &mut World) {
    world.resource_mut::<SessionState>().active = true;
    let count = register_all(world);
    info!("World session started, {count} blueprint(s) registered");
}

pub fn end_session(world: &mut World) {
    if !world.resource::<SessionState>().is_active() {
        return;
    }
    for name in world.resource::<PieceCatalog>().placeholder_names() {
        teardown_placeholder(world, &name);
    }
    world.resource_mut::<BuildQueue>().clear();
    world.resource_mut::<BuildInProgress>().0 = false;
    world.resource_mut::<BlueprintRegistry>().reset_registration();
    clear_preview(world);
    world.resource_mut::<SessionState>().active = false;
    info!("World session ended");
}

/// Registers blueprints added since the last frame (captures, file watch).
pub(crate) fn register_pending(world: &mut World) {
    if world.resource::<SessionState>().is_active() {
        register_all(world);
    }
}
