//! Commits a blueprint preview into solid, owned world pieces.
//!
//! Terrain edits always go out first. Pieces are then placed either in one
//! synchronous pass (atomic) or through a throttled `BuildJob` that places
//! them bottom-up. Pieces whose prefab no longer resolves are skipped.

use bevy::prelude::*;

use crate::catalog::PieceCatalog;
use crate::ghost::{clear_preview, BlueprintGhost, GhostState};
use crate::materialize::NetworkIdentity;
use crate::settings::{keys, SettingsStore};
use crate::types::{Requirement, TerrainOp};

use super::job::BuildJob;
use super::plan::{decode_preview, PlannedPiece};
use super::support::BuildInProgress;

// =============================================================================
// Events
// =============================================================================

/// Request to commit the current preview on behalf of `actor`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitBlueprint {
    pub actor: u64,
}

/// Ground deformation for the terrain collaborator.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TerrainEdit {
    pub op: TerrainOp,
    pub actor: u64,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct PiecePlaced {
    pub entity: Entity,
    pub prefab: String,
    pub actor: u64,
    /// Place effect to play; `None` when effects are disabled.
    pub effect: Option<String>,
}

/// Fired once per commit; `cost` is what the inventory layer should consume.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BlueprintCommitted {
    pub blueprint: String,
    pub actor: u64,
    pub cost: Vec<Requirement>,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct BuildFinished {
    pub job: u64,
    pub blueprint: String,
    pub placed: usize,
}

// =============================================================================
// Components and resources
// =============================================================================

/// A real, solid piece created by a commit.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlacedPiece {
    pub prefab: String,
    pub creator: u64,
    pub data: String,
}

/// In-flight throttled builds.
#[derive(Resource, Debug, Default)]
pub struct BuildQueue {
    jobs: Vec<BuildJob>,
    next_id: u64,
}

impl BuildQueue {
    fn push(&mut self, mut job: BuildJob) -> u64 {
        self.next_id += 1;
        job.id = self.next_id;
        job.start();
        self.jobs.push(job);
        self.next_id
    }

    pub fn jobs(&self) -> &[BuildJob] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Stop a job after the piece currently being placed.
    pub fn cancel(&mut self, job: u64) -> bool {
        match self.jobs.iter_mut().find(|j| j.id == job) {
            Some(job) => {
                job.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for job in &mut self.jobs {
            job.cancel();
        }
    }

    pub(crate) fn clear(&mut self) {
        self.jobs.clear();
    }
}

/// Commit requests collected from `CommitBlueprint` events.
#[derive(Resource, Debug, Default)]
pub(crate) struct PendingCommits(pub(crate) Vec<u64>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Atomic { placed: usize },
    Queued { job: u64 },
}

// =============================================================================
// Commit
// =============================================================================

/// Commit the preview rooted at `root`. The preview is consumed.
pub fn commit(world: &mut World, root: Entity, actor: u64) -> Option<CommitOutcome> {
    let Some(blueprint) = world.get::<BlueprintGhost>(root).map(|g| g.blueprint.clone()) else {
        warn!("Commit requested on {root:?}, which is not a blueprint preview");
        return None;
    };
    let plan = decode_preview(world, root);
    if plan.is_empty() {
        warn!("Commit requested for {blueprint} but the preview is empty");
        return None;
    }

    let cost = world
        .resource::<PieceCatalog>()
        .resolve(&blueprint)
        .map(|e| e.resources.clone())
        .unwrap_or_default();
    world.send_event(BlueprintCommitted {
        blueprint: blueprint.clone(),
        actor,
        cost,
    });

    for op in plan.terrain {
        world.send_event(TerrainEdit { op, actor });
    }

    let (slow, delay, rate) = {
        let store = world.resource::<SettingsStore>();
        (
            store.bool(&keys::slow_build()),
            store.float(&keys::build_delay()),
            store.float(&keys::build_rate()),
        )
    };

    if world.resource::<GhostState>().root() == Some(root) {
        clear_preview(world);
    } else if world.get_entity(root).is_ok() {
        world.entity_mut(root).despawn_recursive();
    }

    let outcome = if slow {
        let job = BuildJob::new(0, actor, blueprint.clone(), plan.pieces, delay, rate);
        world.resource_mut::<BuildInProgress>().0 = true;
        let id = world.resource_mut::<BuildQueue>().push(job);
        CommitOutcome::Queued { job: id }
    } else {
        world.resource_mut::<BuildInProgress>().0 = true;
        let placed = plan
            .pieces
            .iter()
            .filter_map(|piece| place_piece(world, piece, actor))
            .count();
        let still_building = !world.resource::<BuildQueue>().is_empty();
        world.resource_mut::<BuildInProgress>().0 = still_building;
        CommitOutcome::Atomic { placed }
    };
    info!("Committed {blueprint} for actor {actor}: {outcome:?}");
    Some(outcome)
}

/// Spawn one solid piece, or skip it if its prefab no longer resolves.
pub fn place_piece(world: &mut World, piece: &PlannedPiece, actor: u64) -> Option<Entity> {
    let Some(entry) = world.resource::<PieceCatalog>().resolve(&piece.prefab) else {
        debug!("Skipping unknown prefab '{}'", piece.prefab);
        return None;
    };
    let effect = if world
        .resource::<SettingsStore>()
        .bool(&keys::place_effects())
    {
        entry.place_effect.clone()
    } else {
        None
    };

    let entity = world
        .spawn((
            Name::new(piece.prefab.clone()),
            PlacedPiece {
                prefab: piece.prefab.clone(),
                creator: actor,
                data: piece.data.clone(),
            },
            NetworkIdentity { persistent: true },
            piece.transform,
            Visibility::default(),
        ))
        .id();
    world.send_event(PiecePlaced {
        entity,
        prefab: piece.prefab.clone(),
        actor,
        effect,
    });
    Some(entity)
}

/// Advance every throttled build by `dt` seconds.
pub fn advance_build_jobs(world: &mut World, dt: f32) {
    world.resource_scope(|world, mut queue: Mut<BuildQueue>| {
        for job in &mut queue.jobs {
            let actor = job.actor;
            job.advance(dt, |piece| place_piece(world, piece, actor).is_some());
        }

        let (finished, running): (Vec<BuildJob>, Vec<BuildJob>) =
            std::mem::take(&mut queue.jobs)
                .into_iter()
                .partition(BuildJob::is_done);
        queue.jobs = running;

        for job in finished {
            info!(
                "Build {} of {} finished: {} piece(s)",
                job.id,
                job.blueprint,
                job.placed()
            );
            world.send_event(BuildFinished {
                job: job.id,
                blueprint: job.blueprint.clone(),
                placed: job.placed(),
            });
        }
        world.resource_mut::<BuildInProgress>().0 = !queue.jobs.is_empty();
    });
}

// =============================================================================
// Systems
// =============================================================================

pub(crate) fn detect_commit_requests(
    mut events: EventReader<CommitBlueprint>,
    mut pending: ResMut<PendingCommits>,
) {
    for request in events.read() {
        pending.0.push(request.actor);
    }
}

pub(crate) fn process_commit_requests(world: &mut World) {
    let requests = std::mem::take(&mut world.resource_mut::<PendingCommits>().0);
    for actor in requests {
        match world.resource::<GhostState>().root() {
            Some(root) => {
                commit(world, root, actor);
            }
            None => warn!("Commit requested by {actor} with nothing selected"),
        }
    }
}

pub(crate) fn tick_build_jobs(world: &mut World) {
    let dt = world.resource::<Time>().delta_secs();
    advance_build_jobs(world, dt);
}
