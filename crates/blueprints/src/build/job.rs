//! Throttled build as an explicit state machine.
//!
//! `Idle -> Running -> Done`. The queue is owned by the job and sorted by
//! ascending height (stable), so lower pieces exist before the ones they
//! support. `advance` is fed elapsed seconds and hands each due piece to a
//! placement callback.

use std::collections::VecDeque;

use super::plan::PlannedPiece;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuildJobState {
    Idle,
    /// Seconds until the next piece is due.
    Running { until_next: f32 },
    Done,
}

#[derive(Debug, Clone)]
pub struct BuildJob {
    pub id: u64,
    pub actor: u64,
    pub blueprint: String,
    queue: VecDeque<PlannedPiece>,
    state: BuildJobState,
    delay: f32,
    rate: f32,
    placed: usize,
}

impl BuildJob {
    pub fn new(
        id: u64,
        actor: u64,
        blueprint: impl Into<String>,
        mut pieces: Vec<PlannedPiece>,
        delay: f32,
        rate: f32,
    ) -> Self {
        pieces.sort_by(|a, b| a.transform.translation.y.total_cmp(&b.transform.translation.y));
        Self {
            id,
            actor,
            blueprint: blueprint.into(),
            queue: pieces.into(),
            state: BuildJobState::Idle,
            delay: delay.max(0.0),
            rate: rate.max(0.0),
            placed: 0,
        }
    }

    pub fn state(&self) -> BuildJobState {
        self.state
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Pieces actually placed so far; rejected pieces are not counted.
    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn is_done(&self) -> bool {
        self.state == BuildJobState::Done
    }

    /// First piece becomes due after the initial delay.
    pub fn start(&mut self) {
        if self.state != BuildJobState::Idle {
            return;
        }
        self.state = if self.queue.is_empty() {
            BuildJobState::Done
        } else {
            BuildJobState::Running {
                until_next: self.delay,
            }
        };
    }

    /// Advance by `dt` seconds. `place` is called with every piece that
    /// becomes due and reports whether it was actually placed. A piece it
    /// rejects is dropped without using up a `rate` interval. Returns how
    /// many pieces were placed during this step.
    pub fn advance(&mut self, dt: f32, mut place: impl FnMut(&PlannedPiece) -> bool) -> usize {
        if self.state == BuildJobState::Idle {
            self.start();
        }
        let BuildJobState::Running { mut until_next } = self.state else {
            return 0;
        };

        let mut placed_now = 0;
        until_next -= dt;
        while until_next <= 0.0 {
            let Some(piece) = self.queue.pop_front() else {
                break;
            };
            if !place(&piece) {
                continue;
            }
            placed_now += 1;
            self.placed += 1;
            if self.queue.is_empty() {
                break;
            }
            until_next += self.rate;
        }

        self.state = if self.queue.is_empty() {
            BuildJobState::Done
        } else {
            BuildJobState::Running { until_next }
        };
        placed_now
    }

    /// Drop everything not yet placed.
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.state = BuildJobState::Done;
    }
}
