use bevy::prelude::*;

/// Set while any multi-piece build is still assembling itself.
///
/// Support validation reads it: a half-built structure has pieces whose
/// supports do not exist yet, and those must not collapse.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildInProgress(pub bool);

impl BuildInProgress {
    pub fn is_building(&self) -> bool {
        self.0
    }
}

/// Result of a support check with the build-in-progress override applied.
pub fn support_override(has_support: bool, flag: &BuildInProgress) -> bool {
    has_support || flag.is_building()
}
