//! Blueprint data model.
//!
//! A `Blueprint` is one template parsed from a `.blueprint` file: free-text
//! metadata, the ordered piece list, terrain edits and snap points. Positions
//! are local offsets from the template origin.

use bevy::prelude::*;

use crate::config::{FILE_EXTENSION, LEGACY_FORMAT_VERSION, NAME_PREFIX, TERRAIN_MARKER_PREFIX};

// =============================================================================
// Blueprint
// =============================================================================

/// A named, reusable multi-piece structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    name: String,
    /// File the template was parsed from (`house.blueprint`).
    pub file_name: String,
    pub format_version: u32,
    pub creator: String,
    pub description: String,
    pub center: String,
    /// Capture-time reference frame. Informational only.
    pub coordinates: Vec3,
    pub rotation: Vec3,
    pub pieces: Vec<PlanPiece>,
    pub snap_points: Vec<SnapPoint>,
    pub terrain: Vec<TerrainOp>,
    /// Merged cost cached at registration time.
    pub requirements: Vec<Requirement>,
    registered: bool,
    placeholder: Option<Entity>,
}

impl Blueprint {
    /// Create an empty template whose name is derived from `file_name`.
    pub fn new(file_name: &str) -> Self {
        Self {
            name: name_from_file(file_name),
            file_name: file_name.to_string(),
            format_version: LEGACY_FORMAT_VERSION,
            creator: String::new(),
            description: String::new(),
            center: String::new(),
            coordinates: Vec3::ZERO,
            rotation: Vec3::ZERO,
            pieces: Vec::new(),
            snap_points: Vec::new(),
            terrain: Vec::new(),
            requirements: Vec::new(),
            registered: false,
            placeholder: None,
        }
    }

    /// Registry key, e.g. `blueprint_house`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the namespace prefix, used as the settings group.
    pub fn base_name(&self) -> &str {
        self.name.strip_prefix(NAME_PREFIX).unwrap_or(&self.name)
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Scene-graph placeholder created by the materializer, if any.
    pub fn placeholder(&self) -> Option<Entity> {
        self.placeholder
    }

    pub(crate) fn mark_registered(&mut self, placeholder: Entity) {
        self.registered = true;
        self.placeholder = Some(placeholder);
    }

    pub(crate) fn clear_registration(&mut self) {
        self.registered = false;
        self.placeholder = None;
    }
}

/// `house.blueprint` -> `blueprint_house`.
pub fn name_from_file(file_name: &str) -> String {
    let base = file_name
        .strip_suffix(FILE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(file_name);
    format!("{NAME_PREFIX}{base}")
}

// =============================================================================
// Records
// =============================================================================

/// One structural element of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPiece {
    /// Catalog prefab id, resolved lazily.
    pub prefab: String,
    pub category: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Opaque per-piece payload passed through verbatim.
    pub data: String,
}

impl PlanPiece {
    pub fn new(prefab: impl Into<String>, position: Vec3) -> Self {
        Self {
            prefab: prefab.into(),
            category: String::new(),
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            data: String::new(),
        }
    }

    pub fn local_transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainShape {
    Circle,
    Square,
}

impl TerrainShape {
    /// `circle` (any case) is a circle; every other token is a square.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("circle") {
            TerrainShape::Circle
        } else {
            TerrainShape::Square
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            TerrainShape::Circle => "circle",
            TerrainShape::Square => "square",
        }
    }
}

/// One ground-deformation instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainOp {
    pub shape: TerrainShape,
    pub position: Vec3,
    pub radius: f32,
    pub rotation_degrees: i32,
    pub smooth_radius: f32,
    /// Paint identifier; `None` leaves the ground texture alone.
    pub paint: Option<String>,
}

impl TerrainOp {
    /// Identity of the preview marker for this op. Position travels in the
    /// marker's transform, everything else in its name.
    pub fn marker_name(&self) -> String {
        format!(
            "{TERRAIN_MARKER_PREFIX};{};{};{};{};{}",
            self.shape.token(),
            self.radius,
            self.rotation_degrees,
            self.smooth_radius,
            self.paint.as_deref().unwrap_or("")
        )
    }

    pub fn is_marker_name(name: &str) -> bool {
        name.starts_with(TERRAIN_MARKER_PREFIX)
    }

    /// Rebuild an op from a marker name and the marker's world position.
    pub fn from_marker(name: &str, position: Vec3) -> Option<Self> {
        let rest = name.strip_prefix(TERRAIN_MARKER_PREFIX)?;
        let mut fields = rest.trim_start_matches(';').split(';');
        let shape = TerrainShape::from_token(fields.next().unwrap_or_default());
        let radius = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0.0);
        let rotation_degrees = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
        let smooth_radius = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0.0);
        let paint = fields
            .next()
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Some(Self {
            shape,
            position,
            radius,
            rotation_degrees,
            smooth_radius,
            paint,
        })
    }
}

/// Named alignment anchor. Only shown in the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    pub name: String,
    pub position: Vec3,
}

/// `amount` of `item`, merged across a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub item: String,
    pub amount: u32,
}

impl Requirement {
    pub fn new(item: impl Into<String>, amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
        }
    }
}
