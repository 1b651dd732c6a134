/// Prefix applied to every blueprint name derived from a file name.
pub const NAME_PREFIX: &str = "blueprint_";
/// Extension (without the dot) of blueprint files on disk.
pub const FILE_EXTENSION: &str = "blueprint";
/// Field delimiter inside record lines.
pub const FIELD_DELIMITER: char = ';';
/// Prefix of directive lines (`#Name`, `#Pieces`, ...).
pub const DIRECTIVE_MARKER: char = '#';

/// Format revision written by this build. Files without a `#Version`
/// directive are treated as revision 1.
pub const FORMAT_VERSION: u32 = 2;
pub const LEGACY_FORMAT_VERSION: u32 = 1;

/// Name prefix of terrain marker children inside a ghost preview.
pub const TERRAIN_MARKER_PREFIX: &str = "__terrain__";

/// Crafting station used when the configured one does not resolve.
pub const FALLBACK_STATION: &str = "piece_artisanstation";
/// Base item every synthesized crate is made from.
pub const BUILD_CRATE_ITEM: &str = "BuildCrate";
/// Tool item whose icon placeholders borrow.
pub const BUILD_TOOL_ITEM: &str = "Hammer";
pub const DEFAULT_CATEGORY: &str = "Misc";
pub const DEFAULT_STATION_LEVEL: f32 = 1.0;

pub const DEFAULT_BUILD_RATE_SECS: f32 = 0.5;
pub const DEFAULT_BUILD_DELAY_SECS: f32 = 1.0;
pub const DEFAULT_STEP_INCREMENT: f32 = 0.5;

/// Neighbour search radius of the capture flood fill (world units).
pub const CAPTURE_RADIUS: f32 = 5.0;
/// Hard cap on the number of pieces a single capture may collect.
pub const CAPTURE_LIMIT: usize = 1000;

/// Suffix the scene graph appends to instantiated copies of a prefab.
pub const CLONE_SUFFIX: &str = "(Clone)";
