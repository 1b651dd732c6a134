//! Placement table: the builder's list of selectable pieces and the
//! current selection.

use bevy::prelude::*;

use crate::catalog::PieceCatalog;

#[derive(Resource, Debug, Default, Clone)]
pub struct PlacementTable {
    pieces: Vec<String>,
    selected: Option<usize>,
}

impl PlacementTable {
    /// Append a piece; adding a name twice is a no-op.
    pub fn add(&mut self, piece: impl Into<String>) {
        let piece = piece.into();
        if !self.pieces.contains(&piece) {
            self.pieces.push(piece);
        }
    }

    /// Remove a piece. Clears the selection if it pointed at it.
    pub fn remove(&mut self, piece: &str) -> bool {
        let Some(index) = self.pieces.iter().position(|p| p == piece) else {
            return false;
        };
        self.pieces.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        true
    }

    pub fn contains(&self, piece: &str) -> bool {
        self.pieces.iter().any(|p| p == piece)
    }

    pub fn pieces(&self) -> &[String] {
        &self.pieces
    }

    pub fn select(&mut self, piece: &str) -> bool {
        match self.pieces.iter().position(|p| p == piece) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected_piece(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.pieces.get(i))
            .map(String::as_str)
    }
}

/// What the placement table currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    /// A blueprint placeholder; carries the blueprint name.
    Blueprint(String),
    /// Any other catalog piece.
    OrdinaryPiece(String),
    None,
}

pub fn resolve_selection(table: &PlacementTable, catalog: &PieceCatalog) -> Selected {
    let Some(piece) = table.selected_piece() else {
        return Selected::None;
    };
    match catalog.resolve(piece).and_then(|e| e.blueprint.clone()) {
        Some(blueprint) => Selected::Blueprint(blueprint),
        None => Selected::OrdinaryPiece(piece.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceCatalogEntry;

    #[test]
    fn test_remove_shifts_selection() {
        let mut table = PlacementTable::default();
        table.add("a");
        table.add("b");
        table.add("c");
        table.add("c");
        assert_eq!(table.pieces().len(), 3);

        assert!(table.select("c"));
        assert!(table.remove("a"));
        assert_eq!(table.selected_piece(), Some("c"));
        assert!(table.remove("c"));
        assert_eq!(table.selected_piece(), None);
        assert!(!table.remove("zzz"));
    }

    #[test]
    fn test_resolve_selection_variants() {
        let mut catalog = PieceCatalog::default();
        catalog.register_piece(PieceCatalogEntry::new("wood_wall", vec![]));
        let mut placeholder = PieceCatalogEntry::new("blueprint_house", vec![]);
        placeholder.blueprint = Some("blueprint_house".into());
        catalog.register_piece(placeholder);

        let mut table = PlacementTable::default();
        table.add("wood_wall");
        table.add("blueprint_house");
        assert_eq!(resolve_selection(&table, &catalog), Selected::None);

        table.select("wood_wall");
        assert_eq!(
            resolve_selection(&table, &catalog),
            Selected::OrdinaryPiece("wood_wall".into())
        );

        table.select("blueprint_house");
        assert_eq!(
            resolve_selection(&table, &catalog),
            Selected::Blueprint("blueprint_house".into())
        );

        table.deselect();
        assert_eq!(resolve_selection(&table, &catalog), Selected::None);
    }
}
