//! The shared, read-only tileset bundle

use std::collections::HashMap;
use tessera_autotile::{MatchMode, WangIndex};
use tessera_core::{CoreError, Tileset};

/// A validated tileset with a prebuilt index per Wang set
#[derive(Debug)]
pub struct TilesetBundle {
    pub tileset: Tileset,
    indices: HashMap<String, WangIndex>,
}

impl TilesetBundle {
    pub fn new(tileset: Tileset, match_mode: MatchMode) -> Result<Self, CoreError> {
        tileset.validate()?;
        let mut indices = HashMap::new();
        for set in &tileset.wang_sets {
            let index = WangIndex::from_tileset(&tileset, &set.name)?.with_match_mode(match_mode);
            indices.insert(set.name.clone(), index);
        }
        Ok(Self { tileset, indices })
    }

    pub fn index(&self, wang_set: &str) -> Result<&WangIndex, CoreError> {
        self.indices
            .get(wang_set)
            .ok_or_else(|| CoreError::UnknownWangSet(wang_set.to_string()))
    }

    /// The set used to refresh cells: `preferred`, else the tileset's first
    pub fn refresh_index(&self, preferred: Option<&str>) -> Option<&WangIndex> {
        match preferred {
            Some(name) => self.indices.get(name),
            None => self
                .tileset
                .wang_sets
                .first()
                .and_then(|set| self.indices.get(&set.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::testing::main_tileset;

    #[test]
    fn test_bundle_indexes_every_set() {
        let bundle = TilesetBundle::new(main_tileset(), MatchMode::Strict).unwrap();
        assert!(bundle.index("COLLIDER").is_ok());
        assert!(bundle.index("Unnamed").is_ok());
        assert_eq!(
            bundle.index("Water").unwrap_err(),
            CoreError::UnknownWangSet("Water".to_string())
        );
        assert_eq!(bundle.refresh_index(None).unwrap().name(), "COLLIDER");
        assert_eq!(
            bundle.refresh_index(Some("Unnamed")).unwrap().name(),
            "Unnamed"
        );
    }

    #[test]
    fn test_duplicate_set_names_are_rejected() {
        let mut tileset = main_tileset();
        tileset.wang_sets[1].name = "COLLIDER".to_string();
        assert_eq!(
            TilesetBundle::new(tileset, MatchMode::Strict).unwrap_err(),
            CoreError::DuplicateWangSet("COLLIDER".to_string())
        );
    }
}
