//! Wang tile resolver
//!
//! `WangIndex` pre-indexes one Wang set so that a cell's neighbor signature can
//! be turned into a ranked candidate list without scanning the whole set:
//! - fully concrete signatures are a single hash lookup on the masked WangId
//! - partial signatures filter the shortest `(slot, color)` posting list
//! - signatures with no concrete slot return every member tile
//!
//! Ranking is total and deterministic: concretely matched slots descending,
//! tile probability descending (absent = 1.0), tile id ascending.

use crate::config::VariantPolicy;
use crate::AutotileError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tessera_core::{CoreError, Tileset, WangColorIndex, WangId, WangSet, WangSetType};

/// Neighbor color pattern of one cell
///
/// Same slot order as `WangId`. `None` is "don't care": the neighbor is outside
/// the grid or has no terrain assignment.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Signature(pub [Option<WangColorIndex>; 8]);

impl Signature {
    pub const ANY: Self = Signature([None; 8]);

    pub const fn new(slots: [Option<WangColorIndex>; 8]) -> Self {
        Signature(slots)
    }

    /// Signature with every slot concrete
    pub fn from_wang_id(wang_id: WangId) -> Self {
        Signature(wang_id.0.map(Some))
    }

    pub fn get(&self, slot: usize) -> Option<WangColorIndex> {
        self.0.get(slot).copied().flatten()
    }

    pub fn set(&mut self, slot: usize, color: Option<WangColorIndex>) {
        if slot < WangId::SLOTS {
            self.0[slot] = color;
        }
    }

    /// Concrete `(slot, color)` pairs among the slots `set_type` uses
    pub fn concrete_slots(
        &self,
        set_type: WangSetType,
    ) -> impl Iterator<Item = (usize, WangColorIndex)> + '_ {
        set_type
            .meaningful_slots()
            .filter_map(move |slot| self.0[slot].map(|color| (slot, color)))
    }

    /// Whether `wang_id` satisfies every concrete meaningful slot
    pub fn matches(&self, wang_id: &WangId, set_type: WangSetType, mode: MatchMode) -> bool {
        self.concrete_slots(set_type).all(|(slot, color)| {
            let actual = wang_id.get(slot);
            actual == color || (mode == MatchMode::ZeroIsWildcard && actual == 0)
        })
    }

    /// Number of concrete slots the tile matches with an actual color
    fn score(&self, wang_id: &WangId, set_type: WangSetType, mode: MatchMode) -> usize {
        self.concrete_slots(set_type)
            .filter(|&(slot, _)| mode == MatchMode::Strict || wang_id.get(slot) != 0)
            .count()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match slot {
                Some(color) => write!(f, "{color}")?,
                None => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

/// How tile-side color 0 is compared against a concrete signature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every concrete slot must equal the tile's color
    #[default]
    Strict,
    /// A tile color of 0 accepts any neighbor color (Tiled's lenient matching).
    /// Ranking then prefers tiles that match more slots with a real color.
    ZeroIsWildcard,
}

/// A tile that satisfies a signature, with its ranking keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub tile: u32,
    /// Concretely matched slots
    pub score: usize,
    pub probability: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    wang_id: WangId,
    probability: f32,
}

/// Pre-indexed Wang set
#[derive(Debug, Clone)]
pub struct WangIndex {
    name: String,
    set_type: WangSetType,
    color_count: usize,
    mode: MatchMode,
    /// Member tiles by id, WangIds masked to the set type
    tiles: BTreeMap<u32, Entry>,
    exact: HashMap<WangId, Vec<u32>>,
    postings: HashMap<(usize, WangColorIndex), Vec<u32>>,
    blank: Option<u32>,
}

impl WangIndex {
    /// Index a Wang set; every tile weighs 1.0
    pub fn new(wang_set: &WangSet) -> Self {
        let set_type = wang_set.set_type;
        let mut tiles = BTreeMap::new();
        let mut exact: HashMap<WangId, Vec<u32>> = HashMap::new();
        let mut postings: HashMap<(usize, WangColorIndex), Vec<u32>> = HashMap::new();

        // BTreeMap iteration keeps every list sorted by tile id
        for (&tile, wang_id) in &wang_set.tiles {
            let masked = wang_id.masked(set_type);
            tiles.insert(
                tile,
                Entry {
                    wang_id: masked,
                    probability: 1.0,
                },
            );
            exact.entry(masked).or_default().push(tile);
            for slot in set_type.meaningful_slots() {
                postings
                    .entry((slot, masked.get(slot)))
                    .or_default()
                    .push(tile);
            }
        }

        Self {
            name: wang_set.name.clone(),
            set_type,
            color_count: wang_set.color_count(),
            mode: MatchMode::default(),
            tiles,
            exact,
            postings,
            blank: wang_set.blank_tiles().first().copied(),
        }
    }

    /// Index the named Wang set of a tileset, weighting tiles by their probability
    pub fn from_tileset(tileset: &Tileset, wang_set: &str) -> Result<Self, CoreError> {
        let mut index = Self::new(tileset.require_wang_set(wang_set)?);
        for (&tile, entry) in index.tiles.iter_mut() {
            if let Some(probability) = tileset.probability(tile) {
                entry.probability = probability;
            }
        }
        Ok(index)
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_type(&self) -> WangSetType {
        self.set_type
    }

    pub fn match_mode(&self) -> MatchMode {
        self.mode
    }

    /// Highest valid color index
    pub fn color_count(&self) -> usize {
        self.color_count
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Masked WangId of a member tile
    pub fn wang_id(&self, tile: u32) -> Option<WangId> {
        self.tiles.get(&tile).map(|entry| entry.wang_id)
    }

    /// Lowest-id tile whose meaningful slots are all 0
    pub fn blank_tile(&self) -> Option<u32> {
        self.blank
    }

    /// All tiles satisfying `signature`, best first
    pub fn resolve(&self, signature: &Signature) -> Result<Vec<Candidate>, AutotileError> {
        self.resolve_with(signature, self.mode)
    }

    /// [`Self::resolve`] under an explicit match mode instead of the index's own
    pub fn resolve_with(
        &self,
        signature: &Signature,
        mode: MatchMode,
    ) -> Result<Vec<Candidate>, AutotileError> {
        let concrete: Vec<(usize, WangColorIndex)> =
            signature.concrete_slots(self.set_type).collect();

        let tiles: Vec<u32> = if concrete.is_empty() {
            self.tiles.keys().copied().collect()
        } else if mode == MatchMode::Strict
            && concrete.len() == self.set_type.position_count()
        {
            let mut key = WangId::EMPTY;
            for &(slot, color) in &concrete {
                key.set(slot, color);
            }
            self.exact.get(&key).cloned().unwrap_or_default()
        } else {
            self.narrowest(&concrete, mode)
                .into_iter()
                .filter(|tile| {
                    self.tiles.get(tile).is_some_and(|entry| {
                        signature.matches(&entry.wang_id, self.set_type, mode)
                    })
                })
                .collect()
        };

        let mut candidates: Vec<Candidate> = tiles
            .into_iter()
            .filter_map(|tile| {
                let entry = self.tiles.get(&tile)?;
                Some(Candidate {
                    tile,
                    score: signature.score(&entry.wang_id, self.set_type, mode),
                    probability: entry.probability,
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(AutotileError::NoMatch {
                signature: *signature,
            });
        }

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.probability.total_cmp(&a.probability))
                .then(a.tile.cmp(&b.tile))
        });
        Ok(candidates)
    }

    /// Resolve and pick one tile for the cell at world coordinates `(x, y)`
    pub fn select(
        &self,
        signature: &Signature,
        variants: VariantPolicy,
        x: i32,
        y: i32,
    ) -> Result<u32, AutotileError> {
        self.select_with(signature, self.mode, variants, x, y)
    }

    pub fn select_with(
        &self,
        signature: &Signature,
        mode: MatchMode,
        variants: VariantPolicy,
        x: i32,
        y: i32,
    ) -> Result<u32, AutotileError> {
        let candidates = self.resolve_with(signature, mode)?;
        let picked = match variants {
            VariantPolicy::Deterministic => candidates.first().map(|c| c.tile),
            VariantPolicy::Weighted { seed } => pick_weighted(&candidates, seed, x, y),
        };
        picked.ok_or(AutotileError::NoMatch {
            signature: *signature,
        })
    }

    /// Smallest posting list (or pair of lists when 0 is a wildcard) over the
    /// concrete slots, merged and sorted
    fn narrowest(&self, concrete: &[(usize, WangColorIndex)], mode: MatchMode) -> Vec<u32> {
        let lists = |slot: usize, color: WangColorIndex| -> [&[u32]; 2] {
            let get = |c: WangColorIndex| {
                self.postings
                    .get(&(slot, c))
                    .map(Vec::as_slice)
                    .unwrap_or(&[])
            };
            if mode == MatchMode::ZeroIsWildcard && color != 0 {
                [get(color), get(0)]
            } else {
                [get(color), &[]]
            }
        };

        let best = concrete
            .iter()
            .map(|&(slot, color)| lists(slot, color))
            .min_by_key(|[a, b]| a.len() + b.len());

        let mut tiles: Vec<u32> = best
            .map(|[a, b]| a.iter().chain(b.iter()).copied().collect())
            .unwrap_or_default();
        tiles.sort_unstable();
        tiles
    }
}

/// Probability-weighted pick among the candidates tied on matched slots.
/// The generator is seeded from the seed and the cell so repeated paints agree.
fn pick_weighted(candidates: &[Candidate], seed: u64, x: i32, y: i32) -> Option<u32> {
    let top = candidates.first()?.score;
    let tied: Vec<&Candidate> = candidates.iter().take_while(|c| c.score == top).collect();
    let total: f32 = tied.iter().map(|c| c.probability.max(0.0)).sum();
    // Infinite weights, or a sum that overflowed, leave no range to sample
    if !(total > 0.0 && total.is_finite()) {
        return tied.first().map(|c| c.tile);
    }

    let cell = ((x as u32 as u64) << 32) | (y as u32 as u64);
    let mut rng = SmallRng::seed_from_u64(seed ^ cell);
    let mut pick = rng.gen_range(0.0..total);
    for candidate in &tied {
        let weight = candidate.probability.max(0.0);
        if pick < weight {
            return Some(candidate.tile);
        }
        pick -= weight;
    }
    tied.last().map(|c| c.tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::testing::{float_tileset, main_tileset};
    use tessera_core::{Color, Tile, WangColor};

    fn float_index() -> WangIndex {
        WangIndex::from_tileset(&float_tileset(), "Float").unwrap()
    }

    fn edges(top: u8, right: u8, bottom: u8, left: u8) -> Signature {
        Signature::new([
            Some(top),
            None,
            Some(right),
            None,
            Some(bottom),
            None,
            Some(left),
            None,
        ])
    }

    fn tiles(candidates: &[Candidate]) -> Vec<u32> {
        candidates.iter().map(|c| c.tile).collect()
    }

    #[test]
    fn test_exact_lookup() {
        let index = float_index();
        assert_eq!(index.len(), 15);
        assert_eq!(tiles(&index.resolve(&edges(1, 0, 1, 0)).unwrap()), vec![19]);
        assert_eq!(tiles(&index.resolve(&edges(0, 0, 1, 0)).unwrap()), vec![3]);
        assert_eq!(tiles(&index.resolve(&edges(1, 0, 0, 0)).unwrap()), vec![35]);
    }

    #[test]
    fn test_corner_slots_ignored_for_edge_set() {
        let index = float_index();
        let mut signature = edges(1, 0, 1, 0);
        signature.set(WangId::TOP_RIGHT, Some(1));
        signature.set(WangId::BOTTOM_LEFT, Some(0));
        assert_eq!(tiles(&index.resolve(&signature).unwrap()), vec![19]);
    }

    #[test]
    fn test_partial_signature_ranks_by_id() {
        let index = float_index();
        let mut signature = Signature::ANY;
        signature.set(WangId::BOTTOM, Some(1));
        assert_eq!(
            tiles(&index.resolve(&signature).unwrap()),
            vec![0, 1, 2, 3, 16, 17, 18, 19]
        );
    }

    #[test]
    fn test_no_concrete_slots_returns_every_tile() {
        let index = float_index();
        assert_eq!(index.resolve(&Signature::ANY).unwrap().len(), 15);
    }

    #[test]
    fn test_no_match() {
        let index = float_index();
        let signature = edges(0, 0, 0, 0);
        assert_eq!(
            index.resolve(&signature),
            Err(AutotileError::NoMatch { signature })
        );
        assert_eq!(index.blank_tile(), None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let index = float_index();
        let mut signature = Signature::ANY;
        signature.set(WangId::LEFT, Some(1));
        let first = index.resolve(&signature).unwrap();
        for _ in 0..10 {
            assert_eq!(index.resolve(&signature).unwrap(), first);
            assert_eq!(float_index().resolve(&signature).unwrap(), first);
        }
    }

    #[test]
    fn test_probability_breaks_ties() {
        let mut tileset = float_tileset();
        if let Some(tile) = tileset.tiles.get_mut(&3) {
            tile.probability = Some(0.5);
        }
        let index = WangIndex::from_tileset(&tileset, "Float").unwrap();
        let signature = Signature::new([
            None,
            None,
            Some(0),
            None,
            Some(1),
            None,
            Some(0),
            None,
        ]);
        // Tiles 3 and 19 both match with an unconstrained top edge
        assert_eq!(tiles(&index.resolve(&signature).unwrap()), vec![19, 3]);
        assert_eq!(tiles(&float_index().resolve(&signature).unwrap()), vec![3, 19]);
    }

    #[test]
    fn test_corner_set() {
        let tileset = main_tileset();
        let index = WangIndex::new(&tileset.wang_sets[0]);
        let all = Signature::new([None, Some(1), None, Some(1), None, Some(1), None, Some(1)]);
        assert_eq!(tiles(&index.resolve(&all).unwrap()), vec![127]);
        let one = Signature::new([None, Some(1), None, Some(0), None, Some(0), None, Some(0)]);
        assert_eq!(tiles(&index.resolve(&one).unwrap()), vec![29]);
    }

    #[test]
    fn test_zero_is_wildcard_prefers_more_colored_slots() {
        let tileset = main_tileset();
        let index = WangIndex::new(&tileset.wang_sets[0]).with_match_mode(MatchMode::ZeroIsWildcard);
        let signature =
            Signature::new([None, Some(1), None, Some(1), None, Some(0), None, Some(0)]);
        let candidates = index.resolve(&signature).unwrap();
        assert_eq!(tiles(&candidates), vec![31, 29, 30]);
        assert_eq!(candidates[0].score, 2);
        assert_eq!(candidates[1].score, 1);

        // Strict matching only accepts the exact tile
        let strict = WangIndex::new(&tileset.wang_sets[0]);
        assert_eq!(tiles(&strict.resolve(&signature).unwrap()), vec![31]);
    }

    #[test]
    fn test_mixed_set_uses_all_slots() {
        let tileset = main_tileset();
        let index = WangIndex::new(&tileset.wang_sets[1]);
        let signature = Signature::from_wang_id("1,0,1,0,1,1,1,0".parse().unwrap());
        assert_eq!(tiles(&index.resolve(&signature).unwrap()), vec![33]);
        let shared = Signature::from_wang_id("0,0,0,0,1,0,1,0".parse().unwrap());
        assert_eq!(tiles(&index.resolve(&shared).unwrap()), vec![2, 4, 100]);
        assert_eq!(
            index.select(&shared, VariantPolicy::Deterministic, 0, 0),
            Ok(2)
        );
    }

    #[test]
    fn test_blank_tile() {
        let mut set = WangSet::new("Ground", WangSetType::Edge);
        set.add_color(WangColor::new("Grass", Color::RED));
        set.set_tile_wang_id(7, WangId::new([1, 0, 1, 0, 1, 0, 1, 0]));
        set.set_tile_wang_id(9, WangId::EMPTY);
        set.set_tile_wang_id(4, WangId::new([0, 0, 0, 0, 0, 0, 0, 0]));
        let index = WangIndex::new(&set);
        assert_eq!(index.blank_tile(), Some(4));
        assert_eq!(
            tiles(&index.resolve(&edges(0, 0, 0, 0)).unwrap()),
            vec![4, 9]
        );
    }

    #[test]
    fn test_weighted_pick_is_reproducible() {
        let index = float_index();
        let mut signature = Signature::ANY;
        signature.set(WangId::BOTTOM, Some(1));
        let policy = VariantPolicy::Weighted { seed: 42 };
        let allowed = tiles(&index.resolve(&signature).unwrap());
        for (x, y) in [(0, 0), (3, 7), (-2, 5)] {
            let first = index.select(&signature, policy, x, y).unwrap();
            assert!(allowed.contains(&first));
            assert_eq!(index.select(&signature, policy, x, y).unwrap(), first);
        }
    }

    #[test]
    fn test_weighted_pick_with_unbounded_weights() {
        let candidate = |tile, probability| Candidate {
            tile,
            score: 1,
            probability,
        };
        let infinite = [candidate(3, f32::INFINITY), candidate(4, 1.0)];
        assert_eq!(pick_weighted(&infinite, 7, 0, 0), Some(3));
        let overflowing = [candidate(5, f32::MAX), candidate(6, f32::MAX)];
        assert_eq!(pick_weighted(&overflowing, 7, 0, 0), Some(5));
        let weightless = [candidate(8, 0.0), candidate(9, 0.0)];
        assert_eq!(pick_weighted(&weightless, 7, 0, 0), Some(8));
    }

    #[test]
    fn test_weighted_select_on_infinite_probability() {
        let tileset = float_tileset().with_tile(Tile::new(3).with_probability(f32::INFINITY));
        let index = WangIndex::from_tileset(&tileset, "Float").unwrap();
        let mut signature = Signature::ANY;
        signature.set(WangId::BOTTOM, Some(1));
        let policy = VariantPolicy::Weighted { seed: 42 };
        assert_eq!(index.select(&signature, policy, 1, 1), Ok(3));
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(edges(1, 0, 1, 0).to_string(), "1,*,0,*,1,*,0,*");
    }
}
