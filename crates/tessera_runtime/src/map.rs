//! Chunked map runtime
//!
//! The map is split into square chunks, each behind its own mutex. An edit
//! locks every chunk its window touches in ascending `ChunkCoord` order,
//! copies the window into a scratch grid, runs the painter there and writes
//! the result back. Colliders are regenerated per chunk and published as
//! deltas.
//!
//! Every edit takes a sequence number when it is submitted. An edit that
//! finds one of its chunks already written by a newer sequence gives up
//! without writing (`PaintResult::Superseded`).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rayon::prelude::*;
use tessera_autotile::{
    AutotileError, AutotilePainter, PaintRegion, PaintReport, TerrainGrid, TileChange, WangIndex,
};
use tessera_collision::{extract_layer, Collider, ColliderDelta, ColliderId};
use tessera_core::{tile_index, TileLayer, Tileset, WangColorIndex};
use tracing::{debug, debug_span, info};

use crate::bundle::TilesetBundle;
use crate::chunk::{Chunk, ChunkCoord, ChunkData};
use crate::request::{EditOutcome, PaintRequest, PaintResult};
use crate::{RuntimeConfig, RuntimeError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Rectangle of map cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Window {
    fn from_bounds(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        (min_x <= max_x && min_y <= max_y).then(|| Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    fn max(&self) -> (i32, i32) {
        (
            self.x + self.width as i32 - 1,
            self.y + self.height as i32 - 1,
        )
    }

    /// Grown by `ring` cells on every side
    fn expanded(&self, ring: i32) -> Self {
        let (max_x, max_y) = self.max();
        Self {
            x: self.x - ring,
            y: self.y - ring,
            width: (max_x - self.x + 1 + 2 * ring) as u32,
            height: (max_y - self.y + 1 + 2 * ring) as u32,
        }
    }

    fn intersect(&self, other: &Window) -> Option<Self> {
        let (max_x, max_y) = self.max();
        let (other_x, other_y) = other.max();
        Self::from_bounds(
            self.x.max(other.x),
            self.y.max(other.y),
            max_x.min(other_x),
            max_y.min(other_y),
        )
    }

    fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x0, y0, w, h) = (self.x, self.y, self.width as i32, self.height as i32);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| (x0 + dx, y0 + dy)))
    }

    fn chunks(&self, chunk_size: u32) -> BTreeSet<ChunkCoord> {
        let min = ChunkCoord::containing(self.x, self.y, chunk_size);
        let (max_x, max_y) = self.max();
        let max = ChunkCoord::containing(max_x, max_y, chunk_size);
        (min.y..=max.y)
            .flat_map(|y| (min.x..=max.x).map(move |x| ChunkCoord::new(x, y)))
            .collect()
    }
}

enum Edit<'a> {
    Paint {
        index: &'a WangIndex,
        region: &'a PaintRegion,
        color: WangColorIndex,
    },
    /// Re-resolve `area` from current terrain; colliders of `regenerate`
    /// chunks are rebuilt even when no tile changed
    Refresh {
        index: Option<&'a WangIndex>,
        area: Window,
        regenerate: BTreeSet<ChunkCoord>,
    },
}

/// A tile map held as independently locked chunks
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[derive(Debug)]
pub struct MapRuntime {
    config: RuntimeConfig,
    width: u32,
    height: u32,
    bundle: RwLock<Arc<TilesetBundle>>,
    chunks: RwLock<BTreeMap<ChunkCoord, Arc<Mutex<Chunk>>>>,
    next_sequence: AtomicU64,
}

impl MapRuntime {
    /// An empty `width` x `height` map. Chunks are created as they are painted
    /// or loaded.
    pub fn new(
        tileset: Tileset,
        width: u32,
        height: u32,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let bundle = TilesetBundle::new(tileset, config.autotile.match_mode)?;
        if let Some(name) = &config.wang_set {
            bundle.index(name)?;
        }
        Ok(Self {
            config,
            width,
            height,
            bundle: RwLock::new(Arc::new(bundle)),
            chunks: RwLock::new(BTreeMap::new()),
            next_sequence: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The current tileset bundle; stays valid across reloads
    pub fn bundle(&self) -> Arc<TilesetBundle> {
        Arc::clone(&read(&self.bundle))
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn chunk_of(&self, x: i32, y: i32) -> ChunkCoord {
        ChunkCoord::containing(x, y, self.config.chunk_size)
    }

    pub fn loaded_chunks(&self) -> Vec<ChunkCoord> {
        read(&self.chunks).keys().copied().collect()
    }

    /// Packed tile reference at a map cell
    pub fn tile_at(&self, x: i32, y: i32) -> Option<u32> {
        let handle = read(&self.chunks).get(&self.chunk_of(x, y)).cloned()?;
        let chunk = lock(&handle);
        chunk.tile_at(x, y)
    }

    pub fn terrain_at(&self, x: i32, y: i32) -> Option<WangColorIndex> {
        let handle = read(&self.chunks).get(&self.chunk_of(x, y)).cloned()?;
        let chunk = lock(&handle);
        chunk.terrain_at(x, y)
    }

    /// Published colliders of one chunk
    pub fn colliders(&self, coord: ChunkCoord) -> Vec<(ColliderId, Collider)> {
        let Some(handle) = read(&self.chunks).get(&coord).cloned() else {
            return Vec::new();
        };
        let chunk = lock(&handle);
        chunk
            .colliders
            .iter()
            .map(|(id, collider)| (id, collider.clone()))
            .collect()
    }

    fn next_sequence(&self, count: u64) -> u64 {
        self.next_sequence.fetch_add(count, Ordering::SeqCst)
    }

    /// Paint one request
    pub fn paint(&self, request: &PaintRequest) -> Result<PaintResult, RuntimeError> {
        let sequence = self.next_sequence(1);
        self.paint_with_sequence(sequence, request)
    }

    /// Paint requests on the rayon pool. A request runs only after every
    /// earlier request whose chunks overlap its own; results come back in
    /// submission order.
    pub fn paint_batch(&self, requests: &[PaintRequest]) -> Vec<Result<PaintResult, RuntimeError>> {
        let first = self.next_sequence(requests.len() as u64);
        let footprints: Vec<BTreeSet<ChunkCoord>> = requests
            .iter()
            .map(|request| {
                self.paint_window(&request.region)
                    .map(|window| window.chunks(self.config.chunk_size))
                    .unwrap_or_default()
            })
            .collect();

        let mut waves: Vec<Vec<usize>> = Vec::new();
        let mut wave_of = Vec::with_capacity(requests.len());
        for (i, footprint) in footprints.iter().enumerate() {
            let wave = (0..i)
                .filter(|&j| !footprint.is_disjoint(&footprints[j]))
                .map(|j| wave_of[j] + 1)
                .max()
                .unwrap_or(0);
            wave_of.push(wave);
            if waves.len() <= wave {
                waves.resize_with(wave + 1, Vec::new);
            }
            waves[wave].push(i);
        }
        debug!(requests = requests.len(), waves = waves.len(), "paint batch");

        let mut results: Vec<Option<Result<PaintResult, RuntimeError>>> =
            (0..requests.len()).map(|_| None).collect();
        for wave in waves {
            let done: Vec<(usize, Result<PaintResult, RuntimeError>)> = wave
                .par_iter()
                .map(|&i| (i, self.paint_with_sequence(first + i as u64, &requests[i])))
                .collect();
            for (i, result) in done {
                results[i] = Some(result);
            }
        }
        results.into_iter().flatten().collect()
    }

    fn paint_with_sequence(
        &self,
        sequence: u64,
        request: &PaintRequest,
    ) -> Result<PaintResult, RuntimeError> {
        let _span = debug_span!("paint", sequence, wang_set = %request.wang_set).entered();
        let bundle = self.bundle();
        let index = bundle.index(&request.wang_set)?;
        let color_count = index.color_count();
        if request.color as usize > color_count {
            return Err(AutotileError::UnknownColor {
                color: request.color,
                color_count,
            }
            .into());
        }
        self.run_edit(
            sequence,
            &bundle,
            Edit::Paint {
                index,
                region: &request.region,
                color: request.color,
            },
        )
    }

    /// Cells read by a paint of `region`: the region, its neighbors and
    /// their neighbors, clipped to the map
    fn paint_window(&self, region: &PaintRegion) -> Option<Window> {
        let (min_x, min_y, max_x, max_y) = region.bounds()?;
        Window::from_bounds(min_x, min_y, max_x, max_y)?
            .expanded(2)
            .intersect(&self.map_window()?)
    }

    fn map_window(&self) -> Option<Window> {
        Window::from_bounds(0, 0, self.width as i32 - 1, self.height as i32 - 1)
    }

    /// Place a packed tile reference at a map cell
    pub fn place_tile(&self, x: i32, y: i32, tile: u32) -> Result<EditOutcome, RuntimeError> {
        self.bundle().tileset.check_tile(tile_index(tile))?;
        self.set_tile(x, y, Some(tile))
    }

    pub fn remove_tile(&self, x: i32, y: i32) -> Result<EditOutcome, RuntimeError> {
        self.set_tile(x, y, None)
    }

    fn set_tile(&self, x: i32, y: i32, tile: Option<u32>) -> Result<EditOutcome, RuntimeError> {
        if !self.in_bounds(x, y) {
            return Err(RuntimeError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let sequence = self.next_sequence(1);
        let bundle = self.bundle();
        let coord = self.chunk_of(x, y);
        let create = BTreeSet::from([coord]);

        loop {
            let handles = self.acquire(&create, &create, &bundle);
            let Some((_, handle)) = handles.first() else {
                continue;
            };
            let mut chunk = lock(handle);
            if chunk.unloaded {
                continue;
            }

            let mut outcome = EditOutcome::new(sequence);
            let (lx, ly) = chunk.local(x, y);
            let old = chunk.data.layer.set(lx, ly, tile);
            if old != tile {
                chunk.sequence = chunk.sequence.max(sequence);
                outcome.report.changes.push(TileChange {
                    x,
                    y,
                    old,
                    new: tile,
                });
                self.regenerate(&bundle, &mut chunk, &mut outcome)?;
            }
            return Ok(outcome);
        }
    }

    /// Insert a chunk's saved contents, re-resolve it against its loaded
    /// neighbors and publish its colliders. A chunk already loaded at
    /// `coord` is replaced.
    pub fn load_chunk(
        &self,
        coord: ChunkCoord,
        data: ChunkData,
    ) -> Result<EditOutcome, RuntimeError> {
        let size = self.config.chunk_size;
        for (width, height) in [
            (data.terrain.width, data.terrain.height),
            (data.layer.width, data.layer.height),
        ] {
            if width != size || height != size {
                return Err(RuntimeError::InvalidChunk {
                    coord,
                    width,
                    height,
                    expected: size,
                });
            }
        }
        let expected = size as usize * size as usize;
        for len in [data.terrain.cells.len(), data.layer.tiles.len()] {
            if len != expected {
                return Err(RuntimeError::InvalidChunkStorage {
                    coord,
                    len,
                    expected,
                });
            }
        }
        let (ox, oy) = coord.origin(size);
        if !self.in_bounds(ox, oy) {
            return Err(RuntimeError::OutOfBounds {
                x: ox,
                y: oy,
                width: self.width,
                height: self.height,
            });
        }
        let bundle = self.bundle();
        for (_, _, packed) in data.layer.occupied() {
            bundle.tileset.check_tile(tile_index(packed))?;
        }

        let sequence = self.next_sequence(1);
        let mut outcome = EditOutcome::new(sequence);
        if let Some(previous) = self.unload_chunk(coord) {
            outcome.colliders.push((coord, previous.colliders));
        }

        let mut data = data;
        data.layer.name = self.config.layer_name.clone();
        write(&self.chunks).insert(coord, Arc::new(Mutex::new(Chunk::new(coord, size, data))));
        debug!(x = coord.x, y = coord.y, "chunk loaded");

        let chunk_area = Window {
            x: ox,
            y: oy,
            width: size,
            height: size,
        };
        let Some(area) = self
            .map_window()
            .and_then(|map| chunk_area.expanded(1).intersect(&map))
        else {
            return Ok(outcome);
        };
        let edit = Edit::Refresh {
            index: bundle.refresh_index(self.config.wang_set.as_deref()),
            area,
            regenerate: BTreeSet::from([coord]),
        };
        match self.run_edit(sequence, &bundle, edit)? {
            PaintResult::Applied(refreshed) => outcome.extend(refreshed),
            PaintResult::Superseded { newer, .. } => {
                // A neighbor was repainted meanwhile; still publish this
                // chunk's colliders
                debug!(x = coord.x, y = coord.y, newer, "load refresh superseded");
                if let Some(handle) = read(&self.chunks).get(&coord).cloned() {
                    let mut chunk = lock(&handle);
                    if !chunk.unloaded {
                        self.regenerate(&bundle, &mut chunk, &mut outcome)?;
                    }
                }
            }
        }
        Ok(outcome)
    }

    /// Remove a chunk, returning its contents and the delta removing all of
    /// its colliders
    pub fn unload_chunk(&self, coord: ChunkCoord) -> Option<UnloadedChunk> {
        let handle = write(&self.chunks).remove(&coord)?;
        let mut chunk = lock(&handle);
        chunk.unloaded = true;
        let colliders = chunk.colliders.clear();
        let data = std::mem::replace(
            &mut chunk.data,
            ChunkData::empty(0, &self.config.layer_name, uuid::Uuid::nil()),
        );
        debug!(x = coord.x, y = coord.y, removed = colliders.removed.len(), "chunk unloaded");
        Some(UnloadedChunk { data, colliders })
    }

    /// Swap in a new tileset, then re-resolve every loaded chunk and rebuild
    /// all colliders. The old tileset stays active when the new one fails
    /// validation or lacks a tile that is placed on the map.
    pub fn reload_tileset(&self, tileset: Tileset) -> Result<EditOutcome, RuntimeError> {
        let bundle = Arc::new(TilesetBundle::new(
            tileset,
            self.config.autotile.match_mode,
        )?);
        if let Some(name) = &self.config.wang_set {
            bundle.index(name)?;
        }

        let handles: Vec<(ChunkCoord, Arc<Mutex<Chunk>>)> = read(&self.chunks)
            .iter()
            .map(|(coord, handle)| (*coord, Arc::clone(handle)))
            .collect();
        for (_, handle) in &handles {
            let chunk = lock(handle);
            for (_, _, packed) in chunk.data.layer.occupied() {
                bundle.tileset.check_tile(tile_index(packed))?;
            }
        }

        *write(&self.bundle) = Arc::clone(&bundle);
        info!(
            tileset = %bundle.tileset.name,
            chunks = handles.len(),
            "tileset reloaded"
        );

        let sequence = self.next_sequence(1);
        let index = bundle.refresh_index(self.config.wang_set.as_deref());
        let size = self.config.chunk_size;
        let mut outcome = EditOutcome::new(sequence);
        for (coord, _) in handles {
            let (ox, oy) = coord.origin(size);
            let chunk_area = Window {
                x: ox,
                y: oy,
                width: size,
                height: size,
            };
            let Some(area) = self.map_window().and_then(|map| chunk_area.intersect(&map)) else {
                continue;
            };
            let edit = Edit::Refresh {
                index,
                area,
                regenerate: BTreeSet::from([coord]),
            };
            match self.run_edit(sequence, &bundle, edit)? {
                PaintResult::Applied(refreshed) => outcome.extend(refreshed),
                PaintResult::Superseded { newer, .. } => {
                    debug!(x = coord.x, y = coord.y, newer, "chunk repainted during reload");
                }
            }
        }
        Ok(outcome)
    }

    /// Handles of the loaded chunks among `coords`, in ascending order.
    /// Chunks in `create` are created empty when missing.
    fn acquire(
        &self,
        coords: &BTreeSet<ChunkCoord>,
        create: &BTreeSet<ChunkCoord>,
        bundle: &TilesetBundle,
    ) -> Vec<(ChunkCoord, Arc<Mutex<Chunk>>)> {
        {
            let chunks = read(&self.chunks);
            if create.iter().all(|coord| chunks.contains_key(coord)) {
                return coords
                    .iter()
                    .filter_map(|coord| chunks.get(coord).map(|h| (*coord, Arc::clone(h))))
                    .collect();
            }
        }

        let size = self.config.chunk_size;
        let mut chunks = write(&self.chunks);
        for &coord in create {
            chunks.entry(coord).or_insert_with(|| {
                let data = ChunkData::empty(size, &self.config.layer_name, bundle.tileset.id);
                Arc::new(Mutex::new(Chunk::new(coord, size, data)))
            });
        }
        coords
            .iter()
            .filter_map(|coord| chunks.get(coord).map(|h| (*coord, Arc::clone(h))))
            .collect()
    }

    fn run_edit(
        &self,
        sequence: u64,
        bundle: &TilesetBundle,
        edit: Edit<'_>,
    ) -> Result<PaintResult, RuntimeError> {
        let size = self.config.chunk_size;
        let Some(map) = self.map_window() else {
            return Ok(PaintResult::Applied(EditOutcome::new(sequence)));
        };

        // Affected cells, then everything their signatures read
        let (affected, create) = match &edit {
            Edit::Paint { region, .. } => {
                let painted: BTreeSet<ChunkCoord> = region
                    .cells()
                    .iter()
                    .filter(|&&(x, y)| self.in_bounds(x, y))
                    .map(|&(x, y)| self.chunk_of(x, y))
                    .collect();
                let affected = region.bounds().and_then(|(min_x, min_y, max_x, max_y)| {
                    Window::from_bounds(min_x, min_y, max_x, max_y)?
                        .expanded(1)
                        .intersect(&map)
                });
                (affected, painted)
            }
            Edit::Refresh { area, .. } => (Some(*area), BTreeSet::new()),
        };
        let Some(window) = affected.and_then(|a| a.expanded(1).intersect(&map)) else {
            return Ok(PaintResult::Applied(EditOutcome::new(sequence)));
        };
        let coords = window.chunks(size);

        loop {
            let handles = self.acquire(&coords, &create, bundle);
            let mut guards: Vec<MutexGuard<'_, Chunk>> =
                handles.iter().map(|(_, handle)| lock(handle)).collect();
            if guards.iter().any(|chunk| chunk.unloaded) {
                continue;
            }
            return self.apply_locked(sequence, bundle, &edit, window, &create, &mut guards);
        }
    }

    fn apply_locked(
        &self,
        sequence: u64,
        bundle: &TilesetBundle,
        edit: &Edit<'_>,
        window: Window,
        painted: &BTreeSet<ChunkCoord>,
        guards: &mut [MutexGuard<'_, Chunk>],
    ) -> Result<PaintResult, RuntimeError> {
        if let Some(newer) = guards
            .iter()
            .map(|chunk| chunk.sequence)
            .filter(|&s| s > sequence)
            .max()
        {
            debug!(sequence, newer, "edit superseded");
            return Ok(PaintResult::Superseded { sequence, newer });
        }

        // Stitch the window
        let mut terrain = TerrainGrid::new(window.width, window.height);
        let mut layer = TileLayer::new(
            self.config.layer_name.clone(),
            bundle.tileset.id,
            window.width,
            window.height,
        );
        for chunk in guards.iter() {
            for (x, y) in self.overlap(chunk, &window) {
                let (wx, wy) = (x - window.x, y - window.y);
                terrain.set(wx, wy, chunk.terrain_at(x, y));
                layer.set(wx, wy, chunk.tile_at(x, y));
            }
        }

        let (report, mut written, regenerate) = match edit {
            Edit::Paint {
                index,
                region,
                color,
            } => {
                let local = region.translated(-window.x, -window.y);
                let report = self
                    .painter(index, &window)
                    .paint(&mut terrain, &mut layer, &local, *color)?;
                (report, painted.clone(), BTreeSet::new())
            }
            Edit::Refresh {
                index,
                area,
                regenerate,
            } => {
                let report = match index {
                    Some(index) => {
                        let local = PaintRegion::rect(
                            area.x - window.x,
                            area.y - window.y,
                            area.width,
                            area.height,
                        );
                        self.painter(index, &window).refresh(&terrain, &mut layer, &local)
                    }
                    None => PaintReport::default(),
                };
                (report, BTreeSet::new(), regenerate.clone())
            }
        };

        let changed: BTreeSet<ChunkCoord> = report
            .changes
            .iter()
            .map(|change| self.chunk_of(change.x, change.y))
            .collect();
        written.extend(changed.iter().copied());

        let mut outcome = EditOutcome::new(sequence);
        for chunk in guards.iter_mut() {
            let coord = chunk.coord;
            if written.contains(&coord) {
                for (x, y) in self.overlap(chunk, &window) {
                    let (wx, wy) = (x - window.x, y - window.y);
                    let (lx, ly) = chunk.local(x, y);
                    chunk.data.terrain.set(lx, ly, terrain.get(wx, wy));
                    chunk.data.layer.set(lx, ly, layer.get(wx, wy));
                }
                chunk.sequence = chunk.sequence.max(sequence);
            }
            if changed.contains(&coord) || regenerate.contains(&coord) {
                self.regenerate(bundle, chunk, &mut outcome)?;
            }
        }
        outcome.report = report;
        Ok(PaintResult::Applied(outcome))
    }

    fn painter<'i>(&self, index: &'i WangIndex, window: &Window) -> AutotilePainter<'i> {
        AutotilePainter::new(index)
            .with_config(self.config.autotile)
            .with_origin(window.x, window.y)
    }

    /// Map cells shared by a chunk and a window
    fn overlap(&self, chunk: &Chunk, window: &Window) -> Vec<(i32, i32)> {
        let size = self.config.chunk_size;
        let bounds = Window {
            x: chunk.origin.0,
            y: chunk.origin.1,
            width: size,
            height: size,
        };
        bounds
            .intersect(window)
            .map(|shared| shared.cells().filter(|&(x, y)| self.in_bounds(x, y)).collect())
            .unwrap_or_default()
    }

    /// Rebuild a chunk's colliders and record the delta
    fn regenerate(
        &self,
        bundle: &TilesetBundle,
        chunk: &mut Chunk,
        outcome: &mut EditOutcome,
    ) -> Result<(), RuntimeError> {
        let extraction = extract_layer(
            &bundle.tileset,
            &chunk.data.layer,
            chunk.origin,
            &self.config.collision,
        )?;
        outcome.issues.extend(extraction.issues);
        let delta: ColliderDelta = chunk.colliders.sync(extraction.colliders);
        if !delta.is_empty() {
            debug!(
                x = chunk.coord.x,
                y = chunk.coord.y,
                added = delta.added.len(),
                removed = delta.removed.len(),
                "colliders regenerated"
            );
            outcome.colliders.push((chunk.coord, delta));
        }
        Ok(())
    }
}

/// Contents of an unloaded chunk and the removal of its colliders
#[derive(Debug, Clone, PartialEq)]
pub struct UnloadedChunk {
    pub data: ChunkData,
    pub colliders: ColliderDelta,
}
