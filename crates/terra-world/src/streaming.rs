//! Chunk streaming and caching.
//!
//! The cache keeps exactly the chunks the viewport needs. Each reconcile
//! recomputes the required rectangle, evicts everything outside it, then
//! generates and renders whatever is missing. A scale change is a global
//! epoch: elevations sampled at different scales are not comparable, so every
//! required chunk is rebuilt on the next pass.

use ahash::AHashMap;
use terra_common::{ChunkCoord, TerrainConfig, TerrainError, TerrainResult};
use tracing::{debug, info, trace};

use crate::display::Display;
use crate::field::{RenderedChunk, TerrainField};
use crate::generation::TerrainGenerator;
use crate::render::ChunkRenderer;
use crate::viewport::{ChunkBounds, Viewport};

/// Work done by one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Chunks in the required set
    pub required: usize,
    /// Entries dropped because they left the required set
    pub evicted: usize,
    /// Terrain fields generated
    pub generated: usize,
    /// Pixel blocks rendered
    pub rendered: usize,
    /// Whether this pass was a rescale epoch
    pub rescaled: bool,
}

/// Owns generated terrain and rendered chunks for the current viewport.
pub struct ChunkCache {
    /// Chunk edge length in cells
    block_size: u32,
    /// Terrain field generator
    generator: TerrainGenerator,
    /// Pixel block renderer
    renderer: ChunkRenderer,
    /// Generated fields
    terrain: AHashMap<ChunkCoord, TerrainField>,
    /// Rendered pixel blocks
    rendered: AHashMap<ChunkCoord, RenderedChunk>,
    /// Rebuild every required chunk on the next pass
    rescaled: bool,
    /// Scale used by the last pass
    scale: Option<f64>,
    /// Required rectangle of the last pass
    bounds: Option<ChunkBounds>,
    /// Fields generated since creation
    total_generated: u64,
    /// Chunks rendered since creation
    total_rendered: u64,
}

impl ChunkCache {
    /// Creates an empty cache.
    pub fn new(config: &TerrainConfig) -> TerrainResult<Self> {
        let generator = TerrainGenerator::new(config)?;
        let renderer = ChunkRenderer::new(config)?;
        info!(
            "Creating chunk cache with block_size={}, px={}",
            config.block_size, config.px
        );

        Ok(Self {
            block_size: config.block_size,
            generator,
            renderer,
            terrain: AHashMap::new(),
            rendered: AHashMap::new(),
            rescaled: false,
            scale: None,
            bounds: None,
            total_generated: 0,
            total_rendered: 0,
        })
    }

    /// Evaluates noise on the rayon pool. Results are unchanged.
    #[must_use]
    pub fn with_parallel_noise(mut self, parallel: bool) -> Self {
        self.generator = self.generator.with_parallel(parallel);
        self
    }

    /// Returns the chunk edge length in cells.
    #[must_use]
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Returns display pixels per cell.
    #[must_use]
    pub const fn px(&self) -> u32 {
        self.renderer.px()
    }

    /// Returns the chunk rectangle the viewport needs.
    #[must_use]
    pub fn required_set(&self, viewport: &Viewport) -> ChunkBounds {
        viewport.required_bounds(self.block_size)
    }

    /// Forces every required chunk to be rebuilt on the next reconcile.
    pub fn mark_rescaled(&mut self) {
        self.rescaled = true;
    }

    /// Returns whether the next reconcile is a rescale epoch.
    #[must_use]
    pub const fn is_rescaled(&self) -> bool {
        self.rescaled
    }

    /// Brings the cache in line with the viewport.
    ///
    /// Evicts first, then populates. Each freshly rendered chunk is handed to
    /// `display` and flipped immediately so the frame fills in progressively.
    /// A scale different from the previous pass starts a rescale epoch.
    pub fn reconcile(
        &mut self,
        viewport: &Viewport,
        display: &mut dyn Display,
    ) -> TerrainResult<ReconcileStats> {
        let scale = TerrainError::check_scale(viewport.scale)?;
        if self.scale.is_some_and(|previous| previous != scale) {
            self.rescaled = true;
        }
        if self.rescaled {
            info!("Rescale epoch: rebuilding all chunks at scale {scale}");
        }

        let bounds = self.required_set(viewport);
        let mut stats = ReconcileStats {
            required: bounds.len(),
            rescaled: self.rescaled,
            ..ReconcileStats::default()
        };

        let terrain_before = self.terrain.len();
        let rendered_before = self.rendered.len();
        self.terrain.retain(|coord, _| bounds.contains(*coord));
        self.rendered.retain(|coord, _| bounds.contains(*coord));
        stats.evicted = (terrain_before - self.terrain.len()).max(rendered_before - self.rendered.len());

        self.bounds = Some(bounds);
        self.scale = Some(scale);

        for coord in bounds.iter() {
            let regenerate = self.rescaled || !self.terrain.contains_key(&coord);
            if regenerate {
                let field = self.generator.generate(coord, scale)?;
                self.terrain.insert(coord, field);
                stats.generated += 1;
            }

            if regenerate || !self.rendered.contains_key(&coord) {
                let field = &self.terrain[&coord];
                let chunk = self.renderer.render(field);
                trace!("Rendered chunk {coord}");
                let offset = viewport.screen_offset(coord, self.block_size, self.renderer.px());
                display.present(coord, offset, &chunk);
                display.flip();
                self.rendered.insert(coord, chunk);
                stats.rendered += 1;
            }
        }

        self.rescaled = false;
        self.total_generated += stats.generated as u64;
        self.total_rendered += stats.rendered as u64;

        debug!(
            "Reconciled {} chunks: evicted={}, generated={}, rendered={}",
            stats.required, stats.evicted, stats.generated, stats.rendered
        );
        Ok(stats)
    }

    /// Redraws every required chunk and flips once.
    pub fn present_all(&self, viewport: &Viewport, display: &mut dyn Display) -> TerrainResult<()> {
        let bounds = self.required_set(viewport);
        for coord in bounds.iter() {
            let chunk = self.rendered(coord)?;
            let offset = viewport.screen_offset(coord, self.block_size, self.renderer.px());
            display.present(coord, offset, chunk);
        }
        display.flip();
        Ok(())
    }

    /// Gets the terrain field of a required chunk.
    pub fn terrain(&self, coord: ChunkCoord) -> TerrainResult<&TerrainField> {
        self.check_scope(coord)?;
        self.terrain
            .get(&coord)
            .ok_or(TerrainError::OutOfScopeAccess {
                x: coord.x,
                y: coord.y,
            })
    }

    /// Gets the pixel block of a required chunk.
    pub fn rendered(&self, coord: ChunkCoord) -> TerrainResult<&RenderedChunk> {
        self.check_scope(coord)?;
        self.rendered
            .get(&coord)
            .ok_or(TerrainError::OutOfScopeAccess {
                x: coord.x,
                y: coord.y,
            })
    }

    /// Returns the cached terrain coordinates, sorted.
    #[must_use]
    pub fn terrain_keys(&self) -> Vec<ChunkCoord> {
        let mut keys: Vec<_> = self.terrain.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the cached rendered coordinates, sorted.
    #[must_use]
    pub fn rendered_keys(&self) -> Vec<ChunkCoord> {
        let mut keys: Vec<_> = self.rendered.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the number of cached chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terrain.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
    }

    /// Fields generated since creation.
    #[must_use]
    pub const fn total_generated(&self) -> u64 {
        self.total_generated
    }

    /// Chunks rendered since creation.
    #[must_use]
    pub const fn total_rendered(&self) -> u64 {
        self.total_rendered
    }

    fn check_scope(&self, coord: ChunkCoord) -> TerrainResult<()> {
        let in_scope = self.bounds.is_some_and(|b| b.contains(coord));
        debug_assert!(in_scope, "chunk {coord} queried outside the required set");
        if in_scope {
            Ok(())
        } else {
            Err(TerrainError::OutOfScopeAccess {
                x: coord.x,
                y: coord.y,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Framebuffer, ScreenOffset};
    use crate::viewport::Zoom;
    use proptest::prelude::*;

    /// Records every present call.
    #[derive(Default)]
    struct RecordingDisplay {
        presents: Vec<(ChunkCoord, ScreenOffset)>,
        flips: usize,
    }

    impl Display for RecordingDisplay {
        fn present(&mut self, coord: ChunkCoord, offset: ScreenOffset, _chunk: &RenderedChunk) {
            self.presents.push((coord, offset));
        }

        fn flip(&mut self) {
            self.flips += 1;
        }
    }

    fn cache() -> ChunkCache {
        ChunkCache::new(&TerrainConfig::default()).expect("cache")
    }

    fn small_view() -> Viewport {
        Viewport::new(60, 40).at(-10, 5)
    }

    fn assert_keys_match(cache: &ChunkCache, viewport: &Viewport) {
        let mut expected: Vec<_> = cache.required_set(viewport).iter().collect();
        expected.sort_unstable();
        assert_eq!(cache.terrain_keys(), expected);
        assert_eq!(cache.rendered_keys(), expected);
    }

    #[test]
    fn test_first_reconcile_populates() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = small_view();

        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        let required = cache.required_set(&view).len();
        assert_eq!(stats.required, required);
        assert_eq!(stats.generated, required);
        assert_eq!(stats.rendered, required);
        assert_eq!(stats.evicted, 0);
        assert_eq!(display.presents.len(), required);
        assert_eq!(display.flips, required);
        assert_keys_match(&cache, &view);
    }

    #[test]
    fn test_second_reconcile_is_cached() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = small_view();
        cache.reconcile(&view, &mut display).expect("reconcile");

        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        assert_eq!(stats.generated, 0);
        assert_eq!(stats.rendered, 0);
        assert_eq!(stats.evicted, 0);
    }

    #[test]
    fn test_pan_evicts_and_fills_edge() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let mut view = Viewport::new(60, 60);
        cache.reconcile(&view, &mut display).expect("reconcile");
        assert_eq!(cache.len(), 9);

        view.pan(1, 0, 20);
        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        assert_eq!(stats.evicted, 3);
        assert_eq!(stats.generated, 3);
        assert_eq!(stats.rendered, 3);
        assert_keys_match(&cache, &view);
        assert!(!cache.terrain_keys().contains(&ChunkCoord::new(0, 0)));
    }

    #[test]
    fn test_far_jump_keeps_memory_bounded() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let mut view = Viewport::new(100, 100);
        for step in 0..5 {
            view.camera_x = step * 10_000;
            view.camera_y = -step * 7_000;
            cache.reconcile(&view, &mut display).expect("reconcile");
            assert!(cache.len() <= 36);
            assert_keys_match(&cache, &view);
        }
    }

    #[test]
    fn test_far_camera_keeps_distinct_chunks() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = Viewport::new(300, 300).at(i64::from(i32::MAX) * 20 - 10, 0);

        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        assert_eq!(stats.generated, 16 * 15);
        assert_keys_match(&cache, &view);
        let keys = cache.terrain_keys();
        assert!(keys.contains(&ChunkCoord::new(i64::from(i32::MAX) - 1, 0)));
        assert!(keys.contains(&ChunkCoord::new(i64::from(i32::MAX) + 14, 14)));

        let origin = Viewport::new(300, 300);
        let aliased = Viewport::new(300, 300).at((1i64 << 32) * 20, 0);
        cache.reconcile(&origin, &mut display).expect("reconcile");
        let stats = cache.reconcile(&aliased, &mut display).expect("reconcile");
        assert_eq!(stats.evicted, 225);
        assert_eq!(stats.generated, 225);
        assert!(!cache.terrain_keys().contains(&ChunkCoord::new(0, 0)));
    }

    #[test]
    fn test_rescale_regenerates_everything() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let mut view = small_view();
        cache.reconcile(&view, &mut display).expect("reconcile");
        let generated_before = cache.total_generated();

        view.zoom(Zoom::In).expect("zoom");
        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        let required = cache.required_set(&view).len();
        assert!(stats.rescaled);
        assert_eq!(stats.generated, required);
        assert_eq!(stats.rendered, required);
        assert_eq!(cache.total_generated() - generated_before, required as u64);
        assert!(!cache.is_rescaled());

        let coord = cache.required_set(&view).iter().next().expect("chunk");
        assert_eq!(cache.terrain(coord).expect("field").scale(), view.scale);

        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        assert_eq!(stats.generated, 0);
        assert!(!stats.rescaled);
    }

    #[test]
    fn test_mark_rescaled_forces_rebuild_at_same_scale() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = small_view();
        cache.reconcile(&view, &mut display).expect("reconcile");

        cache.mark_rescaled();
        let stats = cache.reconcile(&view, &mut display).expect("reconcile");
        assert_eq!(stats.generated, stats.required);
        assert_eq!(stats.rendered, stats.required);
    }

    #[test]
    fn test_invalid_scale_rejected_before_work() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = small_view().with_scale(-0.5);
        let err = cache.reconcile(&view, &mut display).expect_err("bad scale");
        assert!(matches!(err, TerrainError::InvalidScale(_)));
        assert!(cache.is_empty());
        assert!(display.presents.is_empty());
    }

    #[test]
    fn test_out_of_scope_query_is_error() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = small_view();
        cache.reconcile(&view, &mut display).expect("reconcile");

        let inside = cache.required_set(&view).iter().next().expect("chunk");
        assert!(cache.terrain(inside).is_ok());
        assert!(cache.rendered(inside).is_ok());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "outside the required set"))]
    fn test_out_of_scope_query_asserts() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        cache.reconcile(&small_view(), &mut display).expect("reconcile");

        let err = cache.terrain(ChunkCoord::new(500, 500)).expect_err("out of scope");
        assert!(matches!(err, TerrainError::OutOfScopeAccess { x: 500, y: 500 }));
    }

    #[test]
    fn test_cached_matches_direct_generation() {
        let mut cache = cache();
        let mut display = RecordingDisplay::default();
        let view = small_view();
        cache.reconcile(&view, &mut display).expect("reconcile");

        let generator = TerrainGenerator::with_seed(42);
        let renderer = ChunkRenderer::default();
        for coord in cache.required_set(&view).iter() {
            let field = generator.generate(coord, view.scale).expect("generate");
            assert_eq!(cache.terrain(coord).expect("field"), &field);
            assert_eq!(cache.rendered(coord).expect("chunk"), &renderer.render(&field));
        }
    }

    #[test]
    fn test_present_all_fills_framebuffer() {
        let mut cache = cache();
        let view = Viewport::new(300, 300).at(-7, 11);
        let mut progressive = Framebuffer::new(900, 900);
        cache.reconcile(&view, &mut progressive).expect("reconcile");

        let mut frame = Framebuffer::new(900, 900);
        frame.clear([1, 2, 3]);
        cache.present_all(&view, &mut frame).expect("present");
        assert_eq!(frame.flips(), 1);
        assert_eq!(frame.presented(), cache.required_set(&view).len() as u64);
        assert!(frame.pixels().chunks_exact(3).all(|p| p != [1, 2, 3]));
        // Progressive draws land in the same place as the full redraw.
        assert_eq!(progressive.pixels(), frame.pixels());
    }

    #[test]
    fn test_parallel_noise_cache_matches() {
        let view = small_view();
        let mut seq = cache();
        let mut par = cache().with_parallel_noise(true);
        let mut display = RecordingDisplay::default();
        seq.reconcile(&view, &mut display).expect("reconcile");
        par.reconcile(&view, &mut display).expect("reconcile");
        for coord in seq.required_set(&view).iter() {
            assert_eq!(
                seq.terrain(coord).expect("seq"),
                par.terrain(coord).expect("par")
            );
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_keys_equal_required_set_after_walk(
            moves in proptest::collection::vec((-60i64..60, -60i64..60), 1..12),
        ) {
            let mut cache = cache();
            let mut display = RecordingDisplay::default();
            let mut view = Viewport::new(80, 60).at(-1234, 987);
            for (dx, dy) in moves {
                view.pan(dx, dy, 1);
                cache.reconcile(&view, &mut display).expect("reconcile");
                let mut expected: Vec<_> = cache.required_set(&view).iter().collect();
                expected.sort_unstable();
                prop_assert_eq!(cache.terrain_keys(), expected.clone());
                prop_assert_eq!(cache.rendered_keys(), expected);
            }
        }
    }
}
