//! Mosaic effect: random seeds, nearest-seed clustering, per-cluster average.
//!
//! ## Algorithm
//!
//! 1. Draw `k` seed points; x from the first random stream, y from the second,
//!    one seed at a time.
//! 2. Scan pixels with x in the outer loop and y in the inner loop. Seeds are
//!    kept sorted by the raster key `x + y * W`. For each pixel, pick the
//!    closest seed (strict `<`, so the earliest seed in key order wins ties).
//! 3. Add the pixel's color to the winner and remember the assignment.
//! 4. Average each seed's colors. A seed that won no pixel keeps no color.
//! 5. Every pixel takes its seed's average.
//!
//! ## Search strategies
//!
//! - [`SeedSearch::Windowed`] (default) only looks at seeds whose position in
//!   key order is near `(x + y * W) / (W * H / k)`, within `k / 4` on either
//!   side. It can miss the true nearest seed; that is the expected output.
//! - [`SeedSearch::Exact`] scans every seed.

use std::ops::Range;

use ndarray::Array2;

use crate::buffer::{PixelBuffer, Rgb};
use crate::error::{EditorError, Result};
use crate::filters::{ImageEffect, PixelFilter};

// ============================================================================
// Random streams
// ============================================================================

/// Source of uniformly distributed indices.
pub trait RandomSource {
    /// Uniform value in `[0, bound)`. `bound` is never zero.
    fn next_below(&mut self, bound: usize) -> usize;
}

/// Simple linear congruential generator for deterministic mosaics.
/// Uses MINSTD parameters.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.wrapping_add(1), // Avoid zero
        }
    }

    /// Generate next random u32.
    fn next_u32(&mut self) -> u32 {
        // MINSTD LCG
        self.state = self.state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        self.state as u32
    }
}

impl RandomSource for SimpleRng {
    fn next_below(&mut self, bound: usize) -> usize {
        (self.next_u32() as u64 % bound as u64) as usize
    }
}

// ============================================================================
// Seeds
// ============================================================================

/// A cluster center and the colors it has collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    x: usize,
    y: usize,
    sums: [u64; 3],
    count: u64,
    average: Option<Rgb>,
}

impl Seed {
    pub fn new(x: usize, y: usize) -> Self {
        Seed {
            x,
            y,
            sums: [0; 3],
            count: 0,
            average: None,
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    /// Number of pixels assigned to this seed.
    pub fn pixel_count(&self) -> u64 {
        self.count
    }

    /// Final cluster color, `None` for a seed that won no pixel.
    pub fn average(&self) -> Option<Rgb> {
        self.average
    }

    #[inline]
    fn raster_key(&self, width: usize) -> usize {
        self.x + self.y * width
    }

    #[inline]
    fn distance_sq(&self, x: usize, y: usize) -> u64 {
        let dx = self.x.abs_diff(x) as u64;
        let dy = self.y.abs_diff(y) as u64;
        dx * dx + dy * dy
    }

    fn add(&mut self, rgb: Rgb) {
        for c in 0..3 {
            self.sums[c] += rgb[c] as u64;
        }
        self.count += 1;
    }

    fn finalize(&mut self) {
        if self.count > 0 {
            self.average = Some([
                (self.sums[0] / self.count) as u8,
                (self.sums[1] / self.count) as u8,
                (self.sums[2] / self.count) as u8,
            ]);
        }
    }
}

// ============================================================================
// Mosaic
// ============================================================================

/// How the nearest seed is looked up for each pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SeedSearch {
    #[default]
    Windowed,
    Exact,
}

/// Seed clustering computed for one image.
///
/// Built by [`Mosaic::initialize`]; afterwards it answers per-pixel queries
/// through [`PixelFilter`] and maps whole images through [`ImageEffect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mosaic {
    search: SeedSearch,
    width: usize,
    height: usize,
    seeds: Vec<Seed>,
    /// (height, width) index into `seeds`; empty when there are no seeds.
    assignment: Array2<usize>,
}

impl Mosaic {
    /// Cluster `image` around `seed_count` random seeds with the windowed search.
    pub fn initialize<X, Y>(
        seed_count: usize,
        image: &PixelBuffer,
        rng_x: &mut X,
        rng_y: &mut Y,
    ) -> Result<Self>
    where
        X: RandomSource + ?Sized,
        Y: RandomSource + ?Sized,
    {
        Self::initialize_with(SeedSearch::Windowed, seed_count, image, rng_x, rng_y)
    }

    /// Cluster `image` with an explicit search strategy.
    pub fn initialize_with<X, Y>(
        search: SeedSearch,
        seed_count: usize,
        image: &PixelBuffer,
        rng_x: &mut X,
        rng_y: &mut Y,
    ) -> Result<Self>
    where
        X: RandomSource + ?Sized,
        Y: RandomSource + ?Sized,
    {
        let (width, height) = (image.width(), image.height());

        if seed_count == 0 {
            return Ok(Mosaic {
                search,
                width,
                height,
                seeds: Vec::new(),
                assignment: Array2::zeros((0, 0)),
            });
        }
        if width == 0 || height == 0 {
            return Err(EditorError::invalid_input(format!(
                "cannot place {seed_count} seeds on a {width}x{height} image"
            )));
        }

        let mut seeds: Vec<Seed> = (0..seed_count)
            .map(|_| {
                let x = rng_x.next_below(width);
                let y = rng_y.next_below(height);
                Seed::new(x, y)
            })
            .collect();
        tracing::trace!(seeds = seed_count, ?search, "mosaic seeds placed");

        // Seeds never move, so this order holds for every pixel.
        seeds.sort_by_key(|seed| seed.raster_key(width));

        let mut assignment = Array2::<usize>::zeros((height, width));
        for x in 0..width {
            for y in 0..height {
                let window = match search {
                    SeedSearch::Windowed => search_window(seed_count, x, y, width, height),
                    SeedSearch::Exact => 0..seed_count,
                };
                let winner = nearest_in(&seeds, window, x, y);
                seeds[winner].add(image.pixel_unchecked(x, y));
                assignment[[y, x]] = winner;
            }
        }

        for seed in &mut seeds {
            seed.finalize();
        }
        tracing::trace!(
            used = seeds.iter().filter(|s| s.average.is_some()).count(),
            "mosaic clusters averaged"
        );

        Ok(Mosaic {
            search,
            width,
            height,
            seeds,
            assignment,
        })
    }

    pub fn search(&self) -> SeedSearch {
        self.search
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    /// Seeds in raster-key order, after averaging.
    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    /// Seed that pixel `(x, y)` was assigned to.
    pub fn seed_for(&self, x: usize, y: usize) -> Option<&Seed> {
        if self.seeds.is_empty() || x >= self.width || y >= self.height {
            return None;
        }
        self.seeds.get(self.assignment[[y, x]])
    }
}

/// Half-open range of seed positions to scan for pixel `(x, y)`.
fn search_window(k: usize, x: usize, y: usize, width: usize, height: usize) -> Range<usize> {
    let ratio = (width * height / k).max(1);
    let guess = ((x + y * width) / ratio) as isize;
    let quarter = (k / 4) as isize;
    let k = k as isize;

    let mut lower = guess - quarter;
    let mut upper = guess + quarter;
    if lower < 0 || lower >= k {
        lower = 0;
    }
    if upper < 0 || upper >= k {
        upper = k;
    }
    lower as usize..upper as usize
}

/// Closest seed among `window`, starting from the seed at `window.start`.
fn nearest_in(seeds: &[Seed], window: Range<usize>, x: usize, y: usize) -> usize {
    let mut best = window.start;
    let mut best_dist = seeds[best].distance_sq(x, y);
    for i in window {
        let dist = seeds[i].distance_sq(x, y);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

impl PixelFilter for Mosaic {
    fn name(&self) -> &'static str {
        "mosaic"
    }

    fn new_color_at(&self, x: usize, y: usize, source: &PixelBuffer) -> Result<Rgb> {
        source.check_bounds(x, y)?;
        if self.seeds.is_empty() {
            return Ok(source.pixel_unchecked(x, y));
        }
        let seed = self.seed_for(x, y).ok_or(EditorError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        seed.average()
            .ok_or_else(|| EditorError::invalid_state("pixel assigned to an empty seed"))
    }
}

impl ImageEffect for Mosaic {
    fn name(&self) -> &'static str {
        "mosaic"
    }

    fn applies_to_all(&self) -> bool {
        false
    }

    fn apply_effect(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        self.apply(source)
    }
}
