//! Seeded k-means clustering over embeddings.
//!
//! Lloyd's algorithm with k-means++ seeding. The whole fit is repeated
//! `n_init` times from one seeded RNG and the run with the lowest inertia
//! (sum of squared distances to the assigned centroid) wins, which makes the
//! result reproducible for a fixed seed and much less sensitive to a single
//! unlucky initialisation.
//!
//! Labels are not canonicalised: cluster 0 is whichever centroid k-means++
//! picked first in the winning run. Other k-means implementations with the
//! same seed will generally number clusters differently.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, Result};

/// Result of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster label per input point, in input order.
    pub labels: Vec<usize>,
    /// Final centroids, indexed by label.
    pub centroids: Vec<Vec<f32>>,
    /// Sum of squared distances to assigned centroids.
    pub inertia: f64,
    /// Lloyd iterations of the winning run.
    pub iterations: usize,
}

/// k-means configuration.
///
/// ```rust
/// use pdfchunk::KMeans;
///
/// let points = vec![vec![0.0, 0.0], vec![0.1, 0.0], vec![5.0, 5.0], vec![5.1, 5.0]];
/// let fit = KMeans::new(2).fit(&points).unwrap();
/// assert_eq!(fit.labels[0], fit.labels[1]);
/// assert_ne!(fit.labels[0], fit.labels[2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    k: usize,
    seed: u64,
    n_init: usize,
    max_iterations: usize,
    tolerance: f64,
}

impl KMeans {
    /// Seed used unless overridden.
    pub const DEFAULT_SEED: u64 = 42;
    /// Restarts used unless overridden.
    pub const DEFAULT_N_INIT: usize = 10;

    /// Cluster into `k` groups with default seed, restarts, and iteration cap.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: Self::DEFAULT_SEED,
            n_init: Self::DEFAULT_N_INIT,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of restarts.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the Lloyd iteration cap per restart.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Fit to `points`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clustering`] if `points` is empty, `k` is zero or
    /// exceeds the number of points, `n_init` is zero, or the points have
    /// inconsistent dimensions.
    pub fn fit(&self, points: &[Vec<f32>]) -> Result<KMeansFit> {
        if points.is_empty() {
            return Err(Error::Clustering("no points to cluster".to_string()));
        }
        if self.k == 0 || self.k > points.len() {
            return Err(Error::Clustering(format!(
                "k must be in 1..={} (got {})",
                points.len(),
                self.k
            )));
        }
        if self.n_init == 0 {
            return Err(Error::Clustering("n_init must be > 0".to_string()));
        }
        let dim = points[0].len();
        if let Some(bad) = points.iter().position(|p| p.len() != dim) {
            return Err(Error::Clustering(format!(
                "dimension mismatch at point {bad}: expected {dim}, got {}",
                points[bad].len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init {
            let fit = self.lloyd(points, &mut rng);
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| Error::Clustering("no k-means run completed".to_string()))
    }

    fn lloyd(&self, points: &[Vec<f32>], rng: &mut StdRng) -> KMeansFit {
        let dim = points[0].len();
        let mut centroids = kmeanspp_init(points, self.k, rng);
        let mut labels = vec![0usize; points.len()];
        let mut iterations = 0;

        for _ in 0..self.max_iterations {
            iterations += 1;

            for (label, point) in labels.iter_mut().zip(points) {
                *label = nearest_centroid(point, &centroids).0;
            }

            let mut sums = vec![vec![0.0f64; dim]; self.k];
            let mut counts = vec![0usize; self.k];
            for (&label, point) in labels.iter().zip(points) {
                counts[label] += 1;
                for (acc, &v) in sums[label].iter_mut().zip(point) {
                    *acc += f64::from(v);
                }
            }

            let mut shift = 0.0;
            for (c, sum) in sums.iter().enumerate() {
                // Empty cluster: keep previous centroid.
                if counts[c] == 0 {
                    continue;
                }
                let n = counts[c] as f64;
                let updated: Vec<f32> = sum.iter().map(|s| (s / n) as f32).collect();
                shift += squared_euclidean(&updated, &centroids[c]);
                centroids[c] = updated;
            }

            if shift <= self.tolerance * self.tolerance {
                break;
            }
        }

        // Final assignment against the final centroids.
        let mut inertia = 0.0;
        for (label, point) in labels.iter_mut().zip(points) {
            let (nearest, dist) = nearest_centroid(point, &centroids);
            *label = nearest;
            inertia += dist;
        }

        KMeansFit {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn kmeanspp_init(points: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    let mut dists: Vec<f64> = points
        .iter()
        .map(|p| squared_euclidean(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = dists.iter().sum();
        let next = if total <= 0.0 {
            // All remaining points coincide with a centroid.
            rng.gen_range(0..points.len())
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, &d) in dists.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        };

        let centroid = points[next].clone();
        for (d, p) in dists.iter_mut().zip(points) {
            *d = d.min(squared_euclidean(p, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_euclidean(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum()
}
