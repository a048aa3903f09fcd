use super::correlation::CorrelationMatrix;
use crate::data::table::SeriesTable;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster count must be in [2, {n}], got {k}")]
    InvalidClusterCount { k: usize, n: usize },
    #[error("need at least 2 instruments, got {0}")]
    TooFewInstruments(usize),
    #[error("correlation matrix has undefined entries; cannot build linkage features")]
    UndefinedCorrelation,
    #[error("no timestamp has observations for every instrument")]
    NoCompleteRows,
}

pub type Result<T> = std::result::Result<T, ClusterError>;

const MAX_ITERATIONS: usize = 100;

/// One agglomerative merge. Cluster ids follow the usual linkage-matrix
/// convention: leaves are 0..n in label order, and the merge recorded at
/// step s creates cluster n + s.
#[derive(Debug, Clone, Serialize)]
pub struct MergeStep {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Linkage {
    pub labels: Vec<String>,
    pub steps: Vec<MergeStep>,
}

/// Flat partition from k-means: one cluster id in [0, k) per instrument.
/// Ids carry no ordering semantics.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAssignment {
    pub labels: Vec<String>,
    pub clusters: Vec<usize>,
    pub k: usize,
}

impl ClusterAssignment {
    pub fn members(&self, cluster: usize) -> Vec<&str> {
        self.labels
            .iter()
            .zip(&self.clusters)
            .filter(|(_, &c)| c == cluster)
            .map(|(label, _)| label.as_str())
            .collect()
    }
}

pub struct ClusterEngine;

impl ClusterEngine {
    /// Ward agglomerative linkage. Each instrument's correlation-matrix
    /// row is its feature vector; merges minimize the within-cluster
    /// variance increase, via the Lance-Williams recurrence on squared
    /// Euclidean distances. Undefined matrix entries cannot form feature
    /// vectors and are rejected up front.
    pub fn ward_linkage(matrix: &CorrelationMatrix) -> Result<Linkage> {
        let n = matrix.len();
        if n < 2 {
            return Err(ClusterError::TooFewInstruments(n));
        }

        let mut features = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                features[[i, j]] = matrix
                    .get(i, j)
                    .ok_or(ClusterError::UndefinedCorrelation)?;
            }
        }

        // Squared inter-cluster distances, indexed by cluster id. Slots
        // n.. are filled as merges create new clusters.
        let total = 2 * n - 1;
        let mut d2 = vec![vec![0.0_f64; total]; total];
        for i in 0..n {
            for j in (i + 1)..n {
                let dist2 = features
                    .row(i)
                    .iter()
                    .zip(features.row(j).iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>();
                d2[i][j] = dist2;
                d2[j][i] = dist2;
            }
        }

        let mut size = vec![0_usize; total];
        for s in size.iter_mut().take(n) {
            *s = 1;
        }
        let mut active: Vec<usize> = (0..n).collect();
        let mut steps = Vec::with_capacity(n - 1);

        for step in 0..(n - 1) {
            let mut best = f64::INFINITY;
            let (mut best_a, mut best_b) = (0, 0);
            for (pos, &a) in active.iter().enumerate() {
                for &b in &active[pos + 1..] {
                    if d2[a][b] < best {
                        best = d2[a][b];
                        best_a = a;
                        best_b = b;
                    }
                }
            }

            let new_id = n + step;
            let (na, nb) = (size[best_a] as f64, size[best_b] as f64);
            for &k in &active {
                if k == best_a || k == best_b {
                    continue;
                }
                let nk = size[k] as f64;
                let updated = ((na + nk) * d2[best_a][k] + (nb + nk) * d2[best_b][k]
                    - nk * best)
                    / (na + nb + nk);
                d2[new_id][k] = updated;
                d2[k][new_id] = updated;
            }

            size[new_id] = size[best_a] + size[best_b];
            active.retain(|&c| c != best_a && c != best_b);
            active.push(new_id);
            steps.push(MergeStep {
                left: best_a.min(best_b),
                right: best_a.max(best_b),
                distance: best.sqrt(),
                size: size[new_id],
            });
        }

        Ok(Linkage {
            labels: matrix.names().to_vec(),
            steps,
        })
    }

    /// K-means over instruments' observation vectors, using only the
    /// timestamps where every instrument has a value so all points share
    /// one space. Seeded centroid choice makes repeated runs on the same
    /// input identical.
    pub fn partition(table: &SeriesTable, k: usize, seed: u64) -> Result<ClusterAssignment> {
        let n = table.n_instruments();
        if n < 2 {
            return Err(ClusterError::TooFewInstruments(n));
        }
        if k < 2 || k > n {
            return Err(ClusterError::InvalidClusterCount { k, n });
        }

        let complete: Vec<usize> = (0..table.len())
            .filter(|&t| (0..n).all(|i| table.column_at(i)[t].is_some()))
            .collect();
        if complete.is_empty() {
            return Err(ClusterError::NoCompleteRows);
        }

        let dim = complete.len();
        let mut points = Array2::zeros((n, dim));
        for i in 0..n {
            let column = table.column_at(i);
            for (d, &t) in complete.iter().enumerate() {
                points[[i, d]] = column[t].unwrap();
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let picks = rand::seq::index::sample(&mut rng, n, k).into_vec();
        let mut centroids = Array2::zeros((k, dim));
        for (c, &p) in picks.iter().enumerate() {
            centroids.row_mut(c).assign(&points.row(p));
        }

        let mut assignment = vec![usize::MAX; n];
        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;
            for i in 0..n {
                let mut nearest = 0;
                let mut nearest_d2 = f64::INFINITY;
                for c in 0..k {
                    let d2 = points
                        .row(i)
                        .iter()
                        .zip(centroids.row(c).iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum::<f64>();
                    if d2 < nearest_d2 {
                        nearest_d2 = d2;
                        nearest = c;
                    }
                }
                if assignment[i] != nearest {
                    assignment[i] = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            for c in 0..k {
                let members: Vec<usize> =
                    (0..n).filter(|&i| assignment[i] == c).collect();
                // An emptied cluster keeps its previous centroid.
                if members.is_empty() {
                    continue;
                }
                let mut mean = Array1::zeros(dim);
                for &i in &members {
                    mean += &points.row(i);
                }
                mean /= members.len() as f64;
                centroids.row_mut(c).assign(&mean);
            }
        }

        Ok(ClusterAssignment {
            labels: table.names().to_vec(),
            clusters: assignment,
            k,
        })
    }
}
