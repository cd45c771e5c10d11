//! Greedy nearest-neighbor chaining of time/frequency points.
//!
//! Points live in an arena sorted on `(time, freq)` with a visited bitset.
//! A track starts at the smallest unvisited point and repeatedly absorbs
//! the nearest unvisited point until that point is farther than
//! `max_distance`. Ties resolve to the smaller point, so output is
//! reproducible.
//!
//! Each extension step scans the whole pool (no spatial index): quadratic
//! in the number of points per track. Fine for the tens to low hundreds of
//! candidates of an utterance, slow for hours of audio.

use ct_core::{Error, Result};

use crate::Tracker;
use crate::point::{FormantTrack, FrameCandidates, TfPoint};

/// Unvisited points, indexed by position in the sorted arena.
struct Pool {
    points: Vec<TfPoint>,
    visited: Vec<bool>,
    /// Every index below this one is visited.
    first_open: usize,
}

impl Pool {
    fn new(mut points: Vec<TfPoint>) -> Self {
        points.sort_by(TfPoint::lex_cmp);
        points.dedup_by(|a, b| a.lex_cmp(b).is_eq());
        let visited = vec![false; points.len()];
        Self {
            points,
            visited,
            first_open: 0,
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    /// Remove the lexicographically smallest unvisited point.
    fn take_first(&mut self) -> Option<TfPoint> {
        while self.first_open < self.points.len() && self.visited[self.first_open] {
            self.first_open += 1;
        }
        (self.first_open < self.points.len()).then(|| self.take(self.first_open))
    }

    /// Nearest unvisited point to `origin`; the lowest index wins ties.
    fn nearest(&self, origin: &TfPoint, weight: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate().skip(self.first_open) {
            if self.visited[i] {
                continue;
            }
            let d = origin.distance(p, weight);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best
    }

    fn take(&mut self, index: usize) -> TfPoint {
        debug_assert!(!self.visited[index], "point {index} taken twice");
        self.visited[index] = true;
        self.points[index]
    }
}

/// Chain `points` into tracks.
///
/// Duplicate points are merged. Tracks come back in creation order, each
/// sorted by time.
///
/// # Errors
/// Returns `InvalidParameter` if `distance_weight` is not a positive finite
/// number, if `max_distance` is negative or non-finite, or if a point has a
/// non-finite coordinate.
///
/// # Example
/// ```
/// use ct_track::{TfPoint, track};
/// let points = [
///     TfPoint::new(0.0, 100.0),
///     TfPoint::new(1.0, 102.0),
///     TfPoint::new(2.0, 500.0),
/// ];
/// assert_eq!(track(&points, 0.5, 1000.0).unwrap().len(), 1);
/// assert_eq!(track(&points, 0.5, 300.0).unwrap().len(), 2);
/// ```
pub fn track(
    points: &[TfPoint],
    distance_weight: f64,
    max_distance: f64,
) -> Result<Vec<FormantTrack>> {
    check_params(distance_weight, max_distance)?;
    if let Some(p) = points
        .iter()
        .find(|p| !p.time.is_finite() || !p.freq.is_finite())
    {
        return Err(Error::invalid(format!(
            "point ({}, {}) has a non-finite coordinate",
            p.time, p.freq
        )));
    }

    let mut pool = Pool::new(points.to_vec());
    let mut tracks = Vec::new();
    while let Some(start) = pool.take_first() {
        let mut track = FormantTrack::new(start);
        let mut origin = start;
        while let Some((index, d)) = pool.nearest(&origin, distance_weight) {
            if d > max_distance {
                break;
            }
            origin = pool.take(index);
            track.push(origin);
        }
        track.sort_by_time();
        tracks.push(track);
    }

    log::debug!(
        "Clustered {} points into {} tracks (w={distance_weight}, max={max_distance})",
        pool.len(),
        tracks.len()
    );
    Ok(tracks)
}

fn check_params(distance_weight: f64, max_distance: f64) -> Result<()> {
    if !distance_weight.is_finite() || distance_weight <= 0.0 {
        return Err(Error::invalid(format!(
            "distance weight must be positive, got {distance_weight}"
        )));
    }
    if !max_distance.is_finite() || max_distance < 0.0 {
        return Err(Error::invalid(format!(
            "max distance must be non-negative, got {max_distance}"
        )));
    }
    Ok(())
}

/// [`Tracker`] running [`track`] over every candidate of every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterTracker {
    distance_weight: f64,
    max_distance: f64,
}

impl ClusterTracker {
    /// # Errors
    /// Same parameter checks as [`track`].
    pub fn new(distance_weight: f64, max_distance: f64) -> Result<Self> {
        check_params(distance_weight, max_distance)?;
        Ok(Self {
            distance_weight,
            max_distance,
        })
    }
}

impl Tracker for ClusterTracker {
    fn track(&self, frames: &[FrameCandidates]) -> Result<Vec<FormantTrack>> {
        let points: Vec<TfPoint> = frames.iter().flat_map(FrameCandidates::points).collect();
        track(&points, self.distance_weight, self.max_distance)
    }

    fn name(&self) -> &'static str {
        "cluster"
    }
}
