//! Time/frequency points, per-frame candidates and formant tracks.

use std::cmp::Ordering;

use serde::Serialize;

/// One formant candidate placed in the time/frequency plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TfPoint {
    /// Seconds from the start of the waveform.
    pub time: f64,
    /// Hz (envelope bin index).
    pub freq: f64,
}

impl TfPoint {
    #[must_use]
    pub fn new(time: f64, freq: f64) -> Self {
        Self { time, freq }
    }

    /// Lexicographic order on `(time, freq)`.
    #[must_use]
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.freq.total_cmp(&other.freq))
    }

    /// Weighted Chebyshev distance `max(|Δt|·w, |Δf|/w)`.
    ///
    /// Small `w` favours frequency closeness over temporal closeness.
    ///
    /// # Example
    /// ```
    /// use ct_track::TfPoint;
    /// let d = TfPoint::new(0.0, 100.0).distance(&TfPoint::new(1.0, 102.0), 0.5);
    /// assert!((d - 4.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn distance(&self, other: &Self, weight: f64) -> f64 {
        let dt = (self.time - other.time).abs() * weight;
        let df = (self.freq - other.freq).abs() / weight;
        dt.max(df)
    }
}

/// Candidates detected in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCandidates {
    pub time: f64,
    /// Ascending envelope bin indices.
    pub bins: Vec<usize>,
}

impl FrameCandidates {
    pub fn points(&self) -> impl Iterator<Item = TfPoint> + '_ {
        self.bins
            .iter()
            .map(move |&b| TfPoint::new(self.time, b as f64))
    }
}

/// Time-ordered points attributed to one resonance. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormantTrack {
    points: Vec<TfPoint>,
}

impl FormantTrack {
    #[must_use]
    pub fn new(first: TfPoint) -> Self {
        Self {
            points: vec![first],
        }
    }

    pub fn push(&mut self, point: TfPoint) {
        self.points.push(point);
    }

    /// Most recent point, used to match new candidates.
    #[must_use]
    pub fn tail(&self) -> TfPoint {
        self.points[self.points.len() - 1]
    }

    #[must_use]
    pub fn points(&self) -> &[TfPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean of the frequencies.
    ///
    /// # Example
    /// ```
    /// use ct_track::{FormantTrack, TfPoint};
    /// let track = FormantTrack::new(TfPoint::new(0.3, 733.0));
    /// assert_eq!(track.mean_frequency(), 733.0);
    /// ```
    #[must_use]
    pub fn mean_frequency(&self) -> f64 {
        self.points.iter().map(|p| p.freq).sum::<f64>() / self.points.len() as f64
    }

    pub(crate) fn sort_by_time(&mut self) {
        self.points.sort_by(TfPoint::lex_cmp);
    }
}

/// Ascending mean frequency of every track holding at least `min_len` points.
#[must_use]
pub fn mean_formants(tracks: &[FormantTrack], min_len: usize) -> Vec<f64> {
    let mut means: Vec<f64> = tracks
        .iter()
        .filter(|t| t.len() >= min_len)
        .map(FormantTrack::mean_frequency)
        .collect();
    means.sort_by(f64::total_cmp);
    means
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn singleton_mean_is_exact() {
        for f in [0.0, 1.0, 433.0, 2711.5] {
            assert_eq!(FormantTrack::new(TfPoint::new(1.0, f)).mean_frequency(), f);
        }
    }

    #[test]
    fn tail_follows_pushes() {
        let mut t = FormantTrack::new(TfPoint::new(0.0, 500.0));
        t.push(TfPoint::new(0.1, 520.0));
        assert_eq!(t.tail(), TfPoint::new(0.1, 520.0));
        assert_eq!(t.len(), 2);
        assert!((t.mean_frequency() - 510.0).abs() < 1e-12);
    }

    #[test]
    fn distance_weight_trades_time_for_frequency() {
        let a = TfPoint::new(0.0, 0.0);
        let b = TfPoint::new(10.0, 5.0);
        assert!((a.distance(&b, 1.0) - 10.0).abs() < 1e-12);
        assert!((a.distance(&b, 0.1) - 50.0).abs() < 1e-9);
        assert!((a.distance(&b, 0.1) - b.distance(&a, 0.1)).abs() < 1e-12);
    }

    #[test]
    fn mean_formants_sorted_and_filtered() {
        let mut long = FormantTrack::new(TfPoint::new(0.0, 900.0));
        long.push(TfPoint::new(0.1, 1100.0));
        let short = FormantTrack::new(TfPoint::new(0.0, 300.0));
        let tracks = vec![long, short];
        assert_eq!(mean_formants(&tracks, 1), vec![300.0, 1000.0]);
        assert_eq!(mean_formants(&tracks, 2), vec![1000.0]);
    }

    #[test]
    fn frame_candidates_become_points() {
        let frame = FrameCandidates {
            time: 0.2,
            bins: vec![310, 870],
        };
        let points: Vec<TfPoint> = frame.points().collect();
        assert_eq!(
            points,
            vec![TfPoint::new(0.2, 310.0), TfPoint::new(0.2, 870.0)]
        );
    }
}
