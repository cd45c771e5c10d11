//! Class-based tracking: every candidate joins the track with the closest tail.
//!
//! The first frame holding any candidate seeds one track per candidate.
//! Later candidates are always assigned to an existing track, however far
//! away it is; tracks are never started or closed after seeding. Exact ties
//! go to the track created first. Tails move as soon as a candidate is
//! appended, so two candidates of one frame may chain onto the same track.

use ct_core::Result;

use crate::Tracker;
use crate::point::{FormantTrack, FrameCandidates};

/// Assign candidates frame by frame to the nearest track tail.
///
/// # Example
/// ```
/// use ct_track::{FrameCandidates, track_by_class};
/// let frames = vec![
///     FrameCandidates { time: 0.0, bins: vec![300, 900] },
///     FrameCandidates { time: 0.1, bins: vec![880] },
/// ];
/// let tracks = track_by_class(&frames);
/// assert_eq!(tracks.len(), 2);
/// assert_eq!(tracks[1].len(), 2);
/// ```
#[must_use]
pub fn track_by_class(frames: &[FrameCandidates]) -> Vec<FormantTrack> {
    let mut frames = frames.iter().skip_while(|f| f.bins.is_empty());
    let Some(seed) = frames.next() else {
        return Vec::new();
    };
    let mut tracks: Vec<FormantTrack> = seed.points().map(FormantTrack::new).collect();

    for frame in frames {
        for point in frame.points() {
            let mut best = 0;
            let mut best_d = f64::INFINITY;
            for (i, t) in tracks.iter().enumerate() {
                let d = (t.tail().freq - point.freq).abs();
                if d < best_d {
                    best = i;
                    best_d = d;
                }
            }
            tracks[best].push(point);
        }
    }

    log::debug!("Assigned candidates to {} class tracks", tracks.len());
    tracks
}

/// [`Tracker`] wrapper around [`track_by_class`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTracker;

impl Tracker for ClassTracker {
    fn track(&self, frames: &[FrameCandidates]) -> Result<Vec<FormantTrack>> {
        Ok(track_by_class(frames))
    }

    fn name(&self) -> &'static str {
        "class"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::TfPoint;

    fn frame(time: f64, bins: &[usize]) -> FrameCandidates {
        FrameCandidates {
            time,
            bins: bins.to_vec(),
        }
    }

    fn freqs(track: &FormantTrack) -> Vec<f64> {
        track.points().iter().map(|p| p.freq).collect()
    }

    #[test]
    fn first_frame_seeds_tracks() {
        let tracks = track_by_class(&[frame(0.0, &[300, 900, 2500])]);
        assert_eq!(tracks.len(), 3);
        assert!(tracks.iter().all(|t| t.len() == 1));
    }

    #[test]
    fn candidates_follow_nearest_tail() {
        let tracks = track_by_class(&[
            frame(0.0, &[300, 900]),
            frame(0.1, &[320, 870]),
            frame(0.2, &[350, 840]),
        ]);
        assert_eq!(freqs(&tracks[0]), vec![300.0, 320.0, 350.0]);
        assert_eq!(freqs(&tracks[1]), vec![900.0, 870.0, 840.0]);
        assert_eq!(tracks[1].tail(), TfPoint::new(0.2, 840.0));
    }

    #[test]
    fn far_candidates_are_still_forced_onto_a_track() {
        let tracks = track_by_class(&[frame(0.0, &[300]), frame(0.1, &[3000])]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(freqs(&tracks[0]), vec![300.0, 3000.0]);
    }

    #[test]
    fn exact_tie_goes_to_first_track() {
        let tracks = track_by_class(&[frame(0.0, &[400, 600]), frame(0.1, &[500])]);
        assert_eq!(tracks[0].len(), 2);
        assert_eq!(tracks[1].len(), 1);
    }

    #[test]
    fn tails_update_within_a_frame() {
        // 340 joins 300; 380 is then closer to the new tail than to 500.
        let tracks = track_by_class(&[frame(0.0, &[300, 500]), frame(0.1, &[340, 380])]);
        assert_eq!(freqs(&tracks[0]), vec![300.0, 340.0, 380.0]);
        assert_eq!(tracks[1].len(), 1);
    }

    #[test]
    fn leading_empty_frames_are_skipped() {
        let tracks = track_by_class(&[frame(0.0, &[]), frame(0.1, &[700]), frame(0.2, &[710])]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].points()[0].time, 0.1);
    }

    #[test]
    fn no_candidates_no_tracks() {
        assert!(track_by_class(&[]).is_empty());
        assert!(track_by_class(&[frame(0.0, &[]), frame(0.1, &[])]).is_empty());
    }
}
