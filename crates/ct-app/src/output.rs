//! Result printing: human-readable text or TOML.

use anyhow::{Context, Result};
use ct_analysis::{Analysis, ScoreOutcome, TuningReport};
use ct_track::FormantTrack;
use serde::Serialize;

use crate::cli::OutputFormat;

#[derive(Serialize)]
struct TracksOut<'a> {
    cutoff: usize,
    tracks: Vec<TrackOut<'a>>,
}

#[derive(Serialize)]
struct TrackOut<'a> {
    mean_frequency: f64,
    #[serde(flatten)]
    track: &'a FormantTrack,
}

#[derive(Serialize)]
struct FormantsOut<'a> {
    cutoff: usize,
    mean_formants: &'a [f64],
}

fn to_toml<T: Serialize>(value: &T) -> Result<String> {
    toml::to_string(value).context("Cannot serialize result as TOML")
}

pub fn render_tracks(analysis: &Analysis, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Toml => to_toml(&TracksOut {
            cutoff: analysis.cutoff,
            tracks: analysis
                .tracks
                .iter()
                .map(|track| TrackOut {
                    mean_frequency: track.mean_frequency(),
                    track,
                })
                .collect(),
        }),
        OutputFormat::Text => {
            let mut out = format!(
                "{} tracks at cutoff {}\n",
                analysis.tracks.len(),
                analysis.cutoff
            );
            for (i, track) in analysis.tracks.iter().enumerate() {
                out.push_str(&format!(
                    "track {}: {} points, mean {:.1} Hz\n",
                    i + 1,
                    track.len(),
                    track.mean_frequency()
                ));
                for p in track.points() {
                    out.push_str(&format!("  {:>8.3} s  {:>6.0} Hz\n", p.time, p.freq));
                }
            }
            Ok(out)
        }
    }
}

pub fn render_formants(analysis: &Analysis, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Toml => to_toml(&FormantsOut {
            cutoff: analysis.cutoff,
            mean_formants: &analysis.mean_formants,
        }),
        OutputFormat::Text => {
            let mut out = String::new();
            for (i, f) in analysis.mean_formants.iter().enumerate() {
                out.push_str(&format!("F{} {f:.1} Hz\n", i + 1));
            }
            Ok(out)
        }
    }
}

pub fn render_report(report: &TuningReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Toml => to_toml(report),
        OutputFormat::Text => {
            let mut out = format!(
                "best cutoff {} (error {:.1} Hz)\n",
                report.best.cutoff, report.best.error
            );
            for score in &report.scores {
                let line = match score.outcome {
                    ScoreOutcome::Scored(e) => format!("{:>5}  {e:.1}\n", score.cutoff),
                    ScoreOutcome::Insufficient => format!("{:>5}  -\n", score.cutoff),
                    ScoreOutcome::Skipped => format!("{:>5}  skipped\n", score.cutoff),
                };
                out.push_str(&line);
            }
            Ok(out)
        }
    }
}

/// # Errors
/// Returns an error if TOML serialization fails.
pub fn print_tracks(analysis: &Analysis, format: OutputFormat) -> Result<()> {
    print!("{}", render_tracks(analysis, format)?);
    Ok(())
}

/// # Errors
/// Returns an error if TOML serialization fails.
pub fn print_formants(analysis: &Analysis, format: OutputFormat) -> Result<()> {
    print!("{}", render_formants(analysis, format)?);
    Ok(())
}

/// # Errors
/// Returns an error if TOML serialization fails.
pub fn print_report(report: &TuningReport, format: OutputFormat) -> Result<()> {
    print!("{}", render_report(report, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_analysis::{CutoffScore, TuningResult};
    use ct_track::{FrameCandidates, TfPoint};

    fn analysis() -> Analysis {
        let mut track = FormantTrack::new(TfPoint::new(0.0, 500.0));
        track.push(TfPoint::new(0.1, 520.0));
        Analysis {
            cutoff: 35,
            frames: vec![
                FrameCandidates {
                    time: 0.0,
                    bins: vec![500],
                },
                FrameCandidates {
                    time: 0.1,
                    bins: vec![520],
                },
            ],
            tracks: vec![track],
            mean_formants: vec![510.0],
        }
    }

    #[test]
    fn text_tracks_list_points() {
        let text = render_tracks(&analysis(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("1 tracks at cutoff 35"));
        assert!(text.contains("mean 510.0 Hz"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn toml_tracks_parse_back() {
        let text = render_tracks(&analysis(), OutputFormat::Toml).unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();
        let tracks = value["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0]["points"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn formants_are_numbered() {
        let text = render_formants(&analysis(), OutputFormat::Text).unwrap();
        assert_eq!(text, "F1 510.0 Hz\n");
    }

    #[test]
    fn report_marks_unscored_cutoffs() {
        let report = TuningReport {
            best: TuningResult {
                error: 12.0,
                cutoff: 11,
            },
            scores: vec![
                CutoffScore {
                    cutoff: 10,
                    outcome: ScoreOutcome::Insufficient,
                },
                CutoffScore {
                    cutoff: 11,
                    outcome: ScoreOutcome::Scored(12.0),
                },
                CutoffScore {
                    cutoff: 12,
                    outcome: ScoreOutcome::Skipped,
                },
            ],
        };
        let text = render_report(&report, OutputFormat::Text).unwrap();
        assert!(text.starts_with("best cutoff 11"));
        assert!(text.contains("   10  -"));
        assert!(text.contains("   12  skipped"));
        assert!(render_report(&report, OutputFormat::Toml).is_ok());
    }
}
