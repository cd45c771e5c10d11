//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ct_core::TrackerMode;

/// Cepstral formant extraction and tracking.
#[derive(Debug, Parser)]
#[command(name = "cepstrack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file; flags below override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis frame length in seconds.
    #[arg(long, global = true)]
    pub frame_duration: Option<f64>,

    /// Lifter cutoff quefrency (samples).
    #[arg(long, global = true)]
    pub cutoff: Option<usize>,

    /// Hop as a fraction of the frame length (omit for no overlap).
    #[arg(long, global = true)]
    pub hop_fraction: Option<f64>,

    /// Tracking strategy.
    #[arg(long, global = true, value_enum)]
    pub tracker: Option<TrackerArg>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every formant track.
    Tracks { file: PathBuf },
    /// Print the ascending mean formant frequencies.
    Formants { file: PathBuf },
    /// Search the cutoff that best reproduces known formants.
    Tune {
        file: PathBuf,
        /// Reference formants in Hz, ascending, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        expected: Vec<f64>,
        /// Inclusive cutoff range, `MIN..=MAX` or `MIN-MAX`.
        #[arg(long, value_parser = parse_range)]
        range: Option<CutoffRange>,
        /// Score cutoffs one at a time instead of on the thread pool.
        #[arg(long)]
        sequential: bool,
        /// Give up on cutoffs not started after this many seconds.
        #[arg(long)]
        timeout: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackerArg {
    Cluster,
    Class,
}

impl From<TrackerArg> for TrackerMode {
    fn from(arg: TrackerArg) -> Self {
        match arg {
            TrackerArg::Cluster => Self::Cluster,
            TrackerArg::Class => Self::Class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Toml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffRange {
    pub min: usize,
    pub max: usize,
}

fn parse_range(s: &str) -> Result<CutoffRange, String> {
    let (lo, hi) = s
        .split_once("..=")
        .or_else(|| s.split_once('-'))
        .ok_or_else(|| format!("expected MIN..=MAX, got {s:?}"))?;
    let min = lo
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad range start {lo:?}: {e}"))?;
    let max = hi
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad range end {hi:?}: {e}"))?;
    if min > max {
        return Err(format!("range {min}..={max} is empty"));
    }
    Ok(CutoffRange { min, max })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_range_spellings() {
        assert_eq!(
            parse_range("10..=150").unwrap(),
            CutoffRange { min: 10, max: 150 }
        );
        assert_eq!(parse_range("5-9").unwrap(), CutoffRange { min: 5, max: 9 });
        assert!(parse_range("9..=5").is_err());
        assert!(parse_range("ten").is_err());
    }

    #[test]
    fn tune_takes_comma_separated_formants() {
        let cli = Cli::try_parse_from([
            "cepstrack",
            "tune",
            "aaa.wav",
            "--expected",
            "700,1200,2600",
            "--range",
            "20..=60",
            "--format",
            "toml",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Toml);
        let Command::Tune {
            expected, range, ..
        } = cli.command
        else {
            panic!("expected tune");
        };
        assert_eq!(expected, vec![700.0, 1200.0, 2600.0]);
        assert_eq!(range, Some(CutoffRange { min: 20, max: 60 }));
    }

    #[test]
    fn global_overrides_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cepstrack",
            "tracks",
            "aaa.wav",
            "--cutoff",
            "40",
            "--tracker",
            "class",
        ])
        .unwrap();
        assert_eq!(cli.cutoff, Some(40));
        assert_eq!(cli.tracker, Some(TrackerArg::Class));
    }

    #[test]
    fn tune_requires_expected() {
        assert!(Cli::try_parse_from(["cepstrack", "tune", "aaa.wav"]).is_err());
    }
}
