//! Config assembly, decoding and subcommand dispatch.

use std::path::Path;

use anyhow::{Context, Result};
use ct_analysis::Pipeline;
use ct_core::{AnalysisConfig, Waveform};

use crate::cli::{Cli, Command};
use crate::output;

/// Build the effective configuration: file (or defaults), then CLI overrides.
///
/// # Errors
/// Returns an error if the file cannot be read or the result does not validate.
pub fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match cli.config {
        Some(ref path) => AnalysisConfig::load(path)
            .with_context(|| format!("Cannot load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(d) = cli.frame_duration {
        config.frame_duration = d;
    }
    if let Some(c) = cli.cutoff {
        config.cutoff_quefrency = c;
    }
    if cli.hop_fraction.is_some() {
        config.hop_fraction = cli.hop_fraction;
    }
    if let Some(t) = cli.tracker {
        config.tracker.mode = t.into();
    }
    if let Command::Tune {
        range,
        sequential,
        timeout,
        ..
    } = &cli.command
    {
        if let Some(r) = range {
            config.tuner.quefrency_min = r.min;
            config.tuner.quefrency_max = r.max;
        }
        if *sequential {
            config.tuner.parallel = false;
        }
        if timeout.is_some() {
            config.tuner.timeout_secs = *timeout;
        }
    }

    config.validate().context("Invalid configuration")?;
    log::debug!("Effective config: {config:?}");
    Ok(config)
}

/// Decode the input file.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn load_waveform(path: &Path) -> Result<Waveform> {
    ct_source::decode(path).with_context(|| format!("Cannot decode {}", path.display()))
}

/// Run the selected subcommand and print its result.
///
/// # Errors
/// Returns an error if decoding or analysis fails.
pub fn run(cli: &Cli, config: AnalysisConfig) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    match &cli.command {
        Command::Tracks { file } => {
            let wave = load_waveform(file)?;
            let analysis = pipeline.run(&wave).context("Formant analysis failed")?;
            output::print_tracks(&analysis, cli.format)
        }
        Command::Formants { file } => {
            let wave = load_waveform(file)?;
            let analysis = pipeline.run(&wave).context("Formant analysis failed")?;
            output::print_formants(&analysis, cli.format)
        }
        Command::Tune { file, expected, .. } => {
            let wave = load_waveform(file)?;
            let tuner = &pipeline.config().tuner;
            log::info!(
                "Tuning cutoff over {}..={} against {expected:?}",
                tuner.quefrency_min,
                tuner.quefrency_max
            );
            let report = pipeline
                .tune(&wave, expected, tuner.quefrency_min..=tuner.quefrency_max)
                .context("Cutoff tuning failed")?;
            output::print_report(&report, cli.format)
        }
    }
}
