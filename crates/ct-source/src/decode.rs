//! Container probing and PCM decoding via symphonia.
//!
//! Samples come out as `f32` normalized to `[-1, 1]` whatever the source
//! sample width. Only mono input is accepted.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use ct_core::{Error, Result, Waveform};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into a mono waveform.
///
/// # Errors
/// Returns `Io` if the file cannot be opened and `UnsupportedFormat` if the
/// container or codec is unknown, the stream is not mono, or it carries no
/// sample rate.
///
/// # Example
/// ```no_run
/// let wave = ct_source::decode(std::path::Path::new("aaa.wav")).unwrap();
/// println!("{} samples at {} Hz", wave.len(), wave.sample_rate());
/// ```
pub fn decode(path: &Path) -> Result<Waveform> {
    let file = File::open(path)?;
    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }
    let wave = decode_source(Box::new(file), &hint)?;
    log::info!(
        "Decoded {}: {} samples at {} Hz ({:.2} s)",
        path.display(),
        wave.len(),
        wave.sample_rate(),
        wave.duration()
    );
    Ok(wave)
}

/// Decode an in-memory encoded file.
///
/// # Errors
/// Same as [`decode`], minus file access.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<Waveform> {
    decode_source(Box::new(Cursor::new(bytes)), &Hint::new())
}

fn unsupported(context: &str, err: &SymphoniaError) -> Error {
    Error::UnsupportedFormat(format!("{context}: {err}"))
}

fn decode_source(source: Box<dyn MediaSource>, hint: &Hint) -> Result<Waveform> {
    let mss = MediaSourceStream::new(source, Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| unsupported("probe", &e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::UnsupportedFormat("no audio track".into()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::UnsupportedFormat("unknown sample rate".into()))?;
    if let Some(channels) = track.codec_params.channels
        && channels.count() != 1
    {
        return Err(Error::UnsupportedFormat(format!(
            "expected mono audio, got {} channels",
            channels.count()
        )));
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| unsupported("codec", &e))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(unsupported("read", &e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping corrupt packet: {msg}");
                continue;
            }
            Err(e) => return Err(unsupported("decode", &e)),
        };

        let spec = *decoded.spec();
        if spec.channels.count() != 1 {
            return Err(Error::UnsupportedFormat(format!(
                "expected mono audio, got {} channels",
                spec.channels.count()
            )));
        }
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    Waveform::new(samples, sample_rate)
}
