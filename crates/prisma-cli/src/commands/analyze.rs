//! Offline feature extraction over a WAV file.

use anyhow::{Context, bail};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};

use prisma_core::{Spectrogram, SpectrogramBank};

use crate::preset::{Preset, RegisteredModule, build_group, module_value};
use crate::stft::StftFrontEnd;

/// Arguments of the `analyze` subcommand.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Analysis preset (TOML); the factory default when omitted
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Write the full per-frame feature timeline as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the feature values of every N-th frame
    #[arg(long, default_value = "0", value_name = "N")]
    print_every: usize,
}

/// JSON report written by `--output`.
#[derive(Serialize)]
struct Report {
    input: String,
    preset: String,
    sample_rate: f32,
    fft_size: usize,
    hop_size: usize,
    frames: usize,
    /// One map of label → value per analyzed frame.
    timeline: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Reads a WAV file as a mono f32 signal.
///
/// Integer formats are normalized to [-1, 1]; multi-channel audio is mixed
/// down by averaging.
fn read_wav_mono(path: &Path) -> anyhow::Result<(Vec<f32>, f32)> {
    let reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let mono: Vec<f32> = if channels <= 1 {
        samples
    } else {
        samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    Ok((mono, spec.sample_rate as f32))
}

fn frame_values(
    group: &prisma_core::ModuleGroup,
    registered: &[RegisteredModule],
) -> serde_json::Map<String, serde_json::Value> {
    registered
        .iter()
        .map(|module| (module.label.clone(), module_value(group, module)))
        .collect()
}

/// Runs the `analyze` subcommand.
pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let preset = match &args.preset {
        Some(path) => Preset::load(path)?,
        None => Preset::factory_default(),
    };
    let window = preset.window_fn()?;
    if preset.hop_size == 0 {
        bail!("preset '{}' has a zero hop size", preset.name);
    }

    let (samples, sample_rate) = read_wav_mono(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        preset = preset.name,
        samples = samples.len(),
        sample_rate,
        "starting analysis"
    );

    let mut front = StftFrontEnd::new(preset.fft_size, preset.hop_size, window);
    let mut bank = SpectrogramBank::new();
    let source = bank.insert(Spectrogram::new(
        sample_rate,
        preset.fft_size,
        preset.history,
    )?);
    let (mut group, registered) = build_group(&preset, source)?;

    let num_frames = front.num_frames(samples.len());
    if num_frames == 0 {
        bail!(
            "input is shorter than one FFT frame ({} samples)",
            preset.fft_size
        );
    }

    let progress = ProgressBar::new(num_frames as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} frames ({eta})")
            .expect("static progress template"),
    );

    let mut timeline = Vec::with_capacity(if args.output.is_some() { num_frames } else { 0 });
    for index in 0..num_frames {
        let start = index * preset.hop_size;
        let magnitudes = front.magnitudes(&samples[start..start + preset.fft_size]);
        bank.get_mut(source)
            .expect("source was just inserted")
            .push_frame(magnitudes)?;
        let summary = group.run(&bank);
        if summary.skipped > 0 {
            tracing::warn!(frame = index, skipped = summary.skipped, "modules skipped");
        }

        if args.output.is_some() {
            timeline.push(frame_values(&group, &registered));
        }
        if args.print_every > 0 && index % args.print_every == 0 {
            let t = start as f32 / sample_rate;
            println!(
                "[{t:8.3}s] {}",
                serde_json::to_string(&frame_values(&group, &registered))?
            );
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "{}: {} frames @ {:.1} fps ({} modules)",
        args.input.display(),
        num_frames,
        sample_rate / preset.hop_size as f32,
        registered.len()
    );
    println!("final frame:");
    for module in &registered {
        println!("  {:24} {}", module.label, module_value(&group, module));
    }

    if let Some(path) = &args.output {
        let report = Report {
            input: args.input.display().to_string(),
            preset: preset.name.clone(),
            sample_rate,
            fft_size: preset.fft_size,
            hop_size: preset.hop_size,
            frames: num_frames,
            timeline,
        };
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report)?;
        println!("report written to {}", path.display());
    }
    Ok(())
}
