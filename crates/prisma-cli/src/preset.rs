//! TOML analysis presets.
//!
//! A preset describes one analysis setup end to end: the STFT front-end
//! parameters and the list of modules to wire into the group, with optional
//! per-module frequency ranges and numeric parameters.
//!
//! # TOML Format
//!
//! ```toml
//! name = "voice"
//! fft_size = 1024
//! hop_size = 512
//! history = 8
//! window = "hann"
//!
//! [[modules]]
//! type = "centroid"
//! low_hz = 200.0
//! high_hz = 4000.0
//!
//! [[modules]]
//! type = "percussion-detection"
//! low_hz = 2000.0
//! high_hz = 8000.0
//! [modules.params]
//! energy_threshold = 3.0
//! flux_threshold = 1.5
//! entropy_threshold = 0.6
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use prisma_core::{AnalysisModule, GroupError, ModuleGroup, ModuleId, SpectrogramId};
use prisma_modules::{
    BreadSlicer, Centroid, DeltaAmplitudes, Formants, MajorPeaks, MaxAmplitude, MeanAmplitude,
    NoiseMetric, Noisiness, PercussionDetection, SalientFreqs, TotalAmplitude, VocalDetection,
};

use crate::stft::Window;

/// Errors raised while loading or instantiating a preset.
#[derive(Debug, Error)]
pub enum PresetError {
    /// The preset file could not be read.
    #[error("failed to read preset '{path}': {source}")]
    ReadFile {
        /// Path of the preset file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The preset file is not valid TOML for this schema.
    #[error("failed to parse preset: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The preset names a module type this build does not provide.
    #[error("unknown module type: {0}")]
    UnknownModule(String),

    /// The preset names an unknown window function.
    #[error("unknown window function: {0}")]
    UnknownWindow(String),

    /// A module's configuration is invalid.
    #[error("invalid configuration for module '{module}': {reason}")]
    InvalidModule {
        /// The offending module's type or label.
        module: String,
        /// Why the configuration was rejected.
        reason: String,
    },

    /// The engine rejected the module at registration.
    #[error("failed to register module '{module}': {source}")]
    Register {
        /// The offending module's type or label.
        module: String,
        /// Engine-side error.
        #[source]
        source: GroupError,
    },
}

fn default_fft_size() -> usize {
    1024
}

fn default_hop_size() -> usize {
    512
}

fn default_history() -> usize {
    8
}

fn default_window() -> String {
    "hann".to_string()
}

/// One analysis setup: front-end parameters plus the module list.
#[derive(Debug, Deserialize)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// FFT size of the front end.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,

    /// Hop between frames, in samples.
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,

    /// Spectrogram history depth, in frames.
    #[serde(default = "default_history")]
    pub history: usize,

    /// Window function name.
    #[serde(default = "default_window")]
    pub window: String,

    /// Modules to register, in order.
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Configuration of a single module in a preset.
#[derive(Debug, Deserialize)]
pub struct ModuleConfig {
    /// Module type name, e.g. "centroid" or "major-peaks".
    #[serde(rename = "type")]
    pub module_type: String,

    /// Label used in reports; defaults to the type name.
    #[serde(default)]
    pub label: Option<String>,

    /// Optional lower frequency bound in Hz.
    #[serde(default)]
    pub low_hz: Option<f32>,

    /// Optional upper frequency bound in Hz.
    #[serde(default)]
    pub high_hz: Option<f32>,

    /// Slice edges in Hz, for the bread-slicer module.
    #[serde(default)]
    pub bands: Option<Vec<f32>>,

    /// Module-specific numeric parameters.
    #[serde(default)]
    pub params: HashMap<String, f32>,
}

impl ModuleConfig {
    fn of_type(module_type: &str) -> Self {
        Self {
            module_type: module_type.to_string(),
            label: None,
            low_hz: None,
            high_hz: None,
            bands: None,
            params: HashMap::new(),
        }
    }

    fn param(&self, name: &str) -> Option<f32> {
        self.params.get(name).copied()
    }
}

impl Preset {
    /// Loads a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PresetError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// The window function named by the preset.
    pub fn window_fn(&self) -> Result<Window, PresetError> {
        Window::parse(&self.window).ok_or_else(|| PresetError::UnknownWindow(self.window.clone()))
    }

    /// The built-in default preset: a broad overview of the signal.
    pub fn factory_default() -> Self {
        Self {
            name: "default".to_string(),
            description: Some("general-purpose feature overview".to_string()),
            fft_size: default_fft_size(),
            hop_size: default_hop_size(),
            history: default_history(),
            window: default_window(),
            modules: vec![
                ModuleConfig::of_type("total-amplitude"),
                ModuleConfig::of_type("max-amplitude"),
                ModuleConfig::of_type("centroid"),
                ModuleConfig::of_type("noisiness"),
                ModuleConfig::of_type("major-peaks"),
                ModuleConfig::of_type("percussion-detection"),
            ],
        }
    }
}

/// The output shape a registered module reports with, used to read its
/// typed result back out of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// [`MaxAmplitude`].
    Max,
    /// [`MeanAmplitude`].
    Mean,
    /// [`TotalAmplitude`].
    Total,
    /// [`Centroid`].
    Centroid,
    /// [`Noisiness`].
    Noisiness,
    /// [`DeltaAmplitudes`].
    Delta,
    /// [`BreadSlicer`].
    BreadSlicer,
    /// [`SalientFreqs`].
    Salient,
    /// [`MajorPeaks`].
    Peaks,
    /// [`Formants`].
    Formants,
    /// [`PercussionDetection`].
    Percussion,
    /// [`VocalDetection`].
    Vocal,
}

/// A module wired into the group, addressable for report readout.
#[derive(Debug)]
pub struct RegisteredModule {
    /// Report label.
    pub label: String,
    /// Output shape of the module.
    pub kind: ModuleKind,
    /// Handle into the group.
    pub id: ModuleId,
}

fn instantiate(
    config: &ModuleConfig,
) -> Result<(Box<dyn AnalysisModule>, ModuleKind), PresetError> {
    let module: (Box<dyn AnalysisModule>, ModuleKind) = match config.module_type.as_str() {
        "max-amplitude" => (Box::new(MaxAmplitude::new()), ModuleKind::Max),
        "mean-amplitude" => (Box::new(MeanAmplitude::new()), ModuleKind::Mean),
        "total-amplitude" => (Box::new(TotalAmplitude::new()), ModuleKind::Total),
        "centroid" => (Box::new(Centroid::new()), ModuleKind::Centroid),
        "noisiness" => {
            let metric = if config.param("flatness").unwrap_or(0.0) > 0.0 {
                NoiseMetric::Flatness
            } else {
                NoiseMetric::Entropy
            };
            (Box::new(Noisiness::with_metric(metric)), ModuleKind::Noisiness)
        }
        "delta-amplitudes" => (Box::new(DeltaAmplitudes::new()), ModuleKind::Delta),
        "bread-slicer" => {
            let edges = config.bands.as_deref().ok_or_else(|| PresetError::InvalidModule {
                module: config.module_type.clone(),
                reason: "bread-slicer requires a `bands` list of slice edges in Hz".to_string(),
            })?;
            let slicer = BreadSlicer::with_bands(edges).map_err(|e| PresetError::InvalidModule {
                module: config.module_type.clone(),
                reason: e.to_string(),
            })?;
            (Box::new(slicer), ModuleKind::BreadSlicer)
        }
        "salient-freqs" => {
            let max_freqs = config.param("max_freqs").unwrap_or(3.0) as usize;
            let threshold = config.param("threshold").unwrap_or(0.0);
            (
                Box::new(SalientFreqs::with_limits(max_freqs, threshold)),
                ModuleKind::Salient,
            )
        }
        "major-peaks" => {
            let max_peaks = config.param("max_peaks").unwrap_or(4.0) as usize;
            (Box::new(MajorPeaks::with_max_peaks(max_peaks)), ModuleKind::Peaks)
        }
        "formants" => (Box::new(Formants::new()), ModuleKind::Formants),
        "percussion-detection" => {
            let mut module = PercussionDetection::new();
            if let Some(t) = config.param("energy_threshold") {
                module.set_energy_threshold(t);
            }
            if let Some(t) = config.param("flux_threshold") {
                module.set_flux_threshold(t);
            }
            if let Some(t) = config.param("entropy_threshold") {
                module.set_entropy_threshold(t);
            }
            (Box::new(module), ModuleKind::Percussion)
        }
        "vocal-detection" => {
            let mut module = VocalDetection::new();
            if let Some(s) = config.param("min_score") {
                module.set_min_score(s);
            }
            if let Some(n) = config.param("history_frames") {
                module.set_history_frames(n as usize);
            }
            (Box::new(module), ModuleKind::Vocal)
        }
        other => return Err(PresetError::UnknownModule(other.to_string())),
    };
    Ok(module)
}

/// Builds and wires the module group a preset describes.
pub fn build_group(
    preset: &Preset,
    source: SpectrogramId,
) -> Result<(ModuleGroup, Vec<RegisteredModule>), PresetError> {
    let mut group = ModuleGroup::with_default_source(source);
    let mut registered = Vec::with_capacity(preset.modules.len());
    let mut used_labels: HashMap<String, usize> = HashMap::new();

    for config in &preset.modules {
        let (module, kind) = instantiate(config)?;
        let id = group.insert(module);

        let base_label = config
            .label
            .clone()
            .unwrap_or_else(|| config.module_type.clone());
        let count = used_labels.entry(base_label.clone()).or_insert(0);
        *count += 1;
        let label = if *count == 1 {
            base_label
        } else {
            format!("{base_label}-{count}")
        };

        let result = match (config.low_hz, config.high_hz) {
            (Some(low), Some(high)) => group.add_module_in_range(id, low, high),
            (None, None) => group.add_module(id),
            (low, high) => group.add_module_in_range(
                id,
                low.unwrap_or(0.0),
                // Hz upper bounds resolve clamped, so "very large" is "up
                // to Nyquist" regardless of the front-end configuration.
                high.unwrap_or(f32::MAX / 2.0),
            ),
        };
        result.map_err(|source| PresetError::Register {
            module: label.clone(),
            source,
        })?;
        registered.push(RegisteredModule { label, kind, id });
    }
    Ok((group, registered))
}

/// Reads a registered module's current result as JSON.
pub fn module_value(group: &ModuleGroup, module: &RegisteredModule) -> serde_json::Value {
    use serde_json::{Value, json};
    let id = module.id;
    match module.kind {
        ModuleKind::Max => json_opt(group.output::<MaxAmplitude>(id)),
        ModuleKind::Mean => json_opt(group.output::<MeanAmplitude>(id)),
        ModuleKind::Total => json_opt(group.output::<TotalAmplitude>(id)),
        ModuleKind::Centroid => json_opt(group.output::<Centroid>(id)),
        ModuleKind::Noisiness => json_opt(group.output::<Noisiness>(id)),
        ModuleKind::Delta => group
            .output::<DeltaAmplitudes>(id)
            .map_or(Value::Null, |deltas| json!(deltas)),
        ModuleKind::BreadSlicer => group
            .output::<BreadSlicer>(id)
            .map_or(Value::Null, |sums| json!(sums)),
        ModuleKind::Salient => match (
            group.output::<SalientFreqs>(id),
            group.get::<SalientFreqs>(id).and_then(|m| m.amplitudes()),
        ) {
            (Some(bins), Some(amplitudes)) => json!({
                "bins": bins,
                "amplitudes": amplitudes,
            }),
            _ => Value::Null,
        },
        ModuleKind::Peaks => group.output::<MajorPeaks>(id).map_or(Value::Null, |peaks| {
            Value::Array(
                peaks
                    .iter()
                    .map(|p| json!({ "frequency": p.frequency, "amplitude": p.amplitude }))
                    .collect(),
            )
        }),
        ModuleKind::Formants => group
            .output::<Formants>(id)
            .map_or(Value::Null, |vowel| json!(vowel.as_char().to_string())),
        ModuleKind::Percussion => json_opt(group.output::<PercussionDetection>(id)),
        ModuleKind::Vocal => json_opt(group.output::<VocalDetection>(id)),
    }
}

fn json_opt<T: serde::Serialize>(value: Option<&T>) -> serde_json::Value {
    value.map_or(serde_json::Value::Null, |v| serde_json::json!(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_core::{Spectrogram, SpectrogramBank};

    #[test]
    fn parses_a_full_preset() {
        let text = r#"
            name = "voice"
            fft_size = 2048
            window = "blackman"

            [[modules]]
            type = "centroid"
            low_hz = 200.0
            high_hz = 4000.0

            [[modules]]
            type = "bread-slicer"
            bands = [0.0, 200.0, 2000.0, 8000.0]

            [[modules]]
            type = "percussion-detection"
            [modules.params]
            energy_threshold = 3.0
        "#;
        let preset: Preset = toml::from_str(text).unwrap();
        assert_eq!(preset.name, "voice");
        assert_eq!(preset.fft_size, 2048);
        assert_eq!(preset.hop_size, 512); // default
        assert_eq!(preset.modules.len(), 3);
        assert_eq!(preset.modules[1].bands.as_ref().unwrap().len(), 4);
        assert_eq!(preset.window_fn().unwrap(), Window::Blackman);
    }

    #[test]
    fn unknown_module_type_is_an_error() {
        let preset: Preset = toml::from_str(
            r#"
            name = "bad"
            [[modules]]
            type = "spectral-unicorn"
        "#,
        )
        .unwrap();
        let mut bank = SpectrogramBank::new();
        let source = bank.insert(Spectrogram::new(48_000.0, 1024, 4).unwrap());
        let err = build_group(&preset, source).unwrap_err();
        assert!(matches!(err, PresetError::UnknownModule(name) if name == "spectral-unicorn"));
    }

    #[test]
    fn factory_default_builds_and_runs() {
        let preset = Preset::factory_default();
        let mut bank = SpectrogramBank::new();
        let mut sg = Spectrogram::new(48_000.0, preset.fft_size, preset.history).unwrap();
        sg.push_frame(&vec![1.0; preset.fft_size / 2]).unwrap();
        let source = bank.insert(sg);

        let (mut group, registered) = build_group(&preset, source).unwrap();
        assert_eq!(registered.len(), preset.modules.len());

        let summary = group.run(&bank);
        assert_eq!(summary.completed, registered.len());
        for module in &registered {
            let value = module_value(&group, module);
            assert!(!value.is_null(), "module {} reported null", module.label);
        }
    }

    #[test]
    fn duplicate_labels_are_disambiguated() {
        let preset: Preset = toml::from_str(
            r#"
            name = "bands"
            [[modules]]
            type = "total-amplitude"
            low_hz = 0.0
            high_hz = 500.0
            [[modules]]
            type = "total-amplitude"
            low_hz = 500.0
            high_hz = 2000.0
        "#,
        )
        .unwrap();
        let mut bank = SpectrogramBank::new();
        let source = bank.insert(Spectrogram::new(48_000.0, 1024, 4).unwrap());
        let (_group, registered) = build_group(&preset, source).unwrap();
        assert_eq!(registered[0].label, "total-amplitude");
        assert_eq!(registered[1].label, "total-amplitude-2");
    }
}
