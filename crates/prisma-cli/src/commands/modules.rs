//! Lists the available analysis modules.

use clap::Args;

/// Arguments of the `modules` subcommand.
#[derive(Args)]
pub struct ModulesArgs {}

struct ModuleInfo {
    name: &'static str,
    output: &'static str,
    params: &'static str,
    description: &'static str,
}

const MODULES: &[ModuleInfo] = &[
    ModuleInfo {
        name: "max-amplitude",
        output: "float",
        params: "-",
        description: "largest magnitude in the window",
    },
    ModuleInfo {
        name: "mean-amplitude",
        output: "float",
        params: "-",
        description: "mean magnitude of the window",
    },
    ModuleInfo {
        name: "total-amplitude",
        output: "float",
        params: "-",
        description: "summed magnitude of the window",
    },
    ModuleInfo {
        name: "centroid",
        output: "float (Hz)",
        params: "-",
        description: "magnitude-weighted mean frequency (brightness)",
    },
    ModuleInfo {
        name: "noisiness",
        output: "float [0,1]",
        params: "flatness",
        description: "noise-likeness; entropy by default, flatness when flatness=1",
    },
    ModuleInfo {
        name: "delta-amplitudes",
        output: "float array",
        params: "-",
        description: "per-bin change against the previous frame",
    },
    ModuleInfo {
        name: "bread-slicer",
        output: "float array",
        params: "bands (required)",
        description: "summed magnitude per configured frequency slice",
    },
    ModuleInfo {
        name: "salient-freqs",
        output: "bin array",
        params: "max_freqs, threshold",
        description: "dominant bins above a threshold, strongest first",
    },
    ModuleInfo {
        name: "major-peaks",
        output: "peak array",
        params: "max_peaks",
        description: "strongest local maxima, amplitude-sorted",
    },
    ModuleInfo {
        name: "formants",
        output: "vowel char",
        params: "-",
        description: "vowel classification by formant-profile matching",
    },
    ModuleInfo {
        name: "percussion-detection",
        output: "bool",
        params: "energy_threshold, flux_threshold, entropy_threshold",
        description: "thresholded transient flag",
    },
    ModuleInfo {
        name: "vocal-detection",
        output: "int code",
        params: "min_score, history_frames",
        description: "vowel classification over recent history (-1 = none)",
    },
];

/// Runs the `modules` subcommand.
pub fn run(_args: ModulesArgs) -> anyhow::Result<()> {
    println!("{:24} {:14} {}", "MODULE", "OUTPUT", "DESCRIPTION");
    for info in MODULES {
        println!("{:24} {:14} {}", info.name, info.output, info.description);
        if info.params != "-" {
            println!("{:24} {:14}   params: {}", "", "", info.params);
        }
    }
    Ok(())
}
