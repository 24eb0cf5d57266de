//! Standalone diagnostic binary: initializes the HAL, prints what it
//! found, and exits. Useful for sanity-checking a new deployment target
//! before pointing the engine at it.

use clap::Parser;
use neuronos_hal_core::{BackendType, Profile};

#[derive(Parser)]
#[command(name = "neuronos-hal-probe")]
#[command(about = "Probe this host's CPU/GPU capabilities and print the NeuronOS HAL's backend selection", long_about = None)]
struct Cli {
    /// Emit the diagnostic report as JSON instead of a human-readable table.
    #[arg(long)]
    json: bool,

    /// Force-select a specific backend type after init, instead of the selector's default choice.
    #[arg(long, value_parser = ["scalar", "avx2", "avx-vnni", "neon", "riscv-vector", "wasm-simd", "gpu"])]
    select: Option<String>,

    /// Build profile to classify the device tier under. Defaults to the
    /// profile this binary was itself compiled with.
    #[arg(long, value_parser = ["full", "lite", "minimal"])]
    profile: Option<String>,
}

fn parse_backend_type(s: &str) -> BackendType {
    match s {
        "scalar" => BackendType::Scalar,
        "avx2" => BackendType::Avx2,
        "avx-vnni" => BackendType::AvxVnni,
        "neon" => BackendType::Neon,
        "riscv-vector" => BackendType::RiscvVector,
        "wasm-simd" => BackendType::WasmSimd,
        "gpu" => BackendType::Gpu,
        _ => unreachable!("validated by clap's value_parser"),
    }
}

fn parse_profile(s: &str) -> Profile {
    match s {
        "lite" => Profile::Lite,
        "minimal" => Profile::Minimal,
        _ => Profile::Full,
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = neuronos_hal::init() {
        eprintln!("neuronos-hal-probe: init failed: {e}");
        std::process::exit(1);
    }

    if let Some(target) = cli.select {
        let backend_type = parse_backend_type(&target);
        if let Err(e) = neuronos_hal::select_backend(backend_type) {
            eprintln!("neuronos-hal-probe: select_backend({target}) failed: {e}");
        }
    }

    let profile = cli.profile.as_deref().map(parse_profile).unwrap_or_else(neuronos_hal::compile_time_profile);
    let tier = neuronos_hal::detect_device_tier(profile);
    if cli.json {
        let mut report = neuronos_hal::print_info_json();
        if let Some(obj) = report.as_object_mut() {
            obj.insert("device_tier".to_string(), serde_json::json!(format!("{:?}", tier)));
        }
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        neuronos_hal::print_info();
        println!("device tier: {tier:?}");
    }

    neuronos_hal::shutdown();
}
