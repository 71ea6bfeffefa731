//! Command-line front end: reads a crystallographic input file, runs the assembler pipeline, and
//! writes the LAMMPS data and control files (or, with `--debug-dump`, a re-readable crystallographic
//! dump instead).
//!
//! Grounded on the ecosystem's clap-derive CLI convention (see `examples/other_examples/manifests/*`
//! for the stack) and `pretty_env_logger::init`, the logger the teacher's own binaries favor.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::error;

use xtalff::assembler::{self, AssemblerConfig};
use xtalff::forcefields::hybrid::ForceFieldKind;
use xtalff::XtalffError;

/// Force-field choice accepted on the command line, mirroring [`ForceFieldKind`] with the
/// hyphenated spelling `clap` renders in `--help`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ForceFieldArg {
    Uff,
    Dreiding,
}

impl From<ForceFieldArg> for ForceFieldKind {
    fn from(arg: ForceFieldArg) -> Self {
        match arg {
            ForceFieldArg::Uff => ForceFieldKind::Uff,
            ForceFieldArg::Dreiding => ForceFieldKind::Dreiding,
        }
    }
}

/// Types a periodic crystal structure with UFF or DREIDING and writes LAMMPS input files.
#[derive(Debug, Parser)]
#[command(name = "xtalff", version, about)]
struct Cli {
    /// Crystallographic input file (cell parameters, atom loop, optional bond loop).
    input: PathBuf,

    /// Force field applied to the framework fragment; guest molecule types keep the default
    /// (UFF) unless a `--config` file overrides them individually.
    #[arg(short = 'f', long, value_enum, default_value = "uff")]
    force_field: ForceFieldArg,

    /// Non-bonded cutoff, in Angstrom, used to size the minimum supercell.
    #[arg(short, long, default_value_t = assembler::config::DEFAULT_CUTOFF)]
    cutoff: f64,

    /// Enable DREIDING hydrogen-bond retyping for fragments typed with DREIDING.
    #[arg(long)]
    hydrogen_bonding: bool,

    /// Optional TOML file of per-molecule-type force-field overrides, read in place of the
    /// `--force-field`/`--cutoff`/`--hydrogen-bonding` flags when given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the output files are written into; defaults to the input file's directory.
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Emit a re-readable crystallographic dump of the typed graph instead of the LAMMPS files.
    #[arg(long)]
    debug_dump: bool,
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), XtalffError> {
    let input_text = std::fs::read_to_string(&cli.input).map_err(|source| {
        xtalff::IoError::Open { path: cli.input.display().to_string(), source }
    })?;

    let mut config = match &cli.config {
        Some(path) => AssemblerConfig::load(Some(path))?,
        None => {
            let mut config = AssemblerConfig::default();
            config.force_field_overrides.insert(assembler::FRAMEWORK_LABEL.to_string(), cli.force_field.into());
            config.cutoff = cli.cutoff;
            config.hydrogen_bonding = cli.hydrogen_bonding;
            config
        }
    };
    config.debug_dump = config.debug_dump || cli.debug_dump;

    let stem = cli.input.file_stem().and_then(|s| s.to_str()).unwrap_or("structure");
    let outdir = cli.outdir.unwrap_or_else(|| cli.input.parent().map(PathBuf::from).unwrap_or_default());
    let data_file_name = format!("data.{stem}");

    let output = assembler::run(&input_text, &data_file_name, &config)?;

    if let Some(debug_structure) = output.debug_structure {
        let path = outdir.join(format!("{stem}.debug.cif"));
        std::fs::write(&path, debug_structure)
            .map_err(|source| xtalff::IoError::Write { path: path.display().to_string(), source })?;
    } else {
        let data_path = outdir.join(&data_file_name);
        std::fs::write(&data_path, output.data_file)
            .map_err(|source| xtalff::IoError::Write { path: data_path.display().to_string(), source })?;

        let control_path = outdir.join(format!("in.{stem}"));
        std::fs::write(&control_path, output.control_file)
            .map_err(|source| xtalff::IoError::Write { path: control_path.display().to_string(), source })?;
    }

    Ok(())
}
