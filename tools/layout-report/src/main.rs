//! Print the derived memory layout of a boot stage and its linker symbols.
//!
//! ```text
//! layout-report <stage> [--defsym | --cargo] [--cores N] [-v]
//! ```
//!
//! - default: region table
//! - `--defsym`: one `--defsym=NAME=0x…` linker argument per line
//! - `--cargo`: the same as `cargo:rustc-link-arg-bins=` lines, for a build script
//!
//! Exits with 1 and every violation on stderr if the layout is invalid.

mod report;

use firmware_console::{ConsoleLogger, EarlySink, report as report_error};
use firmware_layout::{LayoutConfig, LayoutError, build_layout};
use firmware_platform::{BootStage, PlatformTopology, lcb};
use log::LevelFilter;
use std::fmt;
use std::process::ExitCode;
use std::sync::OnceLock;
use std::{env, io::Write as _};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Output {
    Table,
    Defsym,
    Cargo,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Args {
    stage: BootStage,
    output: Output,
    cores: Option<u32>,
    verbose: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut stage = None;
    let mut output = Output::Table;
    let mut cores = None;
    let mut verbose = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--defsym" => output = Output::Defsym,
            "--cargo" => output = Output::Cargo,
            "-v" | "--verbose" => verbose = true,
            "--cores" => {
                let value = args.next().ok_or("--cores needs a value")?;
                let count = value
                    .parse()
                    .map_err(|_| format!("invalid core count {value:?}"))?;
                cores = Some(count);
            }
            name if stage.is_none() => {
                stage = Some(BootStage::from_name(name).ok_or_else(|| format!("unknown stage {name:?}"))?);
            }
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }

    Ok(Args {
        stage: stage.ok_or("missing stage (bl1, bl2, bl31 or bl32)")?,
        output,
        cores,
        verbose,
    })
}

fn config(args: &Args) -> Result<LayoutConfig, LayoutError> {
    let mut topology = lcb::topology_config();
    if let Some(cores) = args.cores {
        topology
            .set_core_count(cores)
            .set_cluster_count(cores.min(lcb::CLUSTER_COUNT));
    }
    Ok(LayoutConfig::new(
        PlatformTopology::new(topology)?,
        lcb::budgets(),
        args.stage,
        lcb::stage_limits(args.stage),
    ))
}

/// Host stand-in for the firmware UART.
struct Stderr;

impl fmt::Write for Stderr {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        std::io::stderr().write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl EarlySink for Stderr {
    fn flush(&mut self) {
        let _ = std::io::stderr().flush();
    }
}

fn init_logging(verbose: bool) {
    static LOGGER: OnceLock<ConsoleLogger<Stderr>> = OnceLock::new();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(Stderr, level));
    if logger.init().is_err() {
        eprintln!("logger already installed");
    }
}

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("usage: layout-report <stage> [--defsym | --cargo] [--cores N] [-v]");
            return ExitCode::from(2);
        }
    };
    init_logging(args.verbose);

    let layout = match config(&args).and_then(|config| build_layout(&config)) {
        Ok(layout) => layout,
        Err(e) => {
            report_error(&mut Stderr, &e);
            return ExitCode::FAILURE;
        }
    };

    match args.output {
        Output::Table => print!("{}", report::render_table(&layout)),
        Output::Defsym => {
            for arg in report::defsym_args(&layout) {
                println!("{arg}");
            }
        }
        Output::Cargo => {
            for arg in report::defsym_args(&layout) {
                println!("cargo:rustc-link-arg-bins={arg}");
            }
        }
    }
    ExitCode::SUCCESS
}
