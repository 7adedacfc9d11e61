use anyhow::{anyhow, Context};
use clap::Parser;
use scc::packager::Arch;
use scc::{compiler, config, packager, payload, vm};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input source file
    input: PathBuf,
    /// Output executable (required unless --run)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Execute the program in-process instead of packaging it
    #[arg(long, default_value("false"))]
    run: bool,
    /// Which prebuilt runtime image to base the output on
    #[arg(long)]
    arch: Option<Arch>,
    /// Explicit path to the runtime image
    #[arg(long)]
    runtime: Option<PathBuf>,
    /// Log every VM dispatch to stderr (with --run)
    #[arg(long, default_value("false"))]
    trace: bool,
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let program = compiler::compile(&source)?;
    let entry = compiler::find_entry(&program)?;

    if args.run {
        return Ok(vm::execute(&program, entry, args.trace)?);
    }

    let output = args
        .output
        .ok_or_else(|| anyhow!("Missing output path, pass -o <out>"))?;
    let build = config::read_config(&args.input)?.unwrap_or_default();
    let arch = args.arch.or(build.arch).unwrap_or_else(Arch::detect);
    let runtime = args.runtime.or(build.runtime);
    let image = packager::find_runtime_image(runtime.as_deref(), arch)?;
    let bytes = payload::encode(&program, entry);
    packager::package(&image, &bytes, &output)?;
    Ok(0)
}
