use anyhow::Context;
use scc::{embed, payload, vm};
use std::process;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let path = std::env::current_exe().context("Cannot determine exe path")?;
    let exe = std::fs::read(&path).context("Failed to open self exe")?;
    let bytes = embed::extract(&exe)?;
    let (program, entry) = payload::decode(bytes)?;
    Ok(vm::execute(&program, entry, false)?)
}
