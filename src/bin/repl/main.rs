use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::Command;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let compiler = compiler_path()?;

    println!("S REPL - type :quit to exit");
    println!("Note: one line = one statement (end with ';' if needed)");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("s> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line == ":quit" || line == ":q" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let tmp = std::env::temp_dir().join("__repl_tmp.s");
        std::fs::write(&tmp, format!("int main() {{\n{}\nreturn 0;\n}}\n", line))
            .context("Failed to write temp file")?;

        // Any failure just reports and keeps the loop alive.
        match Command::new(&compiler).arg("--run").arg(&tmp).status() {
            Ok(status) if status.success() => {}
            _ => println!("(error)"),
        }
    }
    Ok(())
}

fn compiler_path() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot determine exe path")?;
    let dir = exe
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(dir.join(format!("scc{}", std::env::consts::EXE_SUFFIX)))
}
