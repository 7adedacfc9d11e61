use crate::embed;
use anyhow::{anyhow, bail, Context};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    X86,
}

impl Arch {
    pub fn detect() -> Arch {
        match std::env::consts::ARCH {
            "x86" => Arch::X86,
            _ => Arch::X64,
        }
    }
}

impl Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Arch::X64 => write!(f, "x64"),
            Arch::X86 => write!(f, "x86"),
        }
    }
}

// The payload is architecture-independent; the arch only selects which
// prebuilt runtime image the output is based on.
pub fn find_runtime_image(explicit: Option<&Path>, arch: Arch) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        if path.try_exists()? {
            return Ok(path.to_path_buf());
        }
        bail!("Runtime image not found at {}", path.display());
    }

    let exe = std::env::current_exe().context("Cannot determine exe path")?;
    let exe_dir = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let suffix = std::env::consts::EXE_SUFFIX;
    let candidates = [
        exe_dir.join(format!("s-runtime-{}{}", arch, suffix)),
        exe_dir.join(format!("s-runtime{}", suffix)),
    ];
    for candidate in &candidates {
        if candidate.try_exists()? {
            return Ok(candidate.clone());
        }
    }
    bail!(
        "No {} runtime image found next to the compiler, pass --runtime <path>",
        arch
    )
}

pub fn package(image_path: &Path, payload: &[u8], out_path: &Path) -> anyhow::Result<()> {
    let mut image = std::fs::read(image_path)
        .with_context(|| format!("Failed to open {}", image_path.display()))?;
    if image.is_empty() {
        bail!("Runtime image {} is empty", image_path.display());
    }
    embed::attach(&mut image, payload);

    // Write to a temp path and rename so a failure never leaves a partial
    // output file at the destination.
    let file_name = out_path
        .file_name()
        .ok_or_else(|| anyhow!("Invalid output path {}", out_path.display()))?;
    let tmp_path = out_path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));
    std::fs::write(&tmp_path, &image)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to mark {} executable", tmp_path.display()))?;
    }
    std::fs::rename(&tmp_path, out_path)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scc-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn package_appends_payload_to_the_image() {
        let image_path = temp_path("image");
        let out_path = temp_path("out");
        std::fs::write(&image_path, b"fake runtime image").unwrap();

        let payload = vec![7u8, 8, 9];
        package(&image_path, &payload, &out_path).unwrap();

        let packaged = std::fs::read(&out_path).unwrap();
        assert!(packaged.starts_with(b"fake runtime image"));
        assert_eq!(embed::extract(&packaged).unwrap(), payload.as_slice());

        std::fs::remove_file(&image_path).unwrap();
        std::fs::remove_file(&out_path).unwrap();
    }

    #[test]
    fn missing_image_is_an_error() {
        let err = package(
            &temp_path("does-not-exist"),
            &[],
            &temp_path("unused-out"),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open"));
    }

    #[test]
    fn empty_image_is_an_error() {
        let image_path = temp_path("empty-image");
        std::fs::write(&image_path, b"").unwrap();
        let err = package(&image_path, &[], &temp_path("empty-out")).unwrap_err();
        assert!(err.to_string().contains("is empty"));
        std::fs::remove_file(&image_path).unwrap();
    }

    #[test]
    fn explicit_runtime_path_must_exist() {
        let missing = temp_path("missing-runtime");
        let err = find_runtime_image(Some(missing.as_path()), Arch::X64).unwrap_err();
        assert!(err.to_string().contains("Runtime image not found"));
    }

    #[test]
    fn explicit_runtime_path_wins() {
        let runtime_path = temp_path("explicit-runtime");
        std::fs::write(&runtime_path, b"runtime").unwrap();
        let found = find_runtime_image(Some(runtime_path.as_path()), Arch::X86).unwrap();
        assert_eq!(found, runtime_path);
        std::fs::remove_file(&runtime_path).unwrap();
    }
}
