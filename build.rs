//! Build script: embeds the git hash and sanity-checks GPU feature flags.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        check_tool(
            "nvcc",
            &["--version"],
            "CUDA toolkit (nvcc) not found on PATH. Install it or build without --features cuda.",
        );
    }
    if cfg!(feature = "vulkan") {
        check_tool(
            "glslc",
            &["--version"],
            "Vulkan shader compiler (glslc) not found. Install shaderc or build without --features vulkan.",
        );
    }
    if cfg!(feature = "hipblas") {
        check_tool(
            "hipcc",
            &["--version"],
            "ROCm compiler (hipcc) not found. Install ROCm or build without --features hipblas.",
        );
    }
}

/// Warn early when a GPU toolchain binary is missing, before whisper-rs-sys
/// fails deep inside its own build.
fn check_tool(binary: &str, args: &[&str], advice: &str) {
    let found = Command::new(binary)
        .args(args)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false);
    if !found {
        println!("cargo::warning={}", advice);
    }
}
