use std::error::Error;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::{env, process, str};

fn main() -> Result<(), Box<dyn Error>> {
    let profile = env::var("PROFILE").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../luster-shaders/src");
    println!("cargo:rerun-if-changed=../luster-shader-builder/src/main.rs");

    let mut dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());

    // Strip `$profile/build/*/out`.
    let ok = dir.ends_with("out")
        && dir.pop()
        && dir.pop()
        && dir.ends_with("build")
        && dir.pop()
        && dir.ends_with(&profile)
        && dir.pop();

    assert!(ok);

    let dir = dir.join("shader-builder");

    // The shader-builder runs in its own target directory, because rustc_codegen_spirv
    // must not inherit this build's rustflags.
    let output = Command::new("cargo")
        .args([
            "run",
            "--release",
            "-p",
            "luster-shader-builder",
            "--target-dir",
        ])
        .arg(dir)
        .env_remove("CARGO_ENCODED_RUSTFLAGS")
        .stderr(Stdio::inherit())
        .output()?;

    if !output.status.success() {
        process::exit(output.status.code().unwrap_or(1));
    }

    // The builder prints one `cargo:rustc-env=luster_shaders::*` pair per
    // compiled entry point; they only take effect re-emitted from here.
    print!("{}", str::from_utf8(&output.stdout)?);

    Ok(())
}
