use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use queue_relay_core::bindings::{blob_copy_definition, function_app_definitions, host_manifest};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const HOST_BINARY: &str = "relay_host";
const FUNCTIONS_PACKAGE: &str = "queue_relay_functions";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the queue relay workspace",
    long_about = "A unified CLI for running the relay host locally, rendering\n\
                  function manifests, packaging the function app, and CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the custom handler host locally
    Host {
        /// Port the host listens on
        #[arg(long, env = "FUNCTIONS_CUSTOMHANDLER_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Write host.json and every function.json into a directory
    Manifests {
        /// Output directory
        #[arg(long, default_value = "functionapp")]
        output: String,
        /// Also emit the queue-named blob copy function
        #[arg(long)]
        with_blob_copy: bool,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build the relay host and package it with its manifests as a zip
    FunctionsPackage {
        /// Compilation target triple for the host binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Also package the queue-named blob copy function
        #[arg(long)]
        with_blob_copy: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Formatting, clippy, and tests
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str], envs: &[(&str, String)]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .envs(envs.iter().map(|(key, value)| (*key, value.as_str())))
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    run_cargo_with_env(args, &[]);
}

fn run_cargo_with_env(args: &[&str], envs: &[(&str, String)]) {
    let status = cargo(args, envs);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn pretty(value: &impl serde::Serialize) -> String {
    let mut rendered =
        serde_json::to_string_pretty(value).expect("manifest should serialize to JSON");
    rendered.push('\n');
    rendered
}

/// Every manifest file of the function app as `(relative path, contents)`.
///
/// The blob copy function listens on `copyblobqueue` like the log relay, so
/// it is only emitted when asked for.
fn manifest_files(executable: &str, include_blob_copy: bool) -> Vec<(String, String)> {
    let mut definitions = function_app_definitions();
    if include_blob_copy {
        definitions.push(blob_copy_definition());
    }

    let mut files = vec![("host.json".to_string(), pretty(&host_manifest(executable)))];
    for (function, definition) in definitions {
        eprintln!(
            "function {function} <- queue {}",
            definition.trigger_queue().unwrap_or("-")
        );
        files.push((format!("{function}/function.json"), pretty(&definition)));
    }
    files
}

fn write_manifests(output: &Path, include_blob_copy: bool) {
    for (relative, contents) in manifest_files(HOST_BINARY, include_blob_copy) {
        let path = output.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create manifest directory");
        }
        fs::write(&path, contents).expect("failed to write manifest");
        eprintln!("wrote {}", path.display());
    }
}

fn package_function_app(target: &str, profile: BuildProfile, include_blob_copy: bool) {
    ensure_rust_target_installed(target);

    step("Build relay host binary");
    let mut cargo_args = vec![
        "build",
        "-p",
        FUNCTIONS_PACKAGE,
        "--target",
        target,
        "--bin",
        HOST_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package function app zip");
    let executable = binary_name(HOST_BINARY, target);
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(&executable);
    let dist_dir = Path::new("dist");
    fs::create_dir_all(dist_dir).expect("failed to create dist directory");
    let zip_path = dist_dir.join("functionapp.zip");

    package_zip(&binary_path, &executable, &zip_path, include_blob_copy);
    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- functions-package`"
        );
    }
}

fn package_zip(binary_path: &Path, executable: &str, zip_path: &Path, include_blob_copy: bool) {
    if !binary_path.exists() {
        panic!("expected relay host binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read relay host binary");
    let file = fs::File::create(zip_path).expect("failed to create function app zip");
    let mut zip = ZipWriter::new(file);

    let executable_options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file(executable, executable_options)
        .expect("failed to start executable entry");
    zip.write_all(&binary)
        .expect("failed to write executable entry");

    let manifest_options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    for (relative, contents) in manifest_files(executable, include_blob_copy) {
        zip.start_file(relative.as_str(), manifest_options)
            .expect("failed to start manifest entry");
        zip.write_all(contents.as_bytes())
            .expect("failed to write manifest entry");
    }
    zip.finish().expect("failed to finish function app zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test queue_relay_core");
    run_cargo(&["test", "-p", "queue_relay_core"]);

    step("Test queue_relay_functions");
    run_cargo(&["test", "-p", FUNCTIONS_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Host { port } => {
            run_cargo_with_env(
                &["run", "-p", FUNCTIONS_PACKAGE, "--bin", HOST_BINARY],
                &[("FUNCTIONS_CUSTOMHANDLER_PORT", port.to_string())],
            );
        }
        Commands::Manifests {
            output,
            with_blob_copy,
        } => {
            write_manifests(Path::new(&output), with_blob_copy);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::FunctionsPackage {
            target,
            profile,
            with_blob_copy,
        } => {
            package_function_app(&target, profile, with_blob_copy);
        }
    }
}
