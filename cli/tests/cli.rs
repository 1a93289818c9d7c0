use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn compute_benchmarks() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_compute-benchmarks"));
    command.env_remove("CBENCH_CONFIG").env("RUST_LOG", "warn");
    command
}

#[test]
fn test_run_single_test_as_csv() -> std::io::Result<()> {
    let output = compute_benchmarks()
        .args([
            "run",
            "--test=CopyBandwidth",
            "--api=host",
            "--iterations=3",
            "--csv",
            "--no-column-names",
            "--",
            "--size=64KB",
            "--useEvents=0",
        ])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("CopyBandwidth(api=host size=64KB useEvents=0 forceBlitter=0),"));
    assert!(lines[0].ends_with("CPU,[GB/s]"));
    Ok(())
}

#[test]
fn test_run_with_config_file() -> std::io::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "iterations = 2\napi = \"host\"\nprint_type = \"json\"\ndump_command_lines = true\n\n[backend]\nlink_copy_engines = 2"
    )?;

    let output = compute_benchmarks()
        .arg("run")
        .arg("--config")
        .arg(file.path())
        .args(["--test=UsmCopyMultipleBlits", "--", "--size=256KB", "--blitters=000000011"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().unwrap_or_default();
    assert!(first.starts_with('{'));
    assert!(first.contains("--test=UsmCopyMultipleBlits --api=host --size=256KB --blitters=000000011"));
    assert!(first.contains("\"Total (Gpu)\""));
    Ok(())
}

#[test]
fn test_invalid_flags_fail() -> std::io::Result<()> {
    let output = compute_benchmarks()
        .args(["run", "--csv", "--verbose"])
        .output()?;
    assert!(!output.status.success());

    let output = compute_benchmarks()
        .args(["run", "--test=NoSuchTest"])
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown test NoSuchTest"));
    Ok(())
}

#[test]
fn test_invalid_test_arguments_exit_with_failure() -> std::io::Result<()> {
    let output = compute_benchmarks()
        .args(["run", "--test=CopyBandwidth", "--api=host", "--iterations=1", "--", "--bogus=1"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let output = compute_benchmarks()
        .args(["run", "--api=host", "--", "--size=64KB"])
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("require --test"));
    Ok(())
}

#[test]
fn test_degenerate_partition_is_rejected() -> std::io::Result<()> {
    let output = compute_benchmarks()
        .args([
            "run",
            "--test=UsmCopyMultipleBlits",
            "--api=host",
            "--iterations=1",
            "--link-copy-engines=8",
            "--",
            "--size=15",
            "--blitters=111111111",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("INVALID_ARGS"));
    Ok(())
}

#[test]
fn test_list_mentions_every_test() -> std::io::Result<()> {
    let output = compute_benchmarks().args(["list", "--json"]).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "CopyBandwidth",
        "MultithreadedCopy",
        "QueueSubmissionOverhead",
        "UsmCopyMultipleBlits",
        "UsmFillMultipleBlits",
    ] {
        assert!(stdout.contains(name), "{} missing from listing", name);
    }
    Ok(())
}
