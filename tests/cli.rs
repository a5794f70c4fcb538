use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs

#[test]
fn missing_input_dir_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("argo_to_csv")?;

    cmd.arg("-i").arg(tmp.path().join("nope")).arg("-o").arg(tmp.path().join("out"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));

    Ok(())
}

#[test]
fn empty_input_dir_reports_zero_files() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    std::fs::create_dir(tmp.path().join("in"))?;
    let mut cmd = Command::cargo_bin("argo_to_csv")?;

    cmd.arg("-i").arg(tmp.path().join("in")).arg("-o").arg(tmp.path().join("out"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 file(s) found"));

    Ok(())
}

#[test]
fn unreadable_file_is_reported_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let input = tmp.path().join("in");
    std::fs::create_dir(&input)?;
    std::fs::write(input.join("junk_prof.nc"), b"this is not netcdf")?;
    let mut cmd = Command::cargo_bin("argo_to_csv")?;

    cmd.arg("-i").arg(&input).arg("-o").arg(tmp.path().join("out"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 failed"))
        .stderr(predicate::str::contains("junk_prof.nc"));
    assert!(!tmp.path().join("out_processed_files.txt").exists());

    Ok(())
}

#[test]
fn abort_policy_makes_bad_file_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let input = tmp.path().join("in");
    std::fs::create_dir(&input)?;
    std::fs::write(input.join("junk_prof.nc"), b"this is not netcdf")?;
    let mut cmd = Command::cargo_bin("argo_to_csv")?;

    cmd.arg("-i").arg(&input).arg("-o").arg(tmp.path().join("out")).args(["--on-read-error", "abort"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("reading junk_prof.nc"));

    Ok(())
}

#[test]
fn ledger_defaults_outside_output_dir() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    std::fs::create_dir(tmp.path().join("in"))?;
    let mut cmd = Command::cargo_bin("argo_to_csv")?;

    cmd.arg("-i").arg(tmp.path().join("in")).arg("-o").arg(tmp.path().join("out")).arg("-v");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("out_processed_files.txt"));

    Ok(())
}

#[test]
fn inverted_box_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("argo_to_csv")?;

    cmd.args(["--lat-min", "10", "--lat-max", "-10"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("lat_min"));

    Ok(())
}
