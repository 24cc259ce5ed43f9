//! Command-line tests for the dihedrals, distances and psf commands.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PSF: &str = "PSF

       1 !NTITLE
 REMARKS two residues

       4 !NATOM
       1 A        1        MET      N        NH3     -0.300000       14.0070           0
       2 A        1        MET      CA       CT1      0.210000       12.0110           0
       3 A        2        ALA      N        NH1     -0.470000       14.0070           0
       4 A        2        ALA      CA       CT1      0.070000       12.0110           0
";

const DIHEDRALS: &str = "! phi of residue 2
assign (resid 1 and name C) (resid 2 and name N)
       (resid 2 and name CA) (resid 2 and name C) 1.0 -60.0 20.0 2
";

const DISTANCES: &str = "assign (resid 1 and (name HA or name HB)) (resid 2 and name HN) 3.5 1.7 0.5
";

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn xplor_nef() -> Command {
    Command::cargo_bin("xplor-nef").unwrap()
}

#[test]
fn test_dihedrals_text_output() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "phi.tbl", DIHEDRALS);

    xplor_nef()
        .arg("dihedrals")
        .arg(&table)
        .args(["--chains", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 dihedral restraints"))
        .stdout(predicate::str::contains("A.1...C"))
        .stdout(predicate::str::contains("angle -60 +/- 20"));
}

#[test]
fn test_dihedrals_with_psf_residue_names() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "phi.tbl", DIHEDRALS);
    let psf = write(&dir, "protein.psf", PSF);

    xplor_nef()
        .args(["--format", "tsv", "dihedrals"])
        .arg(&table)
        .args(["--chains", "A", "--psf"])
        .arg(&psf)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("file\trestraint_id\tline\tchain_code_1"))
        .stdout(predicate::str::contains("A\t1\tMET\tC\tA\t2\tALA\tN"))
        .stdout(predicate::str::contains("\t-80\t-40\n"));
}

#[test]
fn test_dihedrals_json_output() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "phi.tbl", DIHEDRALS);

    let output = xplor_nef()
        .args(["-f", "json", "dihedrals"])
        .arg(&table)
        .args(["--chains", "B"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let restraint = &json[0]["restraints"][0];
    assert_eq!(restraint["id"], 1);
    assert_eq!(restraint["line"], 2);
    assert_eq!(restraint["exponent"], 2);
    assert_eq!(restraint["atoms"][3]["chain_code"], "B");
    assert_eq!(restraint["atoms"][3]["residue_name"], ".");
}

#[test]
fn test_dihedrals_from_stdin() {
    xplor_nef()
        .args(["dihedrals", "-", "--chains", "A"])
        .write_stdin(DIHEDRALS)
        .assert()
        .success()
        .stdout(predicate::str::contains("<stdin>: 1 dihedral restraints"));
}

#[test]
fn test_missing_chain_fails() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "phi.tbl", DIHEDRALS);

    xplor_nef()
        .arg("dihedrals")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("i need a chain but none was provided"));
}

#[test]
fn test_grammar_error_names_file_and_position() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "bad.tbl", "assign (resid 1 and name C)\nassign (");

    xplor_nef()
        .arg("dihedrals")
        .arg(&table)
        .args(["--chains", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.tbl"))
        .stderr(predicate::str::contains("line 2, column 1"));
}

#[test]
fn test_reject_extra_chains() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "phi.tbl", DIHEDRALS);

    xplor_nef()
        .arg("dihedrals")
        .arg(&table)
        .args(["--chains", "A,B", "--reject-extra-chains"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "2 chains were declared but there are only 1 restraint files",
        ));

    xplor_nef()
        .arg("dihedrals")
        .arg(&table)
        .args(["--chains", "A,B"])
        .assert()
        .success();
}

#[test]
fn test_distances_tsv_expands_ambiguity() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "noe.tbl", DISTANCES);

    let output = xplor_nef()
        .args(["-f", "tsv", "distances"])
        .arg(&table)
        .args(["--chains", "A", "--bounds", "delta"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].contains("\tHA\tA\t2\t.\tHN\t"));
    assert!(rows[1].contains("\tHB\tA\t2\t.\tHN\t"));
    assert!(rows.iter().all(|row| row.ends_with("\t1.8\t4")));
}

#[test]
fn test_distances_raw_bounds_in_json() {
    let dir = TempDir::new().unwrap();
    let table = write(&dir, "noe.tbl", DISTANCES);

    let output = xplor_nef()
        .args(["-f", "json", "distances"])
        .arg(&table)
        .args(["--chains", "A"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let restraint = &json[0]["restraints"][0];
    assert_eq!(restraint["ambiguous"], true);
    assert_eq!(restraint["first_bound"], 1.7);
    assert_eq!(restraint["second_bound"], 0.5);
    assert!(restraint.get("bounds").is_none());
}

#[test]
fn test_psf_tsv() {
    let dir = TempDir::new().unwrap();
    let psf = write(&dir, "protein.psf", PSF);

    xplor_nef()
        .args(["-f", "tsv", "psf"])
        .arg(&psf)
        .assert()
        .success()
        .stdout("chain_code\tsequence_code\tresidue_name\nA\t1\tMET\nA\t2\tALA\n");
}

#[test]
fn test_psf_bad_header() {
    xplor_nef()
        .args(["psf", "-"])
        .write_stdin("XPLOR\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "the first line of a PSF file should be 'PSF' i got 'XPLOR'",
        ))
        .stderr(predicate::str::contains("<stdin>"));
}
