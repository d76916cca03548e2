use std::{path::Path, process::Command};

use tempfile::tempdir;

fn wumpus(dir: &Path, args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_wumpus"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run wumpus binary");
    assert!(
        output.status.success(),
        "wumpus {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}

#[test]
fn authored_world_can_be_inspected_and_played() {
    let dir = tempdir().expect("temp dir");

    let _ = wumpus(
        dir.path(),
        &[
            "new", "--out", "cave.wld", "--size", "4,4", "--wumpus", "3,3", "--pit", "2,0",
            "--gold", "1,2",
        ],
    );

    let inspected = wumpus(dir.path(), &["inspect", "--world", "cave.wld"]);
    assert!(inspected.contains("bounds: x=-1 y=-1 width=6 height=6"));
    assert!(inspected.contains("wumpus: (3,3)"));
    assert!(inspected.contains("gold: (1,2)"));
    assert!(inspected.contains("(2,0) GROUND|PIT"));

    let played = wumpus(
        dir.path(),
        &[
            "play", "--world", "cave.wld", "turn(left)", "forward", "forward", "turn(right)",
            "forward", "grab", "turn(right)", "turn(right)", "forward", "turn(left)", "forward",
            "forward", "climb",
        ],
    );
    assert!(played.contains("[gold]"), "{played}");
    assert!(played.contains("outcome: climbed out with the gold"), "{played}");
    assert!(played.contains("final score: 987"), "{played}");
}

#[test]
fn walking_into_a_pit_ends_the_game() {
    let dir = tempdir().expect("temp dir");
    let _ = wumpus(dir.path(), &["new", "--out", "cave.wld", "--pit", "1,0"]);

    let played = wumpus(
        dir.path(),
        &["play", "--world", "cave.wld", "forward", "climb"],
    );

    assert!(played.contains("[killed]"), "{played}");
    assert!(played.contains("outcome: fell into a pit"), "{played}");
    assert!(played.contains("final score: -1001"), "{played}");
}

#[test]
fn pits_on_the_coordinate_edges_stay_local() {
    let dir = tempdir().expect("temp dir");
    let _ = wumpus(
        dir.path(),
        &[
            "new", "--out", "edge.wld", "--pit", "2147483647,0", "--pit=-2147483648,5",
        ],
    );

    let inspected = wumpus(dir.path(), &["inspect", "--world", "edge.wld"]);
    assert!(inspected.contains("(2147483647,0) GROUND|PIT"), "{inspected}");
    assert!(inspected.contains("(2147483646,0) BREEZE"), "{inspected}");
    assert!(inspected.contains("(-2147483648,5) GROUND|PIT"), "{inspected}");
    assert!(inspected.contains("(-2147483647,5) BREEZE"), "{inspected}");
    assert!(!inspected.contains("(-2147483648,0)"), "{inspected}");
    assert!(!inspected.contains("(2147483647,5)"), "{inspected}");
    assert!(inspected.contains("width=4294967296"), "{inspected}");
}

#[test]
fn exported_world_imports_identically() {
    let dir = tempdir().expect("temp dir");
    let _ = wumpus(
        dir.path(),
        &["new", "--out", "cave.wld", "--wumpus", "0,2", "--wall", "1,1"],
    );

    let exported = wumpus(dir.path(), &["export", "--world", "cave.wld"]);
    let transfer = exported.trim();
    assert!(transfer.starts_with("wumpus:v1:"));

    let _ = wumpus(dir.path(), &["import", transfer, "--out", "copy.wld"]);

    let original = std::fs::read(dir.path().join("cave.wld")).expect("original file");
    let copy = std::fs::read(dir.path().join("copy.wld")).expect("imported file");
    assert_eq!(original, copy);
}

#[test]
fn configured_filter_and_world_are_used() {
    let dir = tempdir().expect("temp dir");
    let _ = wumpus(dir.path(), &["new", "--out", "default.wld", "--start", "2,2"]);
    std::fs::write(
        dir.path().join("wumpus.toml"),
        "world = \"default.wld\"\n[logging]\nfilter = \"warn\"\n",
    )
    .expect("write config");

    let played = wumpus(dir.path(), &["play", "grab", "climb"]);

    assert!(played.contains("outcome: climbed out with the gold"), "{played}");
    assert!(played.contains("final score: 998"), "{played}");
}
