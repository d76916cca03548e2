use std::fs;

use tempfile::tempdir;
use wumpus_core::{CellFlags, Command, Coord};
use wumpus_system_persistence::{load_from_path, save_to_path, PersistenceError, WORLD_FILE_HEADER};
use wumpus_world::{apply, query, World};

fn cave_with_pit_and_wumpus() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::PaintPit {
            cell: Coord::new(2, 0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::PlaceWumpus {
            cell: Coord::new(0, 2),
        },
        &mut events,
    );
    world
}

#[test]
fn saved_file_loads_back_identically() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("cave.wld");
    let world = cave_with_pit_and_wumpus();

    save_to_path(&world, &path).expect("save");
    let restored = load_from_path(&path).expect("load");

    assert_eq!(query::stored_cells(&restored), query::stored_cells(&world));
    assert_eq!(query::landmarks(&restored), query::landmarks(&world));
    assert!(restored.contains(Coord::new(1, 0), CellFlags::BREEZE));
    assert!(restored.contains(Coord::new(0, 1), CellFlags::SMELL));
}

#[test]
fn saving_replaces_an_existing_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("cave.wld");
    fs::write(&path, vec![0xAB; 4096]).expect("seed file");

    save_to_path(&World::new(), &path).expect("save");

    let bytes = fs::read(&path).expect("read back");
    assert_eq!(bytes.len(), 2 + WORLD_FILE_HEADER.len() + 4 + 2 * 12);
    let restored = load_from_path(&path).expect("load");
    assert_eq!(restored.agent_location(), Some(Coord::new(0, 0)));
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempdir().expect("temp dir");

    let error = load_from_path(dir.path().join("absent.wld")).expect_err("file is missing");

    assert!(matches!(error, PersistenceError::Io(_)));
}

#[test]
fn foreign_file_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("notes.txt");
    fs::write(&path, b"\x00\x05hello world").expect("seed file");

    let error = load_from_path(&path).expect_err("not a world file");

    assert!(matches!(error, PersistenceError::InvalidHeader { found } if found == "hello"));
}
