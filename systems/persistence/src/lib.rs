#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Binary world file codec.
//!
//! A world file starts with [`WORLD_FILE_HEADER`] written as a big-endian
//! `u16` byte length followed by the header bytes, then a big-endian `i32`
//! record count and that many `(x, y, mask)` triples of big-endian `i32`.
//! Only the grid is stored; singleton locations are rebuilt from the
//! `AGENT`, `WUMPUS` and `GOLD` flags while loading.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use wumpus_core::{CellFlags, Coord};
use wumpus_world::World;

/// Versioned magic string every world file begins with.
pub const WORLD_FILE_HEADER: &str = "WumpusWorldModelFile0.9\n";

const RECORD_LEN: usize = 12;

/// Errors raised while reading or writing world files.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The underlying stream or file failed.
    #[error("world file I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The stream does not start with the expected header.
    #[error("invalid world file: unexpected header {found:?}")]
    InvalidHeader {
        /// Header text that was found instead.
        found: String,
    },
    /// The stream ended in the middle of the header or a record.
    #[error("invalid world file: stream ended early")]
    Truncated,
    /// The record count is negative.
    #[error("invalid world file: negative record count {0}")]
    NegativeCount(i32),
    /// The world holds more cells than the format can count.
    #[error("world holds {0} cells, more than a world file can store")]
    TooManyCells(usize),
}

/// Serializes the world's grid into the binary world file layout.
pub fn encode(world: &World) -> Result<Vec<u8>, PersistenceError> {
    let grid = world.grid();
    let count =
        i32::try_from(grid.len()).map_err(|_| PersistenceError::TooManyCells(grid.len()))?;

    let header = WORLD_FILE_HEADER.as_bytes();
    let mut bytes = Vec::with_capacity(2 + header.len() + 4 + grid.len() * RECORD_LEN);
    bytes.extend_from_slice(&(header.len() as u16).to_be_bytes());
    bytes.extend_from_slice(header);
    bytes.extend_from_slice(&count.to_be_bytes());
    for (cell, flags) in grid.iter() {
        bytes.extend_from_slice(&cell.x().to_be_bytes());
        bytes.extend_from_slice(&cell.y().to_be_bytes());
        bytes.extend_from_slice(&flags.mask().to_be_bytes());
    }
    Ok(bytes)
}

/// Writes the world's grid to the provided stream.
pub fn save<W: Write>(world: &World, mut writer: W) -> Result<(), PersistenceError> {
    let bytes = encode(world)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    tracing::debug!(cells = world.grid().len(), "saved world");
    Ok(())
}

/// Reads a world from the provided stream.
///
/// The returned world starts from [`World::new`] and then receives every
/// stored record. Breeze and smell are taken as stored; the world is not
/// reset afterwards.
pub fn load<R: Read>(mut reader: R) -> Result<World, PersistenceError> {
    let mut length = [0u8; 2];
    read_exact(&mut reader, &mut length)?;
    let mut header = vec![0u8; usize::from(u16::from_be_bytes(length))];
    read_exact(&mut reader, &mut header)?;
    if header != WORLD_FILE_HEADER.as_bytes() {
        return Err(PersistenceError::InvalidHeader {
            found: String::from_utf8_lossy(&header).into_owned(),
        });
    }

    let count = read_i32(&mut reader)?;
    if count < 0 {
        return Err(PersistenceError::NegativeCount(count));
    }

    let mut world = World::new();
    for _ in 0..count {
        let cell = Coord::new(read_i32(&mut reader)?, read_i32(&mut reader)?);
        let flags = CellFlags::from_mask(read_i32(&mut reader)?);
        world.set_square(cell, flags);
        if flags.contains(CellFlags::WUMPUS) {
            world.set_wumpus_location(cell);
        }
        if flags.contains(CellFlags::AGENT) {
            world.set_agent_location(cell);
            world.set_start_location(cell);
        }
        if flags.contains(CellFlags::GOLD) {
            world.set_gold_location(cell);
        }
    }
    tracing::debug!(records = count, "loaded world");
    Ok(world)
}

/// Decodes a world from an in-memory world file.
pub fn decode(bytes: &[u8]) -> Result<World, PersistenceError> {
    load(bytes)
}

/// Writes the world to `path`, replacing any existing file.
pub fn save_to_path(world: &World, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let file = File::create(path.as_ref())?;
    save(world, BufWriter::new(file))?;
    tracing::info!(path = %path.as_ref().display(), "world file written");
    Ok(())
}

/// Reads the world stored at `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<World, PersistenceError> {
    let file = File::open(path.as_ref())?;
    let world = load(BufReader::new(file))?;
    tracing::info!(path = %path.as_ref().display(), "world file loaded");
    Ok(world)
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, PersistenceError> {
    let mut buffer = [0u8; 4];
    read_exact(reader, &mut buffer)?;
    Ok(i32::from_be_bytes(buffer))
}

fn read_exact<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<(), PersistenceError> {
    reader.read_exact(buffer).map_err(|error| match error.kind() {
        io::ErrorKind::UnexpectedEof => PersistenceError::Truncated,
        _ => PersistenceError::Io(error),
    })
}
