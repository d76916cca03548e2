#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use wumpus_system_persistence::{self as persistence, PersistenceError};
use wumpus_world::World;

const TRANSFER_DOMAIN: &str = "wumpus";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded world file.
pub(crate) const TRANSFER_HEADER: &str = "wumpus:v1";
/// Delimiter used to separate the prefix segments and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes the world into a single-line string suitable for copy and paste.
pub(crate) fn encode_world(world: &World) -> Result<String, PersistenceError> {
    let bytes = persistence::encode(world)?;
    let encoded = STANDARD_NO_PAD.encode(bytes);
    Ok(format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a world from the provided transfer string.
pub(crate) fn decode_world(value: &str) -> Result<World, WorldTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorldTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(WorldTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(WorldTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(WorldTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(WorldTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(WorldTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(WorldTransferError::InvalidEncoding)?;
    persistence::decode(&bytes).map_err(WorldTransferError::InvalidPayload)
}

/// Errors that can occur while decoding world transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum WorldTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("world string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the transfer string.
    #[error("world string is missing the prefix")]
    MissingPrefix,
    /// The transfer string did not contain a version segment.
    #[error("world string is missing the version")]
    MissingVersion,
    /// The transfer string did not include the payload segment.
    #[error("world string is missing the payload")]
    MissingPayload,
    /// The transfer string used an unexpected prefix segment.
    #[error("world prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The transfer string used an unsupported version identifier.
    #[error("world version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode world payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload is not a valid world file.
    #[error("could not read world payload: {0}")]
    InvalidPayload(#[source] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wumpus_core::{CellFlags, Coord};
    use wumpus_world::query;

    #[test]
    fn round_trip_default_world() {
        let world = World::new();

        let encoded = encode_world(&world).expect("world encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode_world(&encoded).expect("world decodes");
        assert_eq!(query::stored_cells(&decoded), query::stored_cells(&world));
    }

    #[test]
    fn round_trip_authored_world() {
        let mut world = World::new();
        world.set_wumpus_location(Coord::new(1, 3));
        world.set_square(Coord::new(2, 0), CellFlags::GROUND | CellFlags::PIT);
        world.set_square(Coord::new(-1, 0), CellFlags::GROUND | CellFlags::WALL);
        world.recompute_breeze();
        world.recompute_smell();

        let encoded = encode_world(&world).expect("world encodes");
        let decoded = decode_world(&format!("  {encoded}\n")).expect("world decodes");

        assert_eq!(query::stored_cells(&decoded), query::stored_cells(&world));
        assert_eq!(query::landmarks(&decoded), query::landmarks(&world));
    }

    #[test]
    fn rejects_foreign_prefix_and_version() {
        assert!(matches!(
            decode_world("cave:v1:AAAA"),
            Err(WorldTransferError::InvalidPrefix(prefix)) if prefix == "cave"
        ));
        assert!(matches!(
            decode_world("wumpus:v9:AAAA"),
            Err(WorldTransferError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            decode_world("wumpus:v1"),
            Err(WorldTransferError::MissingPayload)
        ));
        assert!(matches!(
            decode_world("   "),
            Err(WorldTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn rejects_payload_that_is_not_a_world_file() {
        let encoded = format!("{TRANSFER_HEADER}:{}", STANDARD_NO_PAD.encode(b"\x00\x02hi"));
        assert!(matches!(
            decode_world(&encoded),
            Err(WorldTransferError::InvalidPayload(PersistenceError::InvalidHeader { .. }))
        ));
        assert!(matches!(
            decode_world("wumpus:v1:!!!"),
            Err(WorldTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn errors_describe_themselves_and_keep_their_cause() {
        use std::error::Error as _;

        let encoded = format!("{TRANSFER_HEADER}:{}", STANDARD_NO_PAD.encode(b"\x00\x02hi"));
        let error = decode_world(&encoded).expect_err("payload is not a world file");
        assert!(error.to_string().starts_with("could not read world payload: "));
        let cause = error.source().expect("payload error keeps its cause");
        assert!(cause.to_string().starts_with("invalid world file: unexpected header"));

        let error = decode_world("wumpus:v1:!!!").expect_err("payload is not base64");
        assert!(error.source().is_some());

        let error = decode_world("cave:v1:AAAA").expect_err("foreign prefix");
        assert_eq!(error.to_string(), "world prefix 'cave' is not supported");
        assert!(error.source().is_none());
    }
}
