//! Single-line text encoding of board layouts for copy and paste.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::{BoardLayout, BoardSize, CellCoord};

const LAYOUT_DOMAIN: &str = "board";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "board:v1";
/// Delimiter used to separate the prefix, board dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Occupants carried inside the payload; the dimensions travel in the header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    walls: Vec<CellCoord>,
    destinations: Vec<CellCoord>,
    spawn_points: Vec<CellCoord>,
}

/// Errors that can occur while encoding or decoding layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    #[error("layout string was empty")]
    EmptyPayload,
    #[error("layout string is missing the {0}")]
    MissingField(&'static str),
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not parse board dimensions '{0}'")]
    InvalidDimensions(String),
    #[error("could not decode layout payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    #[error("could not parse layout payload")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("could not serialise layout")]
    Serialize(#[source] serde_json::Error),
}

/// Encodes the layout into a single-line string.
pub(crate) fn encode(layout: &BoardLayout) -> Result<String, LayoutTransferError> {
    let payload = SerializableLayout {
        walls: layout.walls().to_vec(),
        destinations: layout.destinations().to_vec(),
        spawn_points: layout.spawn_points().to_vec(),
    };
    let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::Serialize)?;
    let size = layout.size();
    Ok(format!(
        "{LAYOUT_HEADER}:{}x{}:{}",
        size.columns(),
        size.rows(),
        STANDARD_NO_PAD.encode(json)
    ))
}

/// Decodes a layout from its string representation.
///
/// Only the string format is checked here; whether the layout fits on a
/// playable board is decided when a world is built from it.
pub(crate) fn decode(value: &str) -> Result<BoardLayout, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::MissingField("prefix"))?;
    let version = parts
        .next()
        .ok_or(LayoutTransferError::MissingField("version"))?;
    let dimensions = parts
        .next()
        .ok_or(LayoutTransferError::MissingField("board dimensions"))?;
    let payload = parts
        .next()
        .ok_or(LayoutTransferError::MissingField("payload"))?;

    if domain != LAYOUT_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != LAYOUT_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let size = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let decoded: SerializableLayout =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

    Ok(BoardLayout::new(
        size,
        decoded.walls,
        decoded.destinations,
        decoded.spawn_points,
    ))
}

fn parse_dimensions(dimensions: &str) -> Result<BoardSize, LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok(BoardSize::new(columns, rows))
}
