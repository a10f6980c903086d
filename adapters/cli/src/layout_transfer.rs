use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use horde_defence_core::{GridCell, Playfield, TowerKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "horde";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const SNAPSHOT_HEADER: &str = "horde:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Towers placed on a grid, transferable as a single line of text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerLayout {
    /// Number of tile columns of the grid the layout was captured on.
    pub(crate) columns: u32,
    /// Number of tile rows of the grid the layout was captured on.
    pub(crate) rows: u32,
    /// Towers composing the layout, in placement order.
    pub(crate) towers: Vec<LayoutTower>,
}

impl TowerLayout {
    /// Encodes the layout as `horde:v1:<columns>x<rows>:<payload>`.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(&self.towers).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a layout from its single-line representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let towers: Vec<LayoutTower> =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            towers,
        })
    }

    /// Fails unless the layout was captured on a grid of the same dimensions.
    pub(crate) fn ensure_fits(&self, playfield: &Playfield) -> Result<(), LayoutTransferError> {
        if self.columns == playfield.columns() && self.rows == playfield.rows() {
            return Ok(());
        }
        Err(LayoutTransferError::GridMismatch {
            layout: (self.columns, self.rows),
            playfield: (playfield.columns(), playfield.rows()),
        })
    }
}

/// Tower entry of a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LayoutTower {
    /// Type of tower to place.
    pub(crate) kind: TowerKind,
    /// Cell the tower occupies.
    pub(crate) cell: GridCell,
}

/// Errors that can occur while transferring layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The grid dimensions were missing.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The layout used an unexpected prefix.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be (de)serialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The layout was captured on a differently sized grid.
    #[error("layout grid {layout:?} does not match playfield {playfield:?}")]
    GridMismatch {
        /// Columns and rows recorded in the layout.
        layout: (u32, u32),
        /// Columns and rows of the running playfield.
        playfield: (u32, u32),
    },
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}
