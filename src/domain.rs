//! Wire-facing types mirrored from the backend API.
//!
//! The backend is the authoritative side: everything here is a report to be
//! adopted, never a value to recompute locally.

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// One entry of the opponent-selection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub balance: u64,
}

/// Handle returned by game creation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatedGame {
    pub id: String,
}

/// Authoritative result of one of our own shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveOutcome {
    pub hit: bool,
    /// The hit completed the destruction of a ship.
    #[cfg_attr(feature = "std", serde(default))]
    pub sunk: bool,
    #[cfg_attr(feature = "std", serde(default))]
    pub game_over: bool,
    /// Winnings, meaningful only on victory.
    #[cfg_attr(feature = "std", serde(default))]
    pub prize: Option<u64>,
}

/// A completed move as reported by status polling: the outcome of a shot
/// plus its coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LastMove {
    pub x: u8,
    pub y: u8,
    pub hit: bool,
    #[cfg_attr(feature = "std", serde(default))]
    pub sunk: bool,
    #[cfg_attr(feature = "std", serde(default))]
    pub game_over: bool,
    #[cfg_attr(feature = "std", serde(default))]
    pub prize: Option<u64>,
}

/// Backend-reported game status.
///
/// The backend may carry internal statuses beyond these; they decode to
/// `Unknown` and are treated as not yet actionable rather than as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum BackendStatus {
    Accepted,
    Cancelled,
    Battle,
    Finished,
    #[cfg_attr(feature = "std", serde(other))]
    Unknown,
}

/// One status poll payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSnapshot {
    pub status: BackendStatus,
    /// Identity of the side holding the turn, while one exists.
    #[cfg_attr(feature = "std", serde(default))]
    pub current_turn: Option<String>,
    /// Most recently completed move, when the backend has one to report.
    #[cfg_attr(feature = "std", serde(default))]
    pub last_move: Option<LastMove>,
}

/// Balance payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BalanceInfo {
    pub balance: u64,
}
