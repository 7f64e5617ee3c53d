//! Behavioral contract of the remote backend.
//!
//! Transport, authentication headers, and user identification are the HTTP
//! client's concern; this trait only fixes the calls and payload shapes the
//! game core consumes. The implementation behind it is authoritative for
//! every outcome it reports.

use crate::domain::{BalanceInfo, CreatedGame, MoveOutcome, PlayerInfo, StatusSnapshot};

#[async_trait::async_trait]
pub trait SeaBattleApi: Send + Sync {
    /// Players available for a challenge.
    async fn list_players(&self) -> anyhow::Result<Vec<PlayerInfo>>;

    /// Open a game against `opponent_id` with `bet` at stake.
    async fn create_game(&self, bet: u64, opponent_id: &str) -> anyhow::Result<CreatedGame>;

    /// Best-effort cancellation of a game we created.
    async fn cancel_game(&self, game_id: &str) -> anyhow::Result<()>;

    /// Submit the full board snapshot (numeric cell encoding, row-major).
    async fn submit_ships(&self, game_id: &str, board: &[Vec<u8>]) -> anyhow::Result<()>;

    /// Fire at (x, y). The backend decides hit, sunk, and game over.
    async fn make_move(&self, game_id: &str, x: u8, y: u8) -> anyhow::Result<MoveOutcome>;

    /// One poll tick.
    async fn get_status(&self, game_id: &str) -> anyhow::Result<StatusSnapshot>;

    /// Current user balance.
    async fn get_balance(&self) -> anyhow::Result<BalanceInfo>;
}
