//! Game session state machine: phase tracking, turn ownership, and the
//! reconciliation of status polls against the authoritative backend.
//!
//! A session is a plain value owned by whoever drives it; there is no
//! process-wide "current game". The backend's reported status always wins
//! over local assumptions: a poll may advance the session by more than one
//! phase at once, and reconciliation resolves directly to the reported
//! status rather than stepping through intermediate states.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::board::Board;
use crate::combat::apply_move_result;
use crate::common::{BoardError, PlacementError};
use crate::domain::{BackendStatus, LastMove, MoveOutcome, StatusSnapshot};
use crate::placement::{self, Fleet};
use crate::ship::Orientation;
use rand::Rng;

/// Phase of one game session.
///
/// The lobby is represented by the absence of a session, not by a variant:
/// a session only exists once game creation has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Game created, waiting for the opponent to accept.
    AwaitingOpponent,
    /// Opponent accepted; the local fleet is being placed.
    Placement,
    /// Fleet submitted, waiting for the opponent's.
    AwaitingOpponentReady,
    Battle,
    Finished(GameOutcome),
    /// Absorbing: the game never started.
    Cancelled,
}

/// How a finished game ended for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// All enemy ships destroyed. The prize is whatever the backend
    /// reported, verbatim.
    Victory { prize: Option<u64> },
    Defeat,
}

/// What one status poll changed, as seen by the polling driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    /// Nothing actionable: unchanged status, or a backend-internal one.
    Idle,
    /// Opponent accepted; placement begins.
    OpponentJoined,
    /// The game was cancelled before battle.
    GameCancelled,
    /// Both sides ready; battle opens with the reported turn holder.
    BattleStarted { my_turn: bool },
    /// The opponent's move arrived and the turn returned to us.
    OpponentMoved { hit: bool },
    /// The turn returned to us without an attributable move.
    TurnRestored,
    /// The backend reports the game lost. `attributed` is false on the
    /// degraded path where no finishing move accompanied the status.
    Defeat { attributed: bool },
}

/// Local projection of one game against the authoritative backend. Always a
/// cache: it may be stale between polls.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: String,
    user_id: String,
    opponent_id: String,
    bet: u64,
    phase: SessionPhase,
    my_turn: bool,
    my_board: Board,
    enemy_view: Board,
    fleet: Fleet,
}

impl GameSession {
    /// Start tracking a game right after creation succeeded server-side.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        opponent_id: impl Into<String>,
        bet: u64,
    ) -> Self {
        GameSession {
            id: id.into(),
            user_id: user_id.into(),
            opponent_id: opponent_id.into(),
            bet,
            phase: SessionPhase::AwaitingOpponent,
            my_turn: false,
            my_board: Board::new(),
            enemy_view: Board::new(),
            fleet: Fleet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn opponent_id(&self) -> &str {
        &self.opponent_id
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Local turn flag. Advisory between polls; the backend's
    /// `current_turn` is adopted on every reconciliation.
    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    /// The local player's own board.
    pub fn my_board(&self) -> &Board {
        &self.my_board
    }

    /// The player's view of the opponent: only `Hit`/`Miss` ever appear.
    pub fn enemy_view(&self) -> &Board {
        &self.enemy_view
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Terminal phases absorb all further input.
    pub fn is_over(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Finished(_) | SessionPhase::Cancelled
        )
    }

    fn begin_placement(&mut self) {
        self.my_board = Board::new();
        self.enemy_view = Board::new();
        self.fleet.reset();
        self.phase = SessionPhase::Placement;
    }

    /// Manually place one ship of `size` at `anchor`.
    pub fn place_ship(
        &mut self,
        anchor: (u8, u8),
        size: u8,
        orientation: Orientation,
    ) -> Result<(), PlacementError> {
        placement::place_ship(&mut self.my_board, &mut self.fleet, anchor, size, orientation)
    }

    /// Discard any manual progress and place the whole fleet randomly.
    pub fn auto_place<R: Rng>(&mut self, rng: &mut R) {
        self.my_board = placement::random_placement(rng, &mut self.fleet);
    }

    pub fn is_fleet_complete(&self) -> bool {
        self.fleet.is_complete()
    }

    /// The fleet snapshot has been accepted by the backend; wait for the
    /// opponent's.
    pub fn fleet_submitted(&mut self) {
        self.phase = SessionPhase::AwaitingOpponentReady;
    }

    /// Record the authoritative result of our own shot on the opponent
    /// view.
    ///
    /// A miss releases the turn. On a hit the flag is left alone: whether a
    /// hit grants another shot is the backend's rule, so the next poll's
    /// `current_turn` decides.
    pub fn record_my_shot(
        &mut self,
        x: u8,
        y: u8,
        outcome: &MoveOutcome,
    ) -> Result<(), BoardError> {
        apply_move_result(&mut self.enemy_view, x, y, outcome.hit)?;
        if !outcome.hit {
            self.my_turn = false;
        }
        if outcome.game_over {
            self.phase = SessionPhase::Finished(GameOutcome::Victory {
                prize: outcome.prize,
            });
        }
        Ok(())
    }

    /// Record a completed opponent move against our own board and take the
    /// turn back. Returns true when the move ended the game.
    pub fn record_opponent_shot(&mut self, mv: &LastMove) -> Result<bool, BoardError> {
        apply_move_result(&mut self.my_board, mv.x, mv.y, mv.hit)?;
        self.my_turn = true;
        if mv.game_over {
            self.phase = SessionPhase::Finished(GameOutcome::Defeat);
            return Ok(true);
        }
        Ok(false)
    }

    /// Fold one status poll into local state.
    ///
    /// The reported status is adopted unconditionally, including jumps past
    /// phases this side never observed (e.g. `battle` arriving while still
    /// in `Placement`). An opponent move is attributed exactly once, on the
    /// poll where the turn flips back to us; replaying the same snapshot is
    /// a no-op.
    pub fn reconcile_poll(&mut self, snap: &StatusSnapshot) -> Result<PollEvent, BoardError> {
        if self.is_over() {
            return Ok(PollEvent::Idle);
        }
        match snap.status {
            BackendStatus::Unknown => Ok(PollEvent::Idle),
            BackendStatus::Accepted => {
                if self.phase == SessionPhase::AwaitingOpponent {
                    self.begin_placement();
                    return Ok(PollEvent::OpponentJoined);
                }
                Ok(PollEvent::Idle)
            }
            BackendStatus::Cancelled => {
                self.phase = SessionPhase::Cancelled;
                Ok(PollEvent::GameCancelled)
            }
            BackendStatus::Battle => {
                let now_my_turn = snap.current_turn.as_deref() == Some(self.user_id.as_str());
                if self.phase != SessionPhase::Battle {
                    self.phase = SessionPhase::Battle;
                    self.my_turn = now_my_turn;
                    return Ok(PollEvent::BattleStarted {
                        my_turn: now_my_turn,
                    });
                }
                if now_my_turn && !self.my_turn {
                    // The turn came back: the opponent's move is complete.
                    if let Some(mv) = &snap.last_move {
                        let ended = self.record_opponent_shot(mv)?;
                        return Ok(if ended {
                            PollEvent::Defeat { attributed: true }
                        } else {
                            PollEvent::OpponentMoved { hit: mv.hit }
                        });
                    }
                    self.my_turn = true;
                    return Ok(PollEvent::TurnRestored);
                }
                self.my_turn = now_my_turn;
                Ok(PollEvent::Idle)
            }
            BackendStatus::Finished => {
                // A victory is always learned from our own move result, so
                // a finished status seen here means defeat.
                let attributed = match &snap.last_move {
                    Some(mv) if mv.game_over => {
                        apply_move_result(&mut self.my_board, mv.x, mv.y, mv.hit)?;
                        true
                    }
                    _ => false,
                };
                self.my_turn = false;
                self.phase = SessionPhase::Finished(GameOutcome::Defeat);
                Ok(PollEvent::Defeat { attributed })
            }
        }
    }
}
