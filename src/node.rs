//! Polling driver for one player: owns the session, the API handle, and
//! the per-state poll timer.
//!
//! Scheduling is cooperative and single-threaded from the session's point
//! of view: every mutation happens inside a poll tick or a user action, and
//! each waiting state owns exactly one interval, dropped when the wait
//! ends. Transport failures during a tick are logged and swallowed; the
//! next tick retries, which makes the poll loops self-healing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tokio::time::{interval, Duration};

use crate::api::SeaBattleApi;
use crate::config::BOARD_SIZE;
use crate::domain::{BalanceInfo, MoveOutcome, PlayerInfo};
use crate::session::{GameSession, PollEvent, SessionPhase};
use crate::ship::Orientation;

/// Poll cadence per waiting state. Tuning knobs, not protocol constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// While waiting for an opponent to accept the game.
    pub matchmaking: Duration,
    /// While waiting for the opponent's fleet after submitting ours.
    pub readiness: Duration,
    /// While waiting for the turn to come back during battle.
    pub battle: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            matchmaking: Duration::from_secs(3),
            readiness: Duration::from_secs(2),
            battle: Duration::from_secs(3),
        }
    }
}

/// Cloneable handle that abandons whatever poll loop is active. One-shot:
/// a new session gets a fresh handle.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Client-side orchestrator: lobby actions, placement, and the battle
/// loop, all against a [`SeaBattleApi`] backend.
pub struct GameNode {
    api: Box<dyn SeaBattleApi>,
    user_id: String,
    poll: PollConfig,
    abort: AbortHandle,
    session: Option<GameSession>,
}

impl GameNode {
    pub fn new(api: Box<dyn SeaBattleApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            poll: PollConfig::default(),
            abort: AbortHandle::default(),
            session: None,
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Handle that abandons the current session's poll loops. Re-fetch
    /// after each `create_game`; creation arms a fresh one.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Current phase, or `None` while in the lobby.
    pub fn phase(&self) -> Option<SessionPhase> {
        self.session.as_ref().map(|s| s.phase())
    }

    fn session_ref(&self) -> anyhow::Result<&GameSession> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no active game session"))
    }

    pub async fn list_opponents(&self) -> anyhow::Result<Vec<PlayerInfo>> {
        self.api.list_players().await
    }

    pub async fn balance(&self) -> anyhow::Result<BalanceInfo> {
        self.api.get_balance().await
    }

    /// Create a game and start tracking it. Fails without side effects if a
    /// session is already active or the backend refuses.
    pub async fn create_game(&mut self, bet: u64, opponent_id: &str) -> anyhow::Result<()> {
        if self.session.is_some() {
            return Err(anyhow::anyhow!("a game session is already active"));
        }
        let created = self.api.create_game(bet, opponent_id).await?;
        log::info!(
            "created game {} against {} with bet {}",
            created.id,
            opponent_id,
            bet
        );
        self.abort = AbortHandle::default();
        self.session = Some(GameSession::new(
            created.id,
            self.user_id.clone(),
            opponent_id,
            bet,
        ));
        Ok(())
    }

    /// Cancel the game server-side and drop the session. On transport
    /// failure the session is kept as it was.
    pub async fn cancel(&mut self) -> anyhow::Result<()> {
        let id = self.session_ref()?.id().to_string();
        self.api.cancel_game(&id).await?;
        log::info!("cancelled game {}", id);
        self.session = None;
        Ok(())
    }

    /// Drop the session locally and return to the lobby. No server call.
    pub fn leave(&mut self) {
        self.session = None;
    }

    /// Manually place one ship during the placement phase.
    pub fn place_ship(
        &mut self,
        anchor: (u8, u8),
        size: u8,
        orientation: Orientation,
    ) -> anyhow::Result<()> {
        let session = self.placement_session()?;
        session
            .place_ship(anchor, size, orientation)
            .map_err(|e| anyhow::anyhow!(e))
    }

    /// Replace any manual progress with a random full placement.
    pub fn auto_place<R: Rng>(&mut self, rng: &mut R) -> anyhow::Result<()> {
        let session = self.placement_session()?;
        session.auto_place(rng);
        Ok(())
    }

    fn placement_session(&mut self) -> anyhow::Result<&mut GameSession> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("no active game session"))?;
        if session.phase() != SessionPhase::Placement {
            return Err(anyhow::anyhow!("not in the placement phase"));
        }
        Ok(session)
    }

    /// Submit the completed fleet and move on to waiting for the opponent.
    pub async fn ready_for_battle(&mut self) -> anyhow::Result<()> {
        let (id, snapshot) = {
            let session = self.session_ref()?;
            if session.phase() != SessionPhase::Placement {
                return Err(anyhow::anyhow!("not in the placement phase"));
            }
            if !session.is_fleet_complete() {
                return Err(anyhow::anyhow!("fleet is not fully placed"));
            }
            (session.id().to_string(), session.my_board().snapshot())
        };
        self.api.submit_ships(&id, &snapshot).await?;
        log::info!("submitted fleet for game {}", id);
        if let Some(session) = self.session.as_mut() {
            session.fleet_submitted();
        }
        Ok(())
    }

    /// Fire at (x, y) and mirror the authoritative outcome. On transport
    /// failure nothing is recorded and the turn is unchanged.
    pub async fn fire(&mut self, x: u8, y: u8) -> anyhow::Result<MoveOutcome> {
        let id = {
            let session = self.session_ref()?;
            if session.phase() != SessionPhase::Battle {
                return Err(anyhow::anyhow!("no battle in progress"));
            }
            if !session.is_my_turn() {
                return Err(anyhow::anyhow!("not your turn"));
            }
            if session
                .enemy_view()
                .get(x, y)
                .map_err(|e| anyhow::anyhow!(e))?
                .is_terminal()
            {
                return Err(anyhow::anyhow!("cell ({}, {}) is already resolved", x, y));
            }
            session.id().to_string()
        };
        let outcome = self.api.make_move(&id, x, y).await?;
        log::info!(
            "shot at ({}, {}): hit={} sunk={} game_over={}",
            x,
            y,
            outcome.hit,
            outcome.sunk,
            outcome.game_over
        );
        if let Some(session) = self.session.as_mut() {
            session
                .record_my_shot(x, y, &outcome)
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Ok(outcome)
    }

    /// Poll until the opponent accepts or the game is cancelled. Returns
    /// the phase that ended the wait, or `None` on local abandonment.
    pub async fn wait_for_opponent(&mut self) -> anyhow::Result<Option<SessionPhase>> {
        self.expect_phase(SessionPhase::AwaitingOpponent)?;
        self.poll_until(self.poll.matchmaking, |s| {
            s.phase() != SessionPhase::AwaitingOpponent
        })
        .await
    }

    /// Poll until the backend opens the battle (or ends the game early).
    pub async fn wait_for_battle(&mut self) -> anyhow::Result<Option<SessionPhase>> {
        self.expect_phase(SessionPhase::AwaitingOpponentReady)?;
        self.poll_until(self.poll.readiness, |s| {
            !matches!(
                s.phase(),
                SessionPhase::AwaitingOpponentReady | SessionPhase::Placement
            )
        })
        .await
    }

    /// Poll during battle until the turn is ours again or the game ends.
    pub async fn wait_for_turn(&mut self) -> anyhow::Result<Option<SessionPhase>> {
        self.expect_phase(SessionPhase::Battle)?;
        self.poll_until(self.poll.battle, |s| {
            s.is_my_turn() || s.phase() != SessionPhase::Battle
        })
        .await
    }

    fn expect_phase(&self, phase: SessionPhase) -> anyhow::Result<()> {
        let current = self.session_ref()?.phase();
        if current != phase {
            return Err(anyhow::anyhow!(
                "expected phase {:?}, session is in {:?}",
                phase,
                current
            ));
        }
        Ok(())
    }

    /// Poll on `period` until `done(session)` holds or the abort handle
    /// trips. Owns its interval for the whole wait, so at most one timer is
    /// ever live; dropping it on exit is the state's cancellation.
    async fn poll_until<F>(
        &mut self,
        period: Duration,
        done: F,
    ) -> anyhow::Result<Option<SessionPhase>>
    where
        F: Fn(&GameSession) -> bool,
    {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if self.abort.is_aborted() {
                self.abandon().await;
                return Ok(None);
            }
            self.poll_once().await;
            let Some(session) = self.session.as_ref() else {
                return Ok(None);
            };
            if done(session) {
                return Ok(Some(session.phase()));
            }
        }
    }

    /// One poll tick: fetch status and reconcile. Errors never escape; the
    /// next tick retries.
    async fn poll_once(&mut self) {
        let Some(id) = self.session.as_ref().map(|s| s.id().to_string()) else {
            return;
        };
        let snap = match self.api.get_status(&id).await {
            Ok(snap) => snap,
            Err(e) => {
                log::warn!("status poll for game {} failed: {}", id, e);
                return;
            }
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.reconcile_poll(&snap) {
            Ok(PollEvent::Idle) => {}
            Ok(event) => log::info!("game {}: {:?}", id, event),
            Err(e) => log::warn!("game {}: malformed status payload: {}", id, e),
        }
    }

    /// Local abandonment: best-effort server cancel while still
    /// matchmaking, then drop the session.
    async fn abandon(&mut self) {
        if let Some(session) = self.session.as_ref() {
            if session.phase() == SessionPhase::AwaitingOpponent {
                if let Err(e) = self.api.cancel_game(session.id()).await {
                    log::warn!("cancel on abandon failed: {}", e);
                }
            }
        }
        self.session = None;
    }

    /// Uniform random shot among unresolved opponent-view cells.
    fn pick_target<R: Rng>(&self, rng: &mut R) -> anyhow::Result<(u8, u8)> {
        let session = self.session_ref()?;
        let mut candidates = Vec::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let cell = session
                    .enemy_view()
                    .get(x, y)
                    .map_err(|e| anyhow::anyhow!(e))?;
                if !cell.is_terminal() {
                    candidates.push((x, y));
                }
            }
        }
        if candidates.is_empty() {
            return Err(anyhow::anyhow!("no unresolved cells left to target"));
        }
        Ok(candidates[rng.random_range(0..candidates.len())])
    }

    /// Drive a full game to its end: matchmaking, automatic placement, and
    /// a battle loop firing at random unresolved cells. Returns the final
    /// phase, or `None` if the session was abandoned.
    pub async fn play<R: Rng>(
        &mut self,
        rng: &mut R,
        bet: u64,
        opponent_id: &str,
    ) -> anyhow::Result<Option<SessionPhase>> {
        self.create_game(bet, opponent_id).await?;
        if self.wait_for_opponent().await?.is_none() {
            return Ok(None);
        }
        if self.phase() == Some(SessionPhase::Placement) {
            self.auto_place(rng)?;
            self.ready_for_battle().await?;
            if self.wait_for_battle().await?.is_none() {
                return Ok(None);
            }
        }
        while self.phase() == Some(SessionPhase::Battle) {
            let my_turn = self.session_ref()?.is_my_turn();
            if my_turn {
                let (x, y) = self.pick_target(rng)?;
                self.fire(x, y).await?;
            } else if self.wait_for_turn().await?.is_none() {
                return Ok(None);
            }
        }
        Ok(self.phase())
    }
}
