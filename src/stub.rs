//! In-process authoritative backend.
//!
//! Plays the role the production backend has: it accepts the game, fields
//! its own legal fleet, referees every shot, runs a randomized opponent,
//! and reports status and `last_move` through the same [`SeaBattleApi`]
//! surface the real HTTP client exposes. Used by the sim binary and the
//! integration tests.
//!
//! House rule: a hit grants another shot. The client never assumes this;
//! it learns turn ownership from `current_turn` like it would in
//! production.

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::api::SeaBattleApi;
use crate::board::{Board, Cell};
use crate::config::{BOARD_SIZE, TOTAL_SHIP_CELLS};
use crate::domain::{
    BackendStatus, BalanceInfo, CreatedGame, LastMove, MoveOutcome, PlayerInfo, StatusSnapshot,
};
use crate::placement::{random_placement, Fleet};

/// Identity the stub assigns to its caller.
pub const STUB_PLAYER_ID: &str = "player";
/// Identity of the built-in opponent.
pub const STUB_OPPONENT_ID: &str = "ai-opponent";

const STARTING_BALANCE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Player,
    Bot,
}

impl Side {
    fn id(self) -> &'static str {
        match self {
            Side::Player => STUB_PLAYER_ID,
            Side::Bot => STUB_OPPONENT_ID,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StubPhase {
    /// Waiting for the opponent's acceptance countdown to elapse.
    Pending,
    Accepted,
    Battle,
    Finished,
    Cancelled,
}

struct StubGame {
    id: String,
    bet: u64,
    phase: StubPhase,
    /// Status polls left before the bot accepts (or declines).
    accept_countdown: u32,
    /// Status polls left after submission before battle opens.
    ready_countdown: u32,
    player_board: Option<Board>,
    bot_board: Option<Board>,
    player_cells_left: usize,
    bot_cells_left: usize,
    turn: Side,
    last_move: Option<LastMove>,
}

struct StubState {
    rng: SmallRng,
    balance: u64,
    games_created: u32,
    game: Option<StubGame>,
}

/// Stub backend configuration and state behind one mutex; every API call
/// is a single lock scope with no await points.
pub struct StubBackend {
    accept_after_polls: u32,
    ready_after_polls: u32,
    decline: bool,
    bot_opens: bool,
    inner: Mutex<StubState>,
}

impl StubBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            accept_after_polls: 1,
            ready_after_polls: 1,
            decline: false,
            bot_opens: false,
            inner: Mutex::new(StubState {
                rng: SmallRng::seed_from_u64(seed),
                balance: STARTING_BALANCE,
                games_created: 0,
                game: None,
            }),
        }
    }

    /// Number of status polls before the opponent reacts to the challenge.
    pub fn with_acceptance_delay(mut self, polls: u32) -> Self {
        self.accept_after_polls = polls;
        self
    }

    /// Number of status polls after ship submission before battle opens.
    pub fn with_readiness_delay(mut self, polls: u32) -> Self {
        self.ready_after_polls = polls;
        self
    }

    /// The opponent refuses the challenge: the game resolves to cancelled.
    pub fn declining(mut self) -> Self {
        self.decline = true;
        self
    }

    /// The opponent takes the first turn.
    pub fn bot_opens(mut self) -> Self {
        self.bot_opens = true;
        self
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.inner.lock().expect("stub state poisoned")
    }
}

fn game_mut<'a>(state: &'a mut StubState, game_id: &str) -> anyhow::Result<&'a mut StubGame> {
    match state.game.as_mut() {
        Some(game) if game.id == game_id => Ok(game),
        _ => Err(anyhow::anyhow!("unknown game id: {}", game_id)),
    }
}

/// Decode a submitted snapshot; only `Empty` and `Ship` may appear before
/// battle, and the fleet must cover the standard cell count.
fn board_from_snapshot(snapshot: &[Vec<u8>]) -> anyhow::Result<Board> {
    let n = BOARD_SIZE as usize;
    if snapshot.len() != n || snapshot.iter().any(|row| row.len() != n) {
        return Err(anyhow::anyhow!("snapshot must be a {}x{} grid", n, n));
    }
    let mut board = Board::new();
    for (y, row) in snapshot.iter().enumerate() {
        for (x, &code) in row.iter().enumerate() {
            match Cell::from_code(code) {
                Some(cell @ (Cell::Empty | Cell::Ship)) => {
                    let _ = board.set(x as u8, y as u8, cell);
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "unexpected cell code {} in pre-battle snapshot",
                        code
                    ))
                }
            }
        }
    }
    if board.count(Cell::Ship) != TOTAL_SHIP_CELLS {
        return Err(anyhow::anyhow!(
            "snapshot must carry exactly {} ship cells",
            TOTAL_SHIP_CELLS
        ));
    }
    Ok(board)
}

/// All coordinates of the ship run through (x, y). The one-cell buffer
/// between ships makes the run unambiguous.
fn run_cells(board: &Board, x: u8, y: u8) -> Vec<(u8, u8)> {
    let occupied = |cx: i16, cy: i16| {
        cx >= 0
            && cy >= 0
            && matches!(
                board.get(cx as u8, cy as u8),
                Ok(Cell::Ship) | Ok(Cell::Hit)
            )
    };
    let mut cells = vec![(x, y)];
    for (dx, dy) in [(1i16, 0i16), (-1, 0), (0, 1), (0, -1)] {
        let (mut cx, mut cy) = (x as i16 + dx, y as i16 + dy);
        while occupied(cx, cy) {
            cells.push((cx as u8, cy as u8));
            cx += dx;
            cy += dy;
        }
    }
    cells
}

/// Whether the run through (x, y) has been fully destroyed.
fn run_sunk(board: &Board, x: u8, y: u8) -> bool {
    run_cells(board, x, y)
        .into_iter()
        .all(|(cx, cy)| board.get(cx, cy) == Ok(Cell::Hit))
}

/// Play out the bot's whole turn: fire at random unresolved cells,
/// continuing on hits, until a miss or victory. Only the final shot is
/// visible as `last_move`, exactly as a polling client would see it.
fn play_bot_turn(game: &mut StubGame, rng: &mut SmallRng) {
    let Some(board) = game.player_board.as_mut() else {
        return;
    };
    loop {
        let mut candidates = Vec::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                if matches!(board.get(x, y), Ok(cell) if !cell.is_terminal()) {
                    candidates.push((x, y));
                }
            }
        }
        let (x, y) = candidates[rng.random_range(0..candidates.len())];
        let hit = board.get(x, y) == Ok(Cell::Ship);
        let _ = board.set(x, y, if hit { Cell::Hit } else { Cell::Miss });
        let mut mv = LastMove {
            x,
            y,
            hit,
            sunk: false,
            game_over: false,
            prize: None,
        };
        if hit {
            game.player_cells_left -= 1;
            mv.sunk = run_sunk(board, x, y);
            if game.player_cells_left == 0 {
                mv.game_over = true;
                game.phase = StubPhase::Finished;
                game.last_move = Some(mv);
                return;
            }
            game.last_move = Some(mv);
            continue;
        }
        game.turn = Side::Player;
        game.last_move = Some(mv);
        return;
    }
}

#[async_trait::async_trait]
impl SeaBattleApi for StubBackend {
    async fn list_players(&self) -> anyhow::Result<Vec<PlayerInfo>> {
        Ok(vec![PlayerInfo {
            id: STUB_OPPONENT_ID.to_string(),
            name: "Bot Admiral".to_string(),
            level: 3,
            balance: 500,
        }])
    }

    async fn create_game(&self, bet: u64, opponent_id: &str) -> anyhow::Result<CreatedGame> {
        if opponent_id != STUB_OPPONENT_ID {
            return Err(anyhow::anyhow!("unknown opponent: {}", opponent_id));
        }
        let mut state = self.locked();
        if state
            .game
            .as_ref()
            .is_some_and(|g| !matches!(g.phase, StubPhase::Finished | StubPhase::Cancelled))
        {
            return Err(anyhow::anyhow!("a game is already in progress"));
        }
        if bet > state.balance {
            return Err(anyhow::anyhow!("insufficient balance for bet {}", bet));
        }
        state.balance -= bet;
        state.games_created += 1;
        let id = format!("game-{}", state.games_created);
        state.game = Some(StubGame {
            id: id.clone(),
            bet,
            phase: StubPhase::Pending,
            accept_countdown: self.accept_after_polls,
            ready_countdown: self.ready_after_polls,
            player_board: None,
            bot_board: None,
            player_cells_left: TOTAL_SHIP_CELLS,
            bot_cells_left: TOTAL_SHIP_CELLS,
            turn: if self.bot_opens {
                Side::Bot
            } else {
                Side::Player
            },
            last_move: None,
        });
        Ok(CreatedGame { id })
    }

    async fn cancel_game(&self, game_id: &str) -> anyhow::Result<()> {
        let mut state = self.locked();
        let bet = {
            let game = game_mut(&mut state, game_id)?;
            if !matches!(game.phase, StubPhase::Pending | StubPhase::Accepted) {
                return Err(anyhow::anyhow!("game {} can no longer be cancelled", game_id));
            }
            game.phase = StubPhase::Cancelled;
            game.bet
        };
        state.balance += bet;
        Ok(())
    }

    async fn submit_ships(&self, game_id: &str, board: &[Vec<u8>]) -> anyhow::Result<()> {
        let parsed = board_from_snapshot(board)?;
        let mut state = self.locked();
        let mut fleet = Fleet::new();
        let bot_board = random_placement(&mut state.rng, &mut fleet);
        let game = game_mut(&mut state, game_id)?;
        if game.phase != StubPhase::Accepted {
            return Err(anyhow::anyhow!("game {} is not accepting fleets", game_id));
        }
        if game.player_board.is_some() {
            return Err(anyhow::anyhow!("fleet already submitted"));
        }
        game.player_board = Some(parsed);
        game.bot_board = Some(bot_board);
        Ok(())
    }

    async fn make_move(&self, game_id: &str, x: u8, y: u8) -> anyhow::Result<MoveOutcome> {
        let mut state = self.locked();
        let (bet, mut outcome) = {
            let game = game_mut(&mut state, game_id)?;
            if game.phase != StubPhase::Battle {
                return Err(anyhow::anyhow!("game {} is not in battle", game_id));
            }
            if game.turn != Side::Player {
                return Err(anyhow::anyhow!("not your turn"));
            }
            let board = game
                .bot_board
                .as_mut()
                .ok_or_else(|| anyhow::anyhow!("battle without a bot board"))?;
            let cell = board.get(x, y).map_err(|e| anyhow::anyhow!(e))?;
            if cell.is_terminal() {
                return Err(anyhow::anyhow!("cell ({}, {}) was already shot", x, y));
            }
            let hit = cell == Cell::Ship;
            let _ = board.set(x, y, if hit { Cell::Hit } else { Cell::Miss });
            let mut outcome = MoveOutcome {
                hit,
                sunk: false,
                game_over: false,
                prize: None,
            };
            if hit {
                game.bot_cells_left -= 1;
                outcome.sunk = run_sunk(board, x, y);
                if game.bot_cells_left == 0 {
                    outcome.game_over = true;
                    game.phase = StubPhase::Finished;
                }
                // a hit grants another shot; turn stays with the player
            } else {
                game.turn = Side::Bot;
            }
            (game.bet, outcome)
        };
        if outcome.game_over {
            let prize = bet * 2;
            outcome.prize = Some(prize);
            state.balance += prize;
        }
        Ok(outcome)
    }

    async fn get_status(&self, game_id: &str) -> anyhow::Result<StatusSnapshot> {
        let mut state = self.locked();
        let decline = self.decline;
        let StubState {
            rng,
            balance,
            game,
            ..
        } = &mut *state;
        let game = match game.as_mut() {
            Some(game) if game.id == game_id => game,
            _ => return Err(anyhow::anyhow!("unknown game id: {}", game_id)),
        };
        match game.phase {
            StubPhase::Pending => {
                if game.accept_countdown > 0 {
                    game.accept_countdown -= 1;
                }
                if game.accept_countdown == 0 {
                    if decline {
                        // the declined stake goes back to the player
                        game.phase = StubPhase::Cancelled;
                        *balance += game.bet;
                    } else {
                        game.phase = StubPhase::Accepted;
                    }
                }
            }
            StubPhase::Accepted => {
                if game.player_board.is_some() {
                    if game.ready_countdown > 0 {
                        game.ready_countdown -= 1;
                    }
                    if game.ready_countdown == 0 {
                        game.phase = StubPhase::Battle;
                        if game.turn == Side::Bot {
                            play_bot_turn(game, rng);
                        }
                    }
                }
            }
            StubPhase::Battle => {
                if game.turn == Side::Bot {
                    play_bot_turn(game, rng);
                }
            }
            StubPhase::Finished | StubPhase::Cancelled => {}
        }
        let status = match game.phase {
            StubPhase::Pending => BackendStatus::Unknown,
            StubPhase::Accepted => BackendStatus::Accepted,
            StubPhase::Battle => BackendStatus::Battle,
            StubPhase::Finished => BackendStatus::Finished,
            StubPhase::Cancelled => BackendStatus::Cancelled,
        };
        Ok(StatusSnapshot {
            status,
            current_turn: (game.phase == StubPhase::Battle)
                .then(|| game.turn.id().to_string()),
            last_move: game.last_move,
        })
    }

    async fn get_balance(&self) -> anyhow::Result<BalanceInfo> {
        Ok(BalanceInfo {
            balance: self.locked().balance,
        })
    }
}
