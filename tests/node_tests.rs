use std::sync::atomic::{AtomicU32, Ordering};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use sea_battle::domain::{
    BalanceInfo, CreatedGame, MoveOutcome, PlayerInfo, StatusSnapshot,
};
use sea_battle::{
    Cell, GameNode, GameOutcome, PollConfig, SeaBattleApi, SessionPhase, StubBackend,
    STUB_OPPONENT_ID, STUB_PLAYER_ID, TOTAL_SHIP_CELLS,
};
use tokio::time::Duration;

fn fast_poll() -> PollConfig {
    PollConfig {
        matchmaking: Duration::from_millis(1),
        readiness: Duration::from_millis(1),
        battle: Duration::from_millis(1),
    }
}

fn node_over(stub: StubBackend) -> GameNode {
    GameNode::new(Box::new(stub), STUB_PLAYER_ID).with_poll_config(fast_poll())
}

#[tokio::test]
async fn test_full_game_runs_to_finish() {
    let mut node = node_over(StubBackend::new(42));
    let mut rng = SmallRng::seed_from_u64(42);

    let phase = node.play(&mut rng, 100, STUB_OPPONENT_ID).await.unwrap();
    let Some(SessionPhase::Finished(outcome)) = phase else {
        panic!("game should finish, ended in {:?}", phase);
    };

    let session = node.session().unwrap();
    let balance = node.balance().await.unwrap().balance;
    match outcome {
        GameOutcome::Victory { prize } => {
            assert_eq!(prize, Some(200));
            // we observed every one of our own hits
            assert_eq!(session.enemy_view().count(Cell::Hit), TOTAL_SHIP_CELLS);
            assert_eq!(balance, 1100);
        }
        GameOutcome::Defeat => {
            assert!(session.enemy_view().count(Cell::Hit) < TOTAL_SHIP_CELLS);
            assert_eq!(balance, 900);
        }
    }
    // the opponent view never holds ships
    assert_eq!(session.enemy_view().count(Cell::Ship), 0);
}

#[tokio::test]
async fn test_bot_opening_game_still_finishes() {
    let mut node = node_over(StubBackend::new(7).bot_opens());
    let mut rng = SmallRng::seed_from_u64(7);

    let phase = node.play(&mut rng, 10, STUB_OPPONENT_ID).await.unwrap();
    assert!(matches!(phase, Some(SessionPhase::Finished(_))));
}

#[tokio::test]
async fn test_declined_game_resolves_to_cancelled() {
    let mut node = node_over(StubBackend::new(1).declining().with_acceptance_delay(3));
    let mut rng = SmallRng::seed_from_u64(1);

    let phase = node.play(&mut rng, 25, STUB_OPPONENT_ID).await.unwrap();
    assert_eq!(phase, Some(SessionPhase::Cancelled));
    // the stake came back
    assert_eq!(node.balance().await.unwrap().balance, 1000);
}

#[tokio::test]
async fn test_manual_lifecycle_walkthrough() {
    let mut node = node_over(StubBackend::new(9).with_acceptance_delay(2).with_readiness_delay(2));
    let mut rng = SmallRng::seed_from_u64(9);

    node.create_game(40, STUB_OPPONENT_ID).await.unwrap();
    assert_eq!(node.phase(), Some(SessionPhase::AwaitingOpponent));

    let phase = node.wait_for_opponent().await.unwrap();
    assert_eq!(phase, Some(SessionPhase::Placement));

    // a fleet must be complete before it can be submitted
    assert!(node.ready_for_battle().await.is_err());
    node.auto_place(&mut rng).unwrap();
    node.ready_for_battle().await.unwrap();
    assert_eq!(node.phase(), Some(SessionPhase::AwaitingOpponentReady));

    let phase = node.wait_for_battle().await.unwrap();
    assert_eq!(phase, Some(SessionPhase::Battle));
    let session = node.session().unwrap();
    assert!(session.is_my_turn());

    let outcome = node.fire(0, 0).await.unwrap();
    let session = node.session().unwrap();
    let cell = session.enemy_view().get(0, 0).unwrap();
    assert_eq!(cell, if outcome.hit { Cell::Hit } else { Cell::Miss });
}

#[tokio::test]
async fn test_abort_abandons_matchmaking() {
    let mut node = node_over(StubBackend::new(3).with_acceptance_delay(100_000));
    node.create_game(60, STUB_OPPONENT_ID).await.unwrap();

    let handle = node.abort_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.abort();
    });

    let phase = node.wait_for_opponent().await.unwrap();
    assert_eq!(phase, None);
    assert!(node.session().is_none());
    // abandonment cancelled server-side and the stake came back
    assert_eq!(node.balance().await.unwrap().balance, 1000);
}

#[tokio::test]
async fn test_fire_guards() {
    let mut node = node_over(StubBackend::new(4));
    assert!(node.fire(0, 0).await.is_err());

    node.create_game(10, STUB_OPPONENT_ID).await.unwrap();
    // still matchmaking; there is no battle to fire into
    assert!(node.fire(0, 0).await.is_err());
    // and a second game cannot be opened over this one
    assert!(node.create_game(10, STUB_OPPONENT_ID).await.is_err());
}

/// Wrapper that fails its first few status polls, as a lossy network
/// would. Polling must ride the failures out.
struct FlakyApi {
    inner: StubBackend,
    failures_left: AtomicU32,
}

#[async_trait::async_trait]
impl SeaBattleApi for FlakyApi {
    async fn list_players(&self) -> anyhow::Result<Vec<PlayerInfo>> {
        self.inner.list_players().await
    }

    async fn create_game(&self, bet: u64, opponent_id: &str) -> anyhow::Result<CreatedGame> {
        self.inner.create_game(bet, opponent_id).await
    }

    async fn cancel_game(&self, game_id: &str) -> anyhow::Result<()> {
        self.inner.cancel_game(game_id).await
    }

    async fn submit_ships(&self, game_id: &str, board: &[Vec<u8>]) -> anyhow::Result<()> {
        self.inner.submit_ships(game_id, board).await
    }

    async fn make_move(&self, game_id: &str, x: u8, y: u8) -> anyhow::Result<MoveOutcome> {
        self.inner.make_move(game_id, x, y).await
    }

    async fn get_status(&self, game_id: &str) -> anyhow::Result<StatusSnapshot> {
        if self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        }).is_ok()
        {
            return Err(anyhow::anyhow!("connection reset by peer"));
        }
        self.inner.get_status(game_id).await
    }

    async fn get_balance(&self) -> anyhow::Result<BalanceInfo> {
        self.inner.get_balance().await
    }
}

#[tokio::test]
async fn test_polling_rides_out_transport_failures() {
    let api = FlakyApi {
        inner: StubBackend::new(11),
        failures_left: AtomicU32::new(5),
    };
    let mut node =
        GameNode::new(Box::new(api), STUB_PLAYER_ID).with_poll_config(fast_poll());
    let mut rng = SmallRng::seed_from_u64(11);

    let phase = node.play(&mut rng, 30, STUB_OPPONENT_ID).await.unwrap();
    assert!(matches!(phase, Some(SessionPhase::Finished(_))));
}
