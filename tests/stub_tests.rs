use rand::rngs::SmallRng;
use rand::SeedableRng;
use sea_battle::domain::BackendStatus;
use sea_battle::{
    random_placement, Fleet, SeaBattleApi, StubBackend, STUB_OPPONENT_ID,
};

async fn created(stub: &StubBackend, bet: u64) -> String {
    stub.create_game(bet, STUB_OPPONENT_ID).await.unwrap().id
}

fn legal_snapshot(seed: u64) -> Vec<Vec<u8>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut fleet = Fleet::new();
    random_placement(&mut rng, &mut fleet).snapshot()
}

/// Drive the stub to battle: accept, submit, and wait out the readiness
/// countdown.
async fn to_battle(stub: &StubBackend, game_id: &str, seed: u64) {
    while stub.get_status(game_id).await.unwrap().status != BackendStatus::Accepted {}
    stub.submit_ships(game_id, &legal_snapshot(seed)).await.unwrap();
    while stub.get_status(game_id).await.unwrap().status != BackendStatus::Battle {}
}

#[tokio::test]
async fn test_acceptance_countdown() {
    let stub = StubBackend::new(0).with_acceptance_delay(2);
    let id = created(&stub, 10).await;

    // backend-internal status first, then acceptance
    assert_eq!(
        stub.get_status(&id).await.unwrap().status,
        BackendStatus::Unknown
    );
    assert_eq!(
        stub.get_status(&id).await.unwrap().status,
        BackendStatus::Accepted
    );
}

#[tokio::test]
async fn test_bet_accounting() {
    let stub = StubBackend::new(0);
    assert_eq!(stub.get_balance().await.unwrap().balance, 1000);

    let id = created(&stub, 300).await;
    assert_eq!(stub.get_balance().await.unwrap().balance, 700);

    stub.cancel_game(&id).await.unwrap();
    assert_eq!(stub.get_balance().await.unwrap().balance, 1000);

    // the whole bankroll cannot be overcommitted
    assert!(stub.create_game(1001, STUB_OPPONENT_ID).await.is_err());
}

#[tokio::test]
async fn test_snapshot_validation() {
    let stub = StubBackend::new(5);
    let id = created(&stub, 10).await;
    while stub.get_status(&id).await.unwrap().status != BackendStatus::Accepted {}

    // wrong dimensions
    assert!(stub
        .submit_ships(&id, &vec![vec![0u8; 10]; 9])
        .await
        .is_err());
    // hit/miss codes never appear pre-battle
    let mut tainted = legal_snapshot(5);
    tainted[0][0] = 3;
    assert!(stub.submit_ships(&id, &tainted).await.is_err());
    // short fleet
    let empty = vec![vec![0u8; 10]; 10];
    assert!(stub.submit_ships(&id, &empty).await.is_err());

    stub.submit_ships(&id, &legal_snapshot(5)).await.unwrap();
    // one fleet per game
    assert!(stub.submit_ships(&id, &legal_snapshot(6)).await.is_err());
}

#[tokio::test]
async fn test_move_refereeing() {
    let stub = StubBackend::new(8);
    let id = created(&stub, 10).await;

    // no moves before the battle opens
    assert!(stub.make_move(&id, 0, 0).await.is_err());

    to_battle(&stub, &id, 8).await;
    let outcome = stub.make_move(&id, 0, 0).await.unwrap();
    if outcome.hit {
        // a hit keeps the turn but the same cell cannot be shot again
        assert!(stub.make_move(&id, 0, 0).await.is_err());
    } else {
        // a miss hands the turn to the bot until the next status poll
        assert!(stub.make_move(&id, 1, 1).await.is_err());
        let snap = stub.get_status(&id).await.unwrap();
        assert!(snap.last_move.is_some());
        // the bot's streak always ends in a miss or in victory
        let last = snap.last_move.unwrap();
        assert!(!last.hit || last.game_over);
    }
}

#[tokio::test]
async fn test_out_of_range_shot_is_refused() {
    let stub = StubBackend::new(2);
    let id = created(&stub, 10).await;
    to_battle(&stub, &id, 2).await;
    assert!(stub.make_move(&id, 10, 0).await.is_err());
    assert!(stub.make_move(&id, 0, 255).await.is_err());
}

#[tokio::test]
async fn test_unknown_game_id() {
    let stub = StubBackend::new(1);
    assert!(stub.get_status("game-404").await.is_err());
    assert!(stub.cancel_game("game-404").await.is_err());
    let _ = created(&stub, 10).await;
    assert!(stub.get_status("game-404").await.is_err());
}

#[tokio::test]
async fn test_cancel_window_closes_at_battle() {
    let stub = StubBackend::new(6);
    let id = created(&stub, 10).await;
    to_battle(&stub, &id, 6).await;
    assert!(stub.cancel_game(&id).await.is_err());
}
