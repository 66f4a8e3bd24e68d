use std::sync::Arc;

use backend::storage::{JsonFileStorage, LeagueStorage, MemoryStorage, Store};
use pretty_assertions::assert_eq;
use scoring::model::{MatchDraft, PlayerAppearance, Side};
use scoring::{Ledger, Tier};

fn draft(winner: Side) -> MatchDraft {
    MatchDraft {
        date: "2025-12-05".to_owned(),
        winner,
        radiant_players: vec![PlayerAppearance::named("a"), PlayerAppearance::named("b")],
        dire_players: vec![PlayerAppearance::named("c"), PlayerAppearance::named("d")],
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 12, 5)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn missing_document_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("league.json"));

    let ledger = storage.load().await.unwrap();

    assert_eq!(Ledger::new(), ledger);
}

#[tokio::test]
async fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("league.json");
    let storage = JsonFileStorage::new(&path);

    let mut ledger = Ledger::new();
    ledger.set_override("a", Tier::Elite);
    ledger.add(draft(Side::Radiant), now());
    ledger.add(draft(Side::Dire), now());
    storage.save(&ledger).await.unwrap();

    assert!(path.exists());
    assert!(!dir.path().join("nested").join("league.json.tmp").exists());

    let loaded = storage.duplicate().load().await.unwrap();
    assert_eq!(ledger, loaded);
}

#[tokio::test]
async fn corrupt_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = JsonFileStorage::new(&path).load().await;

    assert!(matches!(
        result,
        Err(backend::storage::StorageError::Json(_))
    ));
}

#[tokio::test]
async fn memory_duplicates_share_document() {
    let storage = MemoryStorage::new();
    let other = storage.duplicate();

    let mut ledger = Ledger::new();
    ledger.add(draft(Side::Radiant), now());
    storage.save(&ledger).await.unwrap();

    assert_eq!(1, other.load().await.unwrap().matches().len());
}

#[tokio::test]
async fn transactions_persist_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(Box::new(JsonFileStorage::new(dir.path().join("league.json"))));

    let committed = store
        .transaction(|ledger| ledger.add(draft(Side::Radiant), now()))
        .await
        .unwrap();
    assert_eq!(1, committed.match_id);

    let deleted = store.transaction(|ledger| ledger.delete(7)).await.unwrap();
    assert!(!deleted);

    let players = store.read(|ledger| ledger.players().len()).await.unwrap();
    assert_eq!(4, players);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transactions_do_not_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::new(Box::new(JsonFileStorage::new(
        dir.path().join("league.json"),
    ))));

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                let winner = if n % 2 == 0 { Side::Radiant } else { Side::Dire };
                store
                    .transaction(|ledger| ledger.add(draft(winner), now()).match_id)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();

    assert_eq!((1..=16).collect::<Vec<u64>>(), ids);

    let (matches, games) = store
        .read(|ledger| {
            (
                ledger.matches().len(),
                ledger.players().get("a").map(|p| p.total_games),
            )
        })
        .await
        .unwrap();
    assert_eq!(16, matches);
    assert_eq!(Some(16), games);
}
