//! Snapshot reconciliation against SQLite and orchestrated runs.

mod support;

use std::sync::Arc;
use std::time::Duration;

use listwatch::adapter::outbound::sqlite::SqliteMarketRepository;
use listwatch::application::sync::SyncOrchestrator;
use listwatch::domain::{ExchangeId, MarketKind, SyncSummary};
use listwatch::error::Error;
use listwatch::port::{MarketFetcher, MarketRepository};
use listwatch::testkit::domain::{futures, spot};
use listwatch::testkit::fetcher::ScriptedFetcher;
use support::db::{market_state, temp_pool};

fn symbols(items: &[listwatch::domain::MarketItem]) -> Vec<(&str, MarketKind)> {
    items.iter().map(|i| (i.symbol.as_str(), i.kind)).collect()
}

#[tokio::test]
async fn repeated_snapshot_is_idempotent() {
    let (_dir, pool) = temp_pool();
    let repo = SqliteMarketRepository::new(pool);
    let snapshot = vec![
        spot(ExchangeId::BYBIT, "AAAUSDT", "AAA", "USDT"),
        futures(ExchangeId::BYBIT, "AAAUSDT", "AAA", "USDT"),
        spot(ExchangeId::BYBIT, "BBBUSDT", "BBB", "USDT"),
    ];

    let first = repo.sync_snapshot(ExchangeId::BYBIT, snapshot.clone()).await.unwrap();
    let second = repo.sync_snapshot(ExchangeId::BYBIT, snapshot).await.unwrap();

    assert_eq!(first, SyncSummary::new(3, 0, 0));
    assert_eq!(second, SyncSummary::default());
    let active = repo.load_active_by_exchange(ExchangeId::BYBIT).await.unwrap();
    assert_eq!(
        symbols(&active),
        vec![
            ("AAAUSDT", MarketKind::Spot),
            ("BBBUSDT", MarketKind::Spot),
            ("AAAUSDT", MarketKind::Futures),
        ]
    );
}

#[tokio::test]
async fn missing_rows_are_archived_and_reactivated() {
    let (_dir, pool) = temp_pool();
    let repo = SqliteMarketRepository::new(pool.clone());
    let aaa = spot(ExchangeId::OKX, "AAA-USDT", "AAA", "USDT");
    let bbb = spot(ExchangeId::OKX, "BBB-USDT", "BBB", "USDT");
    let state = |symbol: &str| market_state(&pool, ExchangeId::OKX, symbol, MarketKind::Spot);

    repo.sync_snapshot(ExchangeId::OKX, vec![aaa.clone(), bbb.clone()])
        .await
        .unwrap();
    assert_eq!(state("BBB-USDT"), (true, None));

    let dropped = repo.sync_snapshot(ExchangeId::OKX, vec![aaa.clone()]).await.unwrap();
    assert_eq!(dropped, SyncSummary::new(0, 0, 1));
    let (active, delisted_at) = state("BBB-USDT");
    assert!(!active);
    let delisted_at = delisted_at.expect("archived row carries a timestamp");
    assert!(chrono::DateTime::parse_from_rfc3339(&delisted_at).is_ok());
    assert_eq!(state("AAA-USDT"), (true, None));

    let back = repo.sync_snapshot(ExchangeId::OKX, vec![aaa, bbb]).await.unwrap();
    assert_eq!(back, SyncSummary::new(0, 1, 0));
    assert_eq!(state("BBB-USDT"), (true, None));
    assert_eq!(repo.load_active_by_exchange(ExchangeId::OKX).await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_snapshot_archives_everything() {
    let (_dir, pool) = temp_pool();
    let repo = SqliteMarketRepository::new(pool);
    repo.sync_snapshot(
        ExchangeId::UPBIT,
        vec![spot(ExchangeId::UPBIT, "KRW-AAA", "AAA", "KRW")],
    )
    .await
    .unwrap();

    let summary = repo.sync_snapshot(ExchangeId::UPBIT, Vec::new()).await.unwrap();

    assert_eq!(summary.archived, 1);
    assert!(repo.load_active_by_exchange(ExchangeId::UPBIT).await.unwrap().is_empty());
}

#[tokio::test]
async fn exchanges_do_not_touch_each_other() {
    let (_dir, pool) = temp_pool();
    let repo = SqliteMarketRepository::new(pool);
    repo.sync_snapshot(
        ExchangeId::BINANCE,
        vec![spot(ExchangeId::BINANCE, "AAAUSDT", "AAA", "USDT")],
    )
    .await
    .unwrap();

    repo.sync_snapshot(ExchangeId::COINBASE, Vec::new()).await.unwrap();

    assert_eq!(repo.load_active_by_exchange(ExchangeId::BINANCE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn changed_contract_size_counts_as_update() {
    let (_dir, pool) = temp_pool();
    let repo = SqliteMarketRepository::new(pool);
    let swap = futures(ExchangeId::OKX, "AAA-USDT-SWAP", "AAA", "USDT");

    repo.sync_snapshot(ExchangeId::OKX, vec![swap.clone().with_contract_size(Some(1))])
        .await
        .unwrap();
    let summary = repo
        .sync_snapshot(ExchangeId::OKX, vec![swap.with_contract_size(Some(10))])
        .await
        .unwrap();

    assert_eq!(summary, SyncSummary::new(0, 1, 0));
    let active = repo.load_active_by_exchange(ExchangeId::OKX).await.unwrap();
    assert_eq!(active[0].contract_size, Some(10));
}

#[tokio::test]
async fn concurrent_snapshots_of_one_exchange_serialize() {
    let (_dir, pool) = temp_pool();
    let repo = Arc::new(SqliteMarketRepository::new(pool));
    let snapshot: Vec<_> = (0..50)
        .map(|n| spot(ExchangeId::BINANCE, &format!("T{n}USDT"), &format!("T{n}"), "USDT"))
        .collect();

    let (a, b) = tokio::join!(
        repo.sync_snapshot(ExchangeId::BINANCE, snapshot.clone()),
        repo.sync_snapshot(ExchangeId::BINANCE, snapshot)
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.added + b.added, 50);
    assert_eq!(repo.load_active_by_exchange(ExchangeId::BINANCE).await.unwrap().len(), 50);
}

#[tokio::test]
async fn orchestrator_persists_survivors_when_one_exchange_fails() {
    let (_dir, pool) = temp_pool();
    let repo = Arc::new(SqliteMarketRepository::new(pool));
    let fetchers: Vec<Arc<dyn MarketFetcher>> = vec![
        Arc::new(
            ScriptedFetcher::new(ExchangeId::BINANCE, "binance")
                .with_spot(vec![spot(ExchangeId::BINANCE, "AAAUSDT", "AAA", "USDT")])
                .with_futures(vec![futures(ExchangeId::BINANCE, "AAAUSDT", "AAA", "USDT")]),
        ),
        Arc::new(
            ScriptedFetcher::new(ExchangeId::OKX, "okx")
                .failing_spot("http 503: busy")
                .failing_futures("http 503: busy"),
        ),
    ];
    let markets: Arc<dyn MarketRepository> = repo.clone();
    let orchestrator = SyncOrchestrator::new(fetchers, markets, Duration::from_secs(5));

    let report = orchestrator.run_all().await.unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.total(), SyncSummary::new(2, 0, 0));
    assert_eq!(repo.load_active_by_exchange(ExchangeId::BINANCE).await.unwrap().len(), 2);
}

#[tokio::test]
async fn orchestrator_errors_when_every_exchange_fails() {
    let (_dir, pool) = temp_pool();
    let markets: Arc<dyn MarketRepository> = Arc::new(SqliteMarketRepository::new(pool));
    let fetchers: Vec<Arc<dyn MarketFetcher>> = vec![Arc::new(
        ScriptedFetcher::new(ExchangeId::UPBIT, "upbit")
            .failing_spot("transport error")
            .failing_futures("transport error"),
    )];
    let orchestrator = SyncOrchestrator::new(fetchers, markets, Duration::from_secs(5));

    let err = orchestrator.run_all().await.unwrap_err();

    match err {
        Error::SyncFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert!(failures.to_string().starts_with("upbit:"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
