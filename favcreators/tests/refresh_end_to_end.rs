//! Refresh runs over a scripted transport, from probes down to the merged
//! collection.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use favcreators::commands::CommandExecutor;
use favcreators::cli::OutputFormat;
use favcreators::monitor::FixedClock;
use favcreators::{AppConfig, Creator, CreatorStore, SocialAccount};
use live_status::testing::{Reply, ScriptedTransport};
use live_status::{LiveSignal, Platform};
use tokio_util::sync::CancellationToken;

fn refresh_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 18, 30, 0).unwrap()
}

fn earlier() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 30, 9, 0, 0).unwrap()
}

fn account(platform: Platform, username: &str, signal: Option<LiveSignal>) -> SocialAccount {
    let mut account = SocialAccount::new(platform, username);
    account.live_status = signal;
    account.last_checked = Some(earlier());
    account
}

fn collection() -> Vec<Creator> {
    vec![
        Creator::new("Alpha")
            .with_account(account(Platform::Twitch, "alpha", Some(LiveSignal::Live)))
            .with_account(account(Platform::Kick, "alpha", Some(LiveSignal::Offline))),
        Creator::new("Bravo")
            .with_account(account(Platform::Tiktok, "bravo", None))
            .with_account(account(Platform::Youtube, "bravo", Some(LiveSignal::Offline))),
        Creator::new("Charlie")
            .with_account(account(Platform::Kick, "charlie", Some(LiveSignal::Live)))
            .with_account(account(Platform::Instagram, "charlie", None)),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_total_relay_failure_keeps_signals_and_stamps_every_account() {
    let transport = Arc::new(ScriptedTransport::new());
    let monitor = AppConfig::default()
        .status_monitor(transport.clone(), CancellationToken::new())
        .with_clock(Arc::new(FixedClock(refresh_time())));

    let before = collection();
    let after = monitor.refresh_all(&before).await;

    assert_eq!(after.len(), 3);
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.is_live(), new.is_live());
        assert_eq!(new.last_checked, Some(refresh_time()));
        for (old_account, new_account) in old.accounts.iter().zip(&new.accounts) {
            assert_eq!(old_account.live_status, new_account.live_status);
            assert_eq!(new_account.last_checked, Some(refresh_time()));
        }
    }
    // Instagram has no probe and never reaches the network.
    assert!(transport.requests().iter().all(|url| !url.contains("instagram")));
    assert!(transport.request_count() > 0);
}

#[tokio::test(start_paused = true)]
async fn test_definitive_results_replace_stored_state() {
    let kick_live = format!(r#"{{"slug":"charlie","livestream":{{"is_live":true}},"x":"{}"}}"#, "y".repeat(30));
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("https://decapi.me/twitch/uptime/alpha", Reply::ok("alpha is offline"))
            .route(
                "https://api.allorigins.win/raw?url=https%3A%2F%2Fkick.com%2Fapi%2Fv2%2Fchannels%2Fcharlie",
                Reply::ok(kick_live),
            ),
    );
    let monitor = AppConfig::default()
        .status_monitor(transport, CancellationToken::new())
        .with_clock(Arc::new(FixedClock(refresh_time())));

    let mut before = collection();
    before[2].accounts[0].live_status = Some(LiveSignal::Offline);
    before[2].refresh_is_live();
    assert!(!before[2].is_live());

    let after = monitor.refresh_all(&before).await;

    assert_eq!(after[0].accounts[0].live_status, Some(LiveSignal::Offline));
    assert!(!after[0].is_live());
    assert_eq!(after[2].accounts[0].live_status, Some(LiveSignal::Live));
    assert!(after[2].is_live());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_command_persists_collection() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("creators.json");

    let store = CreatorStore::open(&data_file).await.unwrap();
    store.replace(collection());
    store.save().await.unwrap();

    let executor = CommandExecutor::with_transport(
        AppConfig::default(),
        data_file.clone(),
        Arc::new(ScriptedTransport::new().route("https://decapi.me/", Reply::Hang)),
    );
    executor.refresh(None, OutputFormat::Json).await.unwrap();

    let saved = CreatorStore::load(&data_file).await.unwrap();
    assert_eq!(saved.len(), 3);
    assert!(saved[0].is_live());
    assert!(saved.iter().all(|c| c.last_checked.is_some()));
    assert!(
        saved
            .iter()
            .flat_map(|c| &c.accounts)
            .all(|a| a.last_checked.is_some() && a.last_checked != Some(earlier()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_refresh_command_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let executor = CommandExecutor::with_transport(
        AppConfig::default(),
        dir.path().join("creators.json"),
        Arc::new(ScriptedTransport::new()),
    );
    let err = executor
        .refresh(Some("missing"), OutputFormat::Pretty)
        .await
        .unwrap_err();
    assert!(matches!(err, favcreators::Error::NotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_batch_duration_is_bounded_by_throttle_and_backoff() {
    let monitor = AppConfig::default()
        .status_monitor(Arc::new(ScriptedTransport::new()), CancellationToken::new());

    let started = tokio::time::Instant::now();
    monitor.refresh_all(&collection()).await;
    let elapsed = started.elapsed();

    // Two throttle gaps plus, per creator, at most two relay passes of
    // backoff (1s + 2s) for each sequential fallback source.
    assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(20), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_bios_command_fills_only_empty_bios() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("creators.json");

    let mut creators = collection();
    creators[0].bio = "Hand-written bio".to_string();
    let store = CreatorStore::open(&data_file).await.unwrap();
    store.replace(creators);
    store.save().await.unwrap();

    let description = "Nightly variety streams, retro speedruns and the odd cooking show";
    let page = format!(
        r#"<html><head><meta property="og:description" content="{description}"></head>{}</html>"#,
        " ".repeat(40)
    );
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("https://api.allorigins.win/raw?url=https%3A%2F%2Fwww.youtube.com%2F", Reply::ok(page))
            .route("https://api.allorigins.win/", Reply::status(404, ""))
            .route("https://r.jina.ai/", Reply::status(404, "")),
    );
    let executor = CommandExecutor::with_transport(AppConfig::default(), data_file.clone(), transport);

    assert_eq!(executor.bios().await.unwrap(), 1);

    let saved = CreatorStore::load(&data_file).await.unwrap();
    assert_eq!(saved[0].bio, "Hand-written bio");
    assert_eq!(saved[1].bio, description);
    assert_eq!(saved[2].bio, "");
}

#[test]
fn test_config_show_renders_effective_config() {
    let dir = tempfile::tempdir().unwrap();
    let executor = CommandExecutor::with_transport(
        AppConfig::default(),
        dir.path().join("creators.json"),
        Arc::new(ScriptedTransport::new()),
    );
    executor.config_show().unwrap();
}
