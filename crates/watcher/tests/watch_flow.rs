use dotenv_watcher::{FileWatcher, WatchEvent, WatcherConfig};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn fast_config() -> WatcherConfig {
    WatcherConfig {
        debounce: Duration::from_millis(200),
        notify_poll_interval: Duration::from_millis(100),
    }
}

async fn setup() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join(".env");
    tokio::fs::write(&path, "A=1\n").await.expect("write fixture");
    (temp, path)
}

#[cfg_attr(
    not(target_os = "linux"),
    ignore = "watcher timing test is only reliable on Linux"
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn burst_of_writes_is_coalesced_into_one_change() {
    let (_temp, path) = setup().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = FileWatcher::start(&path, fast_config(), tx, |e| e).expect("start watcher");

    for i in 0..4 {
        tokio::fs::write(&path, format!("A={i}\n"))
            .await
            .expect("write");
        tokio::time::sleep(Duration::from_millis(40)).await;
    }

    let first = timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("change delivered before timeout");
    assert_eq!(first, Some(WatchEvent::Changed));

    let extra = timeout(Duration::from_millis(600), rx.recv()).await;
    assert!(extra.is_err(), "burst produced more than one change: {extra:?}");

    watcher.stop();
}

#[cfg_attr(
    not(target_os = "linux"),
    ignore = "watcher timing test is only reliable on Linux"
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watch_rearms_after_each_change() {
    let (_temp, path) = setup().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = FileWatcher::start(&path, fast_config(), tx, |e| e).expect("start watcher");

    for round in 0..2 {
        tokio::fs::write(&path, format!("A={round}\n"))
            .await
            .expect("write");
        let got = timeout(Duration::from_secs(3), rx.recv())
            .await
            .unwrap_or_else(|_| panic!("change {round} delivered before timeout"));
        assert_eq!(got, Some(WatchEvent::Changed));

        // Let the debounce window pass before the next write.
        tokio::time::sleep(Duration::from_millis(400)).await;
    }
}

#[cfg_attr(
    not(target_os = "linux"),
    ignore = "watcher timing test is only reliable on Linux"
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sibling_files_are_ignored() {
    let (temp, path) = setup().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = FileWatcher::start(&path, fast_config(), tx, |e| e).expect("start watcher");

    tokio::fs::write(temp.path().join(".env.bak"), "A=0\n")
        .await
        .expect("write sibling");

    let got = timeout(Duration::from_millis(700), rx.recv()).await;
    assert!(got.is_err(), "sibling write leaked through: {got:?}");
}

#[cfg_attr(
    not(target_os = "linux"),
    ignore = "watcher timing test is only reliable on Linux"
)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rename_over_the_target_is_seen() {
    let (temp, path) = setup().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = FileWatcher::start(&path, fast_config(), tx, |e| e).expect("start watcher");

    let staged = temp.path().join(".env.tmp");
    tokio::fs::write(&staged, "A=2\n").await.expect("write staged");
    tokio::fs::rename(&staged, &path).await.expect("rename over");

    let got = timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("change delivered before timeout");
    assert_eq!(got, Some(WatchEvent::Changed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_closes_the_inbox() {
    let (_temp, path) = setup().await;
    let (tx, mut rx) = mpsc::unbounded_channel::<WatchEvent>();
    let watcher = FileWatcher::start(&path, fast_config(), tx, |e| e).expect("start watcher");

    watcher.stop();
    let closed = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("inbox closes after stop");
    assert_eq!(closed, None);
}

#[tokio::test]
async fn missing_target_fails_to_start() {
    let temp = TempDir::new().expect("tempdir");
    let (tx, _rx) = mpsc::unbounded_channel::<WatchEvent>();
    let result = FileWatcher::start(&temp.path().join("absent.env"), fast_config(), tx, |e| e);
    assert!(result.is_err());
}
