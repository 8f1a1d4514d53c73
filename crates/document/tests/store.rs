use dotenv_document::{backup_path, load, render, save, BackupOutcome, DocumentError};
use tempfile::TempDir;

#[tokio::test]
async fn load_select_save_writes_file_and_backup() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join(".env");
    tokio::fs::write(&path, "FOO=1\n#FOO=2\nBAR=x\n")
        .await
        .expect("write fixture");

    let mut doc = load(&path).await.expect("load").document;
    let foo = doc.group_position("FOO").expect("FOO");
    assert!(doc.choose_member(foo, 1));

    let report = save(&path, &render(&doc)).await.expect("save");
    assert_eq!(report.backup, BackupOutcome::Written(backup_path(&path)));

    let written = tokio::fs::read_to_string(&path).await.expect("read back");
    assert_eq!(written, "#FOO=1\nFOO=2\nBAR=x\n");
    let backup = tokio::fs::read_to_string(backup_path(&path))
        .await
        .expect("read backup");
    assert_eq!(backup, "FOO=1\n#FOO=2\nBAR=x\n");
}

#[tokio::test]
async fn backup_is_overwritten_on_every_save() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("app.env");
    tokio::fs::write(&path, "A=1\n").await.expect("write fixture");

    save(&path, "A=2\n").await.expect("first save");
    save(&path, "A=3\n").await.expect("second save");

    let backup = tokio::fs::read_to_string(backup_path(&path))
        .await
        .expect("read backup");
    assert_eq!(backup, "A=2\n");
}

#[tokio::test]
async fn save_without_existing_file_skips_backup() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("fresh.env");

    let report = save(&path, "A=1\n").await.expect("save");
    assert_eq!(report.backup, BackupOutcome::Skipped);
    assert_eq!(report.bytes, 4);
}

#[tokio::test]
async fn failed_backup_does_not_block_the_write() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join(".env");
    tokio::fs::write(&path, "A=1\n").await.expect("write fixture");
    // A directory squatting on the backup path makes the copy fail.
    tokio::fs::create_dir(backup_path(&path))
        .await
        .expect("block backup path");

    let report = save(&path, "#A=1\n").await.expect("save");
    assert!(matches!(report.backup, BackupOutcome::Failed(_)));
    let written = tokio::fs::read_to_string(&path).await.expect("read back");
    assert_eq!(written, "#A=1\n");
}

#[tokio::test]
async fn load_reports_missing_file_and_bad_quotes() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("nope.env");
    let err = load(&missing).await.unwrap_err();
    assert!(err.is_not_found());

    let bad = temp.path().join("bad.env");
    tokio::fs::write(&bad, "A='unterminated\n")
        .await
        .expect("write fixture");
    let err = load(&bad).await.unwrap_err();
    assert!(matches!(err, DocumentError::UnterminatedQuote { line: 1, .. }));
}

#[tokio::test]
async fn load_rejects_non_utf8() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("binary.env");
    tokio::fs::write(&path, [0x41, 0x3d, 0xff, 0xfe, 0x0a])
        .await
        .expect("write fixture");
    let err = load(&path).await.unwrap_err();
    assert!(matches!(err, DocumentError::NotUtf8 { .. }));
}
