mod common;

use common::*;
use file_uploader::config::LocalConfig;
use file_uploader::{
    ChannelEvents, FileUploader, RawFile, UploadBounds, UploadStatus, UploaderConfig,
    UploaderEvent,
};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

fn local(delay_ms: u64) -> UploaderConfig {
    UploaderConfig::Local(LocalConfig {
        simulation_delay: Some(Duration::from_millis(delay_ms)),
    })
}

fn queue(bounds: UploadBounds, delay_ms: u64) -> (FileUploader, Receiver<UploaderEvent>) {
    let (events, rx) = ChannelEvents::new();
    let uploader = FileUploader::builder()
        .bounds(bounds)
        .uploader(local(delay_ms))
        .events(events)
        .build();
    (uploader, rx)
}

fn multi(max_files: usize) -> UploadBounds {
    UploadBounds {
        multiple: true,
        max_files,
        ..UploadBounds::default()
    }
}

fn image(name: &str, size: usize) -> RawFile {
    RawFile::new(name, "image/png", vec![1u8; size])
}

#[test]
fn test_capacity_holds_across_calls() {
    let (uploader, rx) = queue(multi(3), 10);

    uploader.add_files(vec![image("a.png", 1), image("b.png", 1)]);
    uploader.add_files(vec![image("c.png", 1), image("d.png", 1)]);
    uploader.add_files(vec![image("e.png", 1)]);

    assert_eq!(uploader.len(), 3);
    let events = drain(&rx);
    let rejected: Vec<_> = failures(&events)
        .into_iter()
        .map(|(file, msg)| (file.name, msg))
        .collect();
    assert_eq!(
        rejected,
        vec![
            ("d.png".to_string(), "Cannot add more than 3 files.".to_string()),
            ("e.png".to_string(), "Cannot add more than 3 files.".to_string()),
        ]
    );
    // One notification per call, even when nothing was accepted.
    assert_eq!(
        count(&events, |e| matches!(e, UploaderEvent::FilesAdded(_))),
        3
    );
    assert_eq!(
        count(&events, |e| matches!(e, UploaderEvent::FilesAdded(f) if f.is_empty())),
        1
    );
}

#[test]
fn test_oversized_files_are_rejected_anywhere_in_the_batch() {
    let (uploader, rx) = queue(
        UploadBounds {
            max_size: 100,
            ..multi(10)
        },
        10,
    );

    uploader.add_files(vec![
        image("big-first.png", 101),
        image("ok.png", 100),
        image("big-last.png", 500),
    ]);

    let files = uploader.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "ok.png");
    assert_eq!(files[0].status, UploadStatus::Pending);
    assert_eq!(files[0].progress, 0);
    assert!(files[0].preview_url.is_some());

    let rejected = failures(&drain(&rx));
    assert_eq!(rejected.len(), 2);
    assert!(rejected
        .iter()
        .all(|(_, msg)| msg == "File size exceeds the limit of 100 bytes."));
    // Rejected files never get a preview reference.
    assert!(rejected.iter().all(|(f, _)| f.preview_url.is_none()));
    assert_eq!(uploader.previews().live_count(), 1);
}

#[test]
fn test_capacity_is_checked_before_size() {
    let (uploader, rx) = queue(
        UploadBounds {
            max_size: 10,
            ..multi(1)
        },
        10,
    );

    uploader.add_files(vec![image("a.png", 1), image("huge.png", 1000)]);

    let rejected = failures(&drain(&rx));
    assert_eq!(rejected[0].1, "Cannot add more than 1 files.");
}

#[test]
fn test_remove_is_idempotent() {
    let (uploader, rx) = queue(multi(5), 10);
    uploader.add_files(vec![image("a.png", 1), image("b.png", 1)]);
    let first = uploader.files()[0].id;

    uploader.remove_file(first);
    uploader.remove_file(first);

    let names: Vec<_> = uploader.files().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["b.png"]);
    assert_eq!(uploader.previews().live_count(), 1);
    assert_eq!(
        count(&drain(&rx), |e| matches!(e, UploaderEvent::FileRemoved(_))),
        1
    );
}

#[test]
fn test_rename_changes_display_name_only() {
    let (uploader, _rx) = queue(multi(5), 10);
    uploader.add_files(vec![image("a.png", 4)]);
    let before = uploader.files()[0].clone();

    uploader.rename_file(before.id, "x.png");
    uploader.rename_file(before.id, "y.png");

    let after = uploader.get(before.id).unwrap();
    assert_eq!(after.name, "y.png");
    assert_eq!(after.file.name(), "a.png");
    assert_eq!(after.status, before.status);
    assert_eq!(after.preview_url, before.preview_url);
}

#[tokio::test]
async fn test_local_upload_reports_five_steps() {
    let (uploader, rx) = queue(multi(5), 250);
    uploader.add_files(vec![image("a.png", 10)]);
    let id = uploader.files()[0].id;
    drain(&rx);

    let started = Instant::now();
    uploader.upload_file(id).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(240), "took {elapsed:?}");
    let events = drain(&rx);
    assert!(matches!(&events[0], UploaderEvent::UploadStarted(f) if f.status == UploadStatus::Pending));
    assert_eq!(progress_of(&events), vec![20, 40, 60, 80, 100]);
    assert!(matches!(
        events.last(),
        Some(UploaderEvent::Succeeded(f, Some(location))) if location == "a.png" && f.progress == 100
    ));
}

#[tokio::test]
async fn test_concurrent_batches_run_once() {
    let (uploader, rx) = queue(multi(5), 100);
    uploader.add_files(vec![image("a.png", 1), image("b.png", 1), image("c.png", 1)]);
    drain(&rx);

    tokio::join!(uploader.start_all_uploads(), uploader.start_all_uploads());

    let events = drain(&rx);
    assert_eq!(
        count(&events, |e| matches!(e, UploaderEvent::UploadStarted(_))),
        3
    );
    assert_eq!(
        count(&events, |e| matches!(e, UploaderEvent::AllUploadsComplete(_))),
        1
    );
    assert!(uploader.files().iter().all(|f| f.is_success()));
    assert!(!uploader.is_uploading());
    assert_eq!(
        uploader.form_value(),
        r#"["a.png","b.png","c.png"]"#
    );
}

#[tokio::test]
async fn test_batch_runs_files_in_parallel() {
    let (uploader, _rx) = queue(multi(5), 200);
    uploader.add_files((0..4).map(|i| image(&format!("{i}.png"), 1)));

    let started = Instant::now();
    uploader.start_all_uploads().await;

    assert!(started.elapsed() < Duration::from_millis(700));
    assert_eq!(uploader.pending_count(), 0);
}

#[tokio::test]
async fn test_start_all_is_noop_when_nothing_to_do() {
    let (uploader, rx) = queue(multi(5), 10);

    uploader.start_all_uploads().await;
    assert!(drain(&rx).is_empty());

    uploader.add_files(vec![image("a.png", 1)]);
    uploader.start_all_uploads().await;
    drain(&rx);

    uploader.start_all_uploads().await;
    assert!(drain(&rx).is_empty());
}

#[tokio::test]
async fn test_batch_skips_non_pending_entries() {
    let (uploader, rx) = queue(multi(5), 10);
    uploader.add_files(vec![image("a.png", 1)]);
    uploader.start_all_uploads().await;

    uploader.add_files(vec![image("b.png", 1)]);
    drain(&rx);
    uploader.start_all_uploads().await;

    let events = drain(&rx);
    let started: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            UploaderEvent::UploadStarted(f) => Some(f.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec!["b.png"]);
    assert!(matches!(
        events.last(),
        Some(UploaderEvent::AllUploadsComplete(files)) if files.len() == 2
    ));
}

#[tokio::test]
async fn test_input_closes_while_batch_in_flight() {
    let (uploader, _rx) = queue(multi(5), 200);
    uploader.add_files(vec![image("a.png", 1)]);

    let batch = {
        let uploader = uploader.clone();
        tokio::spawn(async move { uploader.start_all_uploads().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(uploader.is_uploading());
    assert!(!uploader.accepts_input());
    let ignored = uploader.drop_files(vec![image("late.png", 1)]);
    assert_eq!(ignored.len(), 1);

    batch.await.unwrap();
    assert!(uploader.accepts_input());
    assert_eq!(uploader.len(), 1);
}

#[test]
fn test_disabled_refuses_drops() {
    let (uploader, rx) = queue(
        UploadBounds {
            disabled: true,
            ..multi(5)
        },
        10,
    );

    let ignored = uploader.drop_files(vec![image("a.png", 1)]);

    assert_eq!(ignored.len(), 1);
    assert!(uploader.is_empty());
    assert!(drain(&rx).is_empty());
}

#[test]
fn test_single_mode_keeps_first_dropped_file() {
    let (uploader, _rx) = queue(UploadBounds::default(), 10);

    let ignored = uploader.drop_files(vec![image("a.png", 1), image("b.png", 1)]);

    assert_eq!(ignored.len(), 1);
    assert_eq!(uploader.files()[0].name, "a.png");
}

#[tokio::test]
async fn test_abandoned_batch_still_completes() {
    let (uploader, rx) = queue(multi(5), 300);
    uploader.add_files(vec![image("a.png", 1)]);
    let id = uploader.files()[0].id;

    let waited =
        tokio::time::timeout(Duration::from_millis(50), uploader.start_all_uploads()).await;
    assert!(waited.is_err());

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(uploader.get(id).unwrap().is_success());
    assert!(!uploader.is_uploading());
    assert!(uploader.accepts_input());
    assert_eq!(
        count(&drain(&rx), |e| matches!(e, UploaderEvent::AllUploadsComplete(_))),
        1
    );
}
