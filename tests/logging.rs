use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// The global subscriber can only be installed once per process, so this
// binary holds a single init test.
#[test]
#[serial]
fn writes_layout_events_to_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("callout.log");

    floating_callout::logging::init(true, Some(path.clone()));
    tracing::error!("callout log probe");

    let spec = floating_callout::callout::AttachmentSpec::new(
        floating_callout::callout::Size::new(0.0, 10.0),
        floating_callout::callout::Point::new(0.0, 0.0),
    );
    let mut window = floating_callout::callout::CalloutWindow::new(
        floating_callout::callout::ContentHandle(1),
        spec.view_size,
        spec.target_point,
    );
    let mut host = floating_callout::callout::RecordingHost::default();
    assert!(window.apply(&mut host).is_err());

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("callout log probe"));
    assert!(contents.contains("rejected callout geometry"));
}
