#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use chain_tape::run::until_shutdown;

// Kept alone in this binary: it sends SIGINT to the test process.
#[tokio::test]
async fn test_interrupt_between_polls_is_kept() {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // First pass installs the handler and lets the work win.
    let first = until_shutdown(shutdown.as_mut(), tokio::time::sleep(Duration::from_millis(20))).await;
    assert_eq!(first, Some(()));

    // Interrupt while nothing is polling the signal future.
    let status = Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let second = until_shutdown(shutdown.as_mut(), tokio::time::sleep(Duration::from_secs(10))).await;
    assert_eq!(second, None);
}
