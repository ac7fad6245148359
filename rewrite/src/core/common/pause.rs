// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

/// Suspend the current task for `duration`, letting other tasks (and the host's own
/// event handlers) run. A zero duration still yields to the scheduler once, so the
/// ordering "dispatch, then let listeners observe" holds even when all delays are
/// disabled in tests.
pub async fn pause(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}
