// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yard_core::NotifyLevel;

#[tokio::test]
async fn fake_notify_records_calls() {
    let adapter = FakeNotifyAdapter::new();

    adapter
        .notify(Notification::success("Sync completed"))
        .await
        .unwrap();
    adapter
        .notify(Notification::error("Upload failed: offline"))
        .await
        .unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].level, NotifyLevel::Success);
    assert_eq!(
        adapter.messages(),
        vec!["Sync completed", "Upload failed: offline"]
    );
}

#[tokio::test]
async fn fake_notify_clones_share_records() {
    let adapter = FakeNotifyAdapter::new();
    let clone = adapter.clone();

    clone.notify(Notification::success("done")).await.unwrap();

    assert_eq!(adapter.calls().len(), 1);
}
