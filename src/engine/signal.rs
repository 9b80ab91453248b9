// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::watch;

/// One-shot, multi-waiter completion flag.
///
/// Fired exactly once by the owning module's run task, whether the module completed,
/// failed or was aborted. Any number of dependents may wait on it, before or after it
/// fires; waiting on a fired signal returns immediately. Everything the owner did
/// before `fire` is visible to a waiter once `wait` returns.
///
/// # Example
/// ```
/// use recipe_engine::engine::CompletionSignal;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let signal = CompletionSignal::new();
///     let waiter = signal.clone();
///     let handle = tokio::spawn(async move { waiter.wait().await });
///
///     signal.fire();
///     handle.await.unwrap();
///     assert!(signal.is_fired());
/// });
/// ```
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn fire(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_fired(&self) -> bool {
        *self.sender.borrow()
    }

    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel
        let _ = receiver.wait_for(|fired| *fired).await;
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
