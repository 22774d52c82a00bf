//! Message loop driving the dashboard on tokio
//!
//! `update` runs on the caller's task only. Task futures and subscription
//! streams are spawned and report back through one channel.

use std::time::Duration;

use futures::StreamExt;
use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::app::subscriptions;
use crate::common::task::Task;
use crate::domains::users::{Dashboard, Message};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Timed out after {0:?} waiting for the dashboard")]
    TimedOut(Duration),
}

pub struct Runtime {
    dashboard: Dashboard,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
    tasks: JoinSet<()>,
    subscriptions: JoinSet<()>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("dashboard", &self.dashboard)
            .field("tasks", &self.tasks.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl Runtime {
    /// Start subscriptions and run the mount task.
    pub fn start(dashboard: Dashboard, boot: Task<Message>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut runtime = Self {
            dashboard,
            sender,
            receiver,
            tasks: JoinSet::new(),
            subscriptions: JoinSet::new(),
        };

        for mut stream in subscriptions::subscriptions(&runtime.dashboard) {
            let sender = runtime.sender.clone();
            runtime.subscriptions.spawn(async move {
                while let Some(message) = stream.next().await {
                    if sender.send(message).is_err() {
                        break;
                    }
                }
            });
        }

        runtime.spawn(boot);
        runtime
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Apply `message` and spawn whatever work it returns.
    pub fn dispatch(&mut self, message: Message) {
        let task = self.dashboard.update(message);
        self.spawn(task);
    }

    /// Wait for and process one message. The runtime holds a sender of its
    /// own, so the channel stays open until shutdown.
    pub async fn step(&mut self) {
        // Reap finished task handles so the set does not grow unbounded.
        while self.tasks.try_join_next().is_some() {}

        if let Some(message) = self.receiver.recv().await {
            self.dispatch(message);
        }
    }

    /// Process messages until `done` holds for the dashboard. Pair with
    /// [`Runtime::run_until_timeout`] when `done` may never hold.
    pub async fn run_until(&mut self, mut done: impl FnMut(&Dashboard) -> bool) {
        while !done(&self.dashboard) {
            self.step().await;
        }
    }

    pub async fn run_until_timeout(
        &mut self,
        timeout: Duration,
        done: impl FnMut(&Dashboard) -> bool,
    ) -> Result<(), RuntimeError> {
        tokio::time::timeout(timeout, self.run_until(done))
            .await
            .map_err(|_| RuntimeError::TimedOut(timeout))
    }

    /// Unmount the dashboard and stop every spawned task.
    pub fn shutdown(mut self) -> Dashboard {
        debug!(
            "[Runtime] Shutting down with {} task(s) outstanding",
            self.tasks.len()
        );
        self.dashboard.unmount();
        self.tasks.abort_all();
        self.subscriptions.abort_all();
        self.dashboard
    }

    fn spawn(&mut self, task: Task<Message>) {
        for future in task.into_futures() {
            let sender = self.sender.clone();
            self.tasks.spawn(async move {
                if let Some(message) = future.await {
                    let _ = sender.send(message);
                }
            });
        }
    }
}
