//! Deferred work returned from `update`.
//!
//! A [`Task`] is a batch of futures that each resolve to at most one message.
//! The runtime spawns them and feeds the resulting messages back into the
//! domain; tests can simply `collect()` them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, join_all};
use tokio_util::sync::CancellationToken;

#[must_use = "tasks do nothing unless they are run"]
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, Option<M>>>,
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

impl<M: Send + 'static> Task<M> {
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Resolve immediately with `message`.
    pub fn done(message: M) -> Self {
        Self {
            futures: vec![async move { Some(message) }.boxed()],
        }
    }

    /// Run `future` and map its output into a message.
    pub fn perform<T, F>(
        future: F,
        f: impl FnOnce(T) -> M + Send + 'static,
    ) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            futures: vec![future.map(|output| Some(f(output))).boxed()],
        }
    }

    /// Like [`Task::perform`], but yields nothing once `token` is cancelled.
    pub fn cancellable<T, F>(
        token: CancellationToken,
        future: F,
        f: impl FnOnce(T) -> M + Send + 'static,
    ) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let future = async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(f(output)),
            }
        };
        Self {
            futures: vec![future.boxed()],
        }
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn map<N: Send + 'static>(
        self,
        f: impl Fn(M) -> N + Send + Sync + 'static,
    ) -> Task<N> {
        let f = Arc::new(f);
        Task {
            futures: self
                .futures
                .into_iter()
                .map(|future| {
                    let f = Arc::clone(&f);
                    future.map(move |message| message.map(|m| f(m))).boxed()
                })
                .collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn into_futures(self) -> Vec<BoxFuture<'static, Option<M>>> {
        self.futures
    }

    /// Drive every future to completion and gather the messages they yield.
    pub async fn collect(self) -> Vec<M> {
        join_all(self.futures).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_collects_every_message() {
        let task = Task::batch(vec![
            Task::done(1),
            Task::none(),
            Task::perform(async { 20 }, |v| v + 1),
        ]);
        assert_eq!(task.len(), 2);
        assert_eq!(task.collect().await, vec![1, 21]);
    }

    #[tokio::test]
    async fn cancelled_task_yields_nothing() {
        let token = CancellationToken::new();
        let task = Task::cancellable(
            token.clone(),
            std::future::pending::<()>(),
            |_| "late",
        );
        token.cancel();
        assert!(task.collect().await.is_empty());
    }

    #[tokio::test]
    async fn map_rewrites_messages() {
        let task = Task::done(2).map(|v| v * 10);
        assert_eq!(task.collect().await, vec![20]);
    }
}
