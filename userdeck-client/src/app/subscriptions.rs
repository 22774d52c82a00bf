//! Watch channels surfaced as message streams

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;

use crate::domains::network::ConnectivityEvent;
use crate::domains::users::{Dashboard, Message};

/// Every subscription the mounted dashboard listens to
pub fn subscriptions(dashboard: &Dashboard) -> Vec<BoxStream<'static, Message>> {
    vec![
        cache_changes(dashboard.cache().subscribe()),
        connectivity(dashboard.network().subscribe()),
    ]
}

pub fn cache_changes(revisions: watch::Receiver<u64>) -> BoxStream<'static, Message> {
    stream::unfold(revisions, |mut revisions| async move {
        revisions.changed().await.ok()?;
        Some((Message::CacheChanged, revisions))
    })
    .boxed()
}

pub fn connectivity(online: watch::Receiver<bool>) -> BoxStream<'static, Message> {
    stream::unfold(online, |mut online| async move {
        online.changed().await.ok()?;
        let event = if *online.borrow_and_update() {
            ConnectivityEvent::Online
        } else {
            ConnectivityEvent::Offline
        };
        Some((Message::Connectivity(event), online))
    })
    .boxed()
}
