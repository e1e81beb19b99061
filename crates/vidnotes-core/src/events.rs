//! Typed change bus shared by the stores.
//!
//! Every mutating store operation that changes state publishes exactly one
//! [`StoreEvent`] after the in-memory update (and snapshot write, when
//! persisting immediately) has completed. Subscribers are notified
//! synchronously, in subscription order, before the mutating call returns.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// A change to one user's partition of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    BookmarksChanged { user_id: String },
    FavoritesChanged { user_id: String },
    NotesChanged { user_id: String },
    /// All relation data and notes of the user were removed as one unit
    UserDataCleared { user_id: String },
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BookmarksChanged { .. } => "bookmarks-changed",
            Self::FavoritesChanged { .. } => "favorites-changed",
            Self::NotesChanged { .. } => "notes-changed",
            Self::UserDataCleared { .. } => "user-data-cleared",
        }
    }

    /// Partition key of the user whose data changed.
    pub fn user_id(&self) -> &str {
        match self {
            Self::BookmarksChanged { user_id }
            | Self::FavoritesChanged { user_id }
            | Self::NotesChanged { user_id }
            | Self::UserDataCleared { user_id } => user_id,
        }
    }

    /// Whether this event invalidates a view of the given user's data.
    pub fn affects(&self, user_id: &str) -> bool {
        self.user_id() == user_id
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.user_id())
    }
}

/// Receives store change notifications.
///
/// Listeners run on the thread that performed the mutation and must not
/// block. Closures of the form `Fn(&StoreEvent)` implement this trait.
pub trait StoreListener: Send + Sync {
    fn on_store_changed(&self, event: &StoreEvent);
}

impl<F> StoreListener for F
where
    F: Fn(&StoreEvent) + Send + Sync,
{
    fn on_store_changed(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
enum Subscriber {
    Listener(Arc<dyn StoreListener>),
    Channel(Sender<StoreEvent>),
}

/// Observer list notified on every store mutation.
pub struct EventBus {
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn subscribe<L>(&self, listener: L) -> SubscriptionId
    where
        L: StoreListener + 'static,
    {
        self.subscribe_arc(Arc::new(listener))
    }

    pub fn subscribe_arc(&self, listener: Arc<dyn StoreListener>) -> SubscriptionId {
        let id = self.next_id();
        self.subscribers
            .lock()
            .push((id, Subscriber::Listener(listener)));
        id
    }

    /// Subscribe through a channel. The subscription is dropped automatically
    /// the first time a publish finds the receiver gone.
    pub fn subscribe_channel(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id();
        self.subscribers.lock().push((id, Subscriber::Channel(tx)));
        rx
    }

    /// Returns `false` if the id was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn publish(&self, event: &StoreEvent) {
        // Snapshot so listeners may (un)subscribe without deadlocking.
        let snapshot: Vec<(SubscriptionId, Subscriber)> = self.subscribers.lock().clone();
        tracing::debug!(event = event.name(), user_id = event.user_id(), subscribers = snapshot.len(), "publishing store event");

        let mut disconnected = Vec::new();
        for (id, subscriber) in snapshot {
            match subscriber {
                Subscriber::Listener(listener) => listener.on_store_changed(event),
                Subscriber::Channel(tx) => {
                    if tx.send(event.clone()).is_err() {
                        disconnected.push(id);
                    }
                }
            }
        }

        if !disconnected.is_empty() {
            self.subscribers
                .lock()
                .retain(|(id, _)| !disconnected.contains(id));
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.listener_count())
            .finish()
    }
}
