//! Notifications about session changes.
//!
//! Handlers publish a [SessionChange] whenever a user signs up, signs in,
//! signs out or has their session refreshed. Listeners call
//! [SessionEvents::subscribe] and receive every change published after
//! that point. Dropping the returned [SessionSubscription] unregisters the
//! listener.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::auth::UserID;

/// How many unread changes a slow listener may fall behind before it starts
/// missing events.
const CHANNEL_CAPACITY: usize = 64;

/// What happened to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChangeKind {
    /// A new account was created and its owner signed in.
    SignedUp,
    /// A user signed in with their email and password.
    SignedIn,
    /// The session cookie was invalidated.
    SignedOut,
    /// A request with a valid session extended the session.
    Refreshed,
}

/// A change to a session together with the user it now belongs to.
///
/// `user_id` is `None` when nobody is signed in after the change, e.g. after
/// signing out without a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionChange {
    /// What happened.
    pub kind: SessionChangeKind,
    /// The current user after the change.
    pub user_id: Option<UserID>,
}

impl SessionChange {
    /// A change with a signed in user.
    pub fn new(kind: SessionChangeKind, user_id: UserID) -> Self {
        Self {
            kind,
            user_id: Some(user_id),
        }
    }
}

/// The hub that session changes are published through.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionChange>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self { sender }
    }
}

impl SessionEvents {
    /// Register a new listener.
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Send `change` to every registered listener.
    pub fn publish(&self, change: SessionChange) {
        if self.sender.send(change).is_err() {
            tracing::trace!("no session listeners for {change:?}");
        }
    }

    /// The number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A registered session listener.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionChange>,
}

impl SessionSubscription {
    /// Wait for the next change.
    ///
    /// Returns `None` once every [SessionEvents] handle has been dropped.
    /// Changes missed by a listener that fell behind are skipped with a
    /// warning.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("session listener fell behind and missed {skipped} changes");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Get the next change if one is already waiting.
    pub fn try_recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("session listener fell behind and missed {skipped} changes");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::UserID;

    use super::{SessionChange, SessionChangeKind, SessionEvents};

    #[tokio::test]
    async fn subscribers_receive_published_changes() {
        let events = SessionEvents::default();
        let mut subscription = events.subscribe();
        let change = SessionChange::new(SessionChangeKind::SignedIn, UserID::new(1));

        events.publish(change);

        assert_eq!(subscription.recv().await, Some(change));
    }

    #[test]
    fn every_subscriber_gets_a_copy() {
        let events = SessionEvents::default();
        let mut first = events.subscribe();
        let mut second = events.subscribe();
        let change = SessionChange {
            kind: SessionChangeKind::SignedOut,
            user_id: None,
        };

        events.publish(change);

        assert_eq!(first.try_recv(), Some(change));
        assert_eq!(second.try_recv(), Some(change));
    }

    #[test]
    fn dropping_subscription_unregisters_listener() {
        let events = SessionEvents::default();
        let subscription = events.subscribe();
        assert_eq!(events.listener_count(), 1);

        drop(subscription);

        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn late_subscribers_do_not_see_old_changes() {
        let events = SessionEvents::default();
        events.publish(SessionChange::new(
            SessionChangeKind::Refreshed,
            UserID::new(1),
        ));

        let mut subscription = events.subscribe();

        assert_eq!(subscription.try_recv(), None);
    }

    #[test]
    fn publishing_without_listeners_is_fine() {
        let events = SessionEvents::default();

        events.publish(SessionChange::new(SessionChangeKind::SignedUp, UserID::new(1)));
    }
}
