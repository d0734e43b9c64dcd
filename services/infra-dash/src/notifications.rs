// services/infra-dash/src/notifications.rs
//
// Notification center shared by every screen (header badge + dropdown panel)

use std::sync::Arc;
use svckit::types::Notification;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone)]
pub struct NotificationCenter {
    state: Arc<watch::Sender<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn new(initial: Vec<Notification>) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.state.subscribe()
    }

    pub fn unread_count(&self) -> usize {
        self.state.borrow().iter().filter(|n| !n.read).count()
    }

    /// Returns true when the notification existed and was unread.
    pub fn mark_as_read(&self, id: u32) -> bool {
        self.state.send_if_modified(|list| {
            match list.iter_mut().find(|n| n.id == id && !n.read) {
                Some(n) => {
                    n.read = true;
                    debug!("Notification {} marked as read", id);
                    true
                }
                None => false,
            }
        })
    }

    pub fn mark_all_read(&self) {
        self.state.send_if_modified(|list| {
            let mut changed = false;
            for n in list.iter_mut().filter(|n| !n.read) {
                n.read = true;
                changed = true;
            }
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    #[test]
    fn test_seeded_center_has_two_unread() {
        let center = NotificationCenter::new(mock::notifications());
        assert_eq!(center.snapshot().len(), 4);
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn test_mark_as_read_only_touches_target() {
        let center = NotificationCenter::new(mock::notifications());
        let mut rx = center.subscribe();
        let unread_id = center.snapshot().iter().find(|n| !n.read).unwrap().id;

        assert!(center.mark_as_read(unread_id));
        assert!(rx.has_changed().unwrap());
        assert_eq!(center.unread_count(), 1);

        rx.borrow_and_update();
        assert!(!center.mark_as_read(unread_id));
        assert!(!center.mark_as_read(999));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_mark_all_read() {
        let center = NotificationCenter::new(mock::notifications());
        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);
    }
}
