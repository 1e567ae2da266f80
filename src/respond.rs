use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

/// Sending half of a response that may be delivered only once.
///
/// Clones share one slot. Whichever clone responds first wins and every
/// later call is dropped, so a completion and a timeout may race freely.
pub struct Responder<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Create a responder and the receiver it delivers to.
pub fn channel<T>() -> (Responder<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    let responder = Responder {
        slot: Arc::new(Mutex::new(Some(tx))),
    };
    (responder, rx)
}

impl<T> Responder<T> {
    /// Deliver `value` if nothing was delivered yet. Returns whether this call
    /// took the slot.
    pub fn respond(&self, value: T) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            // A dropped receiver still consumes the slot.
            Some(tx) => {
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    pub fn is_spent(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_first_response_is_delivered() {
        let (responder, rx) = channel();
        let other = responder.clone();

        assert!(responder.respond("done"));
        assert!(!other.respond("timed out"));
        assert!(other.is_spent());
        assert_eq!(rx.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn racing_tasks_deliver_once() {
        let (responder, rx) = channel();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let r = responder.clone();
                tokio::spawn(async move { r.respond(i) })
            })
            .collect();

        let mut winners = 0;
        for h in handles {
            if h.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert!(rx.await.unwrap() < 8);
    }

    #[test]
    fn dropped_receiver_still_spends_the_slot() {
        let (responder, rx) = channel::<u8>();
        drop(rx);
        assert!(responder.respond(1));
        assert!(!responder.respond(2));
    }
}
