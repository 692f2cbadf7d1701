//! Open checkouts, keyed by id, with an age-based purge.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use skillsnexus_shared::pricing::Checkout;

struct Entry {
    checkout: Checkout,
    opened_at: Instant,
}

#[derive(Clone, Default)]
pub struct CheckoutBook {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl CheckoutBook {
    pub async fn open(&self, checkout: Checkout) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.write().await.insert(
            id,
            Entry {
                checkout,
                opened_at: Instant::now(),
            },
        );
        id
    }

    /// Run `f` against the checkout, or `None` if `id` is unknown.
    pub async fn read<R>(&self, id: Uuid, f: impl FnOnce(&Checkout) -> R) -> Option<R> {
        self.entries.read().await.get(&id).map(|e| f(&e.checkout))
    }

    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Checkout) -> R) -> Option<R> {
        self.entries
            .write()
            .await
            .get_mut(&id)
            .map(|e| f(&mut e.checkout))
    }

    pub async fn close(&self, id: Uuid) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drop checkouts opened more than `max_age` ago. Returns how many went.
    pub async fn purge_older_than(&self, max_age: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.opened_at.elapsed() < max_age);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, open = entries.len(), "Purged expired checkouts");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillsnexus_shared::fixtures::pricing_tiers;
    use skillsnexus_shared::types::Currency;

    fn checkout() -> Checkout {
        Checkout::new(pricing_tiers().remove(0), Currency::Zar)
    }

    #[tokio::test]
    async fn test_open_update_close() {
        let book = CheckoutBook::default();
        let id = book.open(checkout()).await;
        assert_eq!(book.read(id, |c| c.final_price()).await, Some(1997));

        book.update(id, |c| c.begin_payment()).await.unwrap().unwrap();
        assert!(book.close(id).await);
        assert!(!book.close(id).await);
        assert!(book.read(id, |c| c.final_price()).await.is_none());
    }

    #[tokio::test]
    async fn test_purge_drops_old_entries() {
        let book = CheckoutBook::default();
        book.open(checkout()).await;
        book.open(checkout()).await;

        assert_eq!(book.purge_older_than(Duration::from_secs(3600)).await, 0);
        assert_eq!(book.purge_older_than(Duration::ZERO).await, 2);
        assert_eq!(book.len().await, 0);
    }
}
