use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::BookingError;
use crate::services::checkout::Checkout;

/// Незавершённые оформления в памяти процесса. Ничего не переживает
/// перезапуск: выбор мест - временное состояние.
#[derive(Clone, Default)]
pub struct CheckoutStore {
    inner: Arc<RwLock<HashMap<Uuid, Checkout>>>,
}

impl CheckoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, checkout: Checkout) {
        self.inner.write().await.insert(checkout.id, checkout);
    }

    /// Изменяет оформление под блокировкой. Чужое оформление выглядит
    /// так же, как несуществующее.
    pub async fn update<R, F>(&self, id: Uuid, user_id: &str, f: F) -> Result<R, BookingError>
    where
        F: FnOnce(&mut Checkout) -> Result<R, BookingError>,
    {
        let mut guard = self.inner.write().await;
        let checkout = guard
            .get_mut(&id)
            .filter(|checkout| checkout.user_id == user_id)
            .ok_or_else(|| not_found(id))?;
        f(checkout)
    }

    pub async fn read<R, F>(&self, id: Uuid, user_id: &str, f: F) -> Result<R, BookingError>
    where
        F: FnOnce(&Checkout) -> Result<R, BookingError>,
    {
        let guard = self.inner.read().await;
        let checkout = guard
            .get(&id)
            .filter(|checkout| checkout.user_id == user_id)
            .ok_or_else(|| not_found(id))?;
        f(checkout)
    }

    pub async fn remove(&self, id: Uuid, user_id: &str) -> Result<Checkout, BookingError> {
        let mut guard = self.inner.write().await;
        match guard.get(&id) {
            Some(checkout) if checkout.user_id == user_id => {}
            _ => return Err(not_found(id)),
        }
        guard.remove(&id).ok_or_else(|| not_found(id))
    }

    /// Удаляет оформления, простаивающие дольше `ttl`. Оформления с
    /// запросом в полёте живут до `busy_ttl`, их результат ещё может прийти.
    pub async fn sweep_idle(&self, ttl: Duration, busy_ttl: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, checkout| {
            let limit = if checkout.is_busy() { busy_ttl.max(ttl) } else { ttl };
            checkout.idle_for() < limit
        });
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

fn not_found(id: Uuid) -> BookingError {
    BookingError::NotFound(format!("Checkout {id} not found"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AvailabilityCheck,
    Booking,
}

type InFlightKey = (String, Operation);

/// Не больше одного запроса каждого вида на пользователя одновременно.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<Mutex<HashSet<InFlightKey>>>,
}

impl InFlightRegistry {
    pub fn try_acquire(&self, user_id: &str, operation: Operation) -> Result<InFlightGuard, BookingError> {
        let key = (user_id.to_string(), operation);
        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(key.clone()) {
            let message = match operation {
                Operation::AvailabilityCheck => "Seat availability is already being checked",
                Operation::Booking => "A booking is already in progress",
            };
            return Err(BookingError::Busy(message.to_string()));
        }
        Ok(InFlightGuard { registry: self.inner.clone(), key })
    }

    pub fn is_in_flight(&self, user_id: &str, operation: Operation) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(user_id.to_string(), operation))
    }
}

/// Снимает отметку "в полёте" при выходе из области видимости.
#[must_use]
pub struct InFlightGuard {
    registry: Arc<Mutex<HashSet<InFlightKey>>>,
    key: InFlightKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_busy_until_guard_dropped() {
        let registry = InFlightRegistry::default();
        let guard = registry.try_acquire("u1", Operation::Booking).unwrap();

        assert!(matches!(
            registry.try_acquire("u1", Operation::Booking),
            Err(BookingError::Busy(_))
        ));
        // другой вид операции и другой пользователь не блокируются
        let _check = registry.try_acquire("u1", Operation::AvailabilityCheck).unwrap();
        let _other = registry.try_acquire("u2", Operation::Booking).unwrap();

        drop(guard);
        assert!(!registry.is_in_flight("u1", Operation::Booking));
        assert!(registry.try_acquire("u1", Operation::Booking).is_ok());
    }
}
