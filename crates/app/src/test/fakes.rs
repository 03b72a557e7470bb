//! In-memory stand-ins for the store and cache.
//!
//! The carts service tests exercise flows that touch the store and cache many
//! times; stateful fakes keep those tests readable where per-call mock
//! expectations would not.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    cache::{CacheError, CartCache},
    domain::carts::{
        errors::CartStoreError,
        models::{Cart, CartItem, CartStatus, CartUuid, ProductUuid, UserUuid},
        store::CartStore,
    },
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn is_live(cart: &Cart) -> bool {
    matches!(cart.status, CartStatus::Open | CartStatus::Pending)
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryCartStore {
    carts: Mutex<HashMap<CartUuid, Cart>>,
    get_by_user_calls: AtomicUsize,
    deleted_carts: AtomicUsize,
    user_read_lag: Mutex<Option<(usize, Duration)>>,
}

impl InMemoryCartStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold back the result of the `call`th `get_by_user` (1-based) for
    /// `delay`. The cart is read before the pause, so the caller receives the
    /// state as it was when the read started.
    pub(crate) fn lag_user_read(&self, call: usize, delay: Duration) {
        *lock(&self.user_read_lag) = Some((call, delay));
    }

    pub(crate) fn cart_count(&self) -> usize {
        lock(&self.carts).len()
    }

    pub(crate) fn get_by_user_calls(&self) -> usize {
        self.get_by_user_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_cart` calls that removed a cart.
    pub(crate) fn deleted_carts(&self) -> usize {
        self.deleted_carts.load(Ordering::SeqCst)
    }

    fn with_cart<T>(
        &self,
        cart: CartUuid,
        f: impl FnOnce(&mut Cart) -> Result<T, CartStoreError>,
    ) -> Result<T, CartStoreError> {
        let mut carts = lock(&self.carts);
        let cart = carts.get_mut(&cart).ok_or(CartStoreError::CartNotFound)?;

        let result = f(cart)?;

        cart.updated_at = Timestamp::now().max(cart.updated_at);

        Ok(result)
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self, cart: CartUuid) -> Result<Cart, CartStoreError> {
        lock(&self.carts)
            .get(&cart)
            .cloned()
            .ok_or(CartStoreError::CartNotFound)
    }

    async fn get_by_user(&self, user: UserUuid) -> Result<Cart, CartStoreError> {
        let call = self.get_by_user_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let found = lock(&self.carts)
            .values()
            .find(|cart| cart.user_id == user && is_live(cart))
            .cloned()
            .ok_or(CartStoreError::CartNotFound);

        let lag = *lock(&self.user_read_lag);

        if let Some((lagged, delay)) = lag
            && lagged == call
        {
            tokio::time::sleep(delay).await;
        }

        found
    }

    async fn create(&self, user: UserUuid) -> Result<Cart, CartStoreError> {
        let mut carts = lock(&self.carts);

        if let Some(existing) = carts
            .values()
            .find(|cart| cart.user_id == user && is_live(cart))
        {
            return Ok(existing.clone());
        }

        let now = Timestamp::now();
        let cart = Cart {
            id: CartUuid::new(),
            user_id: user,
            status: CartStatus::Open,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        carts.insert(cart.id, cart.clone());

        Ok(cart)
    }

    async fn upsert_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        price: Decimal,
        qty: i32,
    ) -> Result<CartItem, CartStoreError> {
        if qty <= 0 {
            return Err(CartStoreError::QtyConstraint);
        }

        self.with_cart(cart, |stored| {
            let item = CartItem {
                cart_id: stored.id,
                product_id: product,
                price,
                qty,
            };

            match stored
                .items
                .iter_mut()
                .find(|line| line.product_id == product)
            {
                Some(line) => *line = item.clone(),
                None => stored.items.push(item.clone()),
            }

            Ok(item)
        })
    }

    async fn change_quantity(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        qty: i32,
    ) -> Result<CartItem, CartStoreError> {
        if qty <= 0 {
            return Err(CartStoreError::QtyConstraint);
        }

        self.with_cart(cart, |stored| {
            let line = stored
                .items
                .iter_mut()
                .find(|line| line.product_id == product)
                .ok_or(CartStoreError::ItemNotFound)?;

            line.qty = qty;

            Ok(line.clone())
        })
        .map_err(|error| match error {
            CartStoreError::CartNotFound => CartStoreError::ItemNotFound,
            other => other,
        })
    }

    async fn delete_item(&self, cart: CartUuid, product: ProductUuid) -> Result<(), CartStoreError> {
        self.with_cart(cart, |stored| {
            let before = stored.items.len();

            stored.items.retain(|line| line.product_id != product);

            if stored.items.len() == before {
                return Err(CartStoreError::ItemNotFound);
            }

            Ok(())
        })
        .map_err(|error| match error {
            CartStoreError::CartNotFound => CartStoreError::ItemNotFound,
            other => other,
        })
    }

    async fn delete_cart(&self, cart: CartUuid) -> Result<(), CartStoreError> {
        lock(&self.carts)
            .remove(&cart)
            .ok_or(CartStoreError::CartNotFound)?;

        self.deleted_carts.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryCartCache {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
}

impl InMemoryCartCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, key: &str, value: Vec<u8>) {
        lock(&self.entries).insert(key.to_string(), (value, Duration::ZERO));
    }

    pub(crate) fn get(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.entries).get(key).map(|(value, _)| value.clone())
    }

    pub(crate) fn ttl(&self, key: &str) -> Option<Duration> {
        lock(&self.entries).get(key).map(|(_, ttl)| *ttl)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }
}

#[async_trait]
impl CartCache for InMemoryCartCache {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        lock(&self.entries).insert(key.to_string(), (value, ttl));

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        lock(&self.entries).remove(key);

        Ok(())
    }

    async fn read_then_delete(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(lock(&self.entries).remove(key).map(|(value, _)| value))
    }
}
