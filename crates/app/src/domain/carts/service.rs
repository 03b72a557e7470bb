//! Carts service.
//!
//! Orchestrates the cart store of record, the snapshot cache and the catalog.
//! Reads are cache-aside; every mutation goes to the store first and then
//! refreshes the cache in the background, so a cached read may briefly lag a
//! successful write. Availability checks are point-in-time: no stock is held
//! between the catalog check and the store write.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    cache::{CacheError, CartCache, DEFAULT_CART_CACHE_TTL, cart_cache_key},
    catalog::{CatalogClient, CatalogError},
    domain::carts::{
        background::BackgroundTasks,
        errors::{CartStoreError, CartsServiceError},
        models::{Cart, CartItem, CartStatus, ProductUuid, UserUuid},
        snapshots::{GateLease, SnapshotGates},
        store::CartStore,
    },
};

/// Default deadline for a single store, cache or catalog call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Tunables for [`CachedCartsService`].
#[derive(Debug, Clone, Copy)]
pub struct CartsSettings {
    /// Lifetime of cached snapshots.
    pub cache_ttl: Duration,

    /// Deadline applied to each call made while serving a request.
    pub call_timeout: Duration,
}

impl Default for CartsSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CART_CACHE_TTL,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
#[error("{0} did not complete within the call deadline")]
struct DeadlineExceeded(&'static str);

#[derive(Debug, Error)]
enum RefreshError {
    #[error("store read failed: {0}")]
    Store(#[from] CartStoreError),

    #[error("cache write failed: {0}")]
    Cache(#[from] CacheError),

    #[error("could not encode cart snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct CachedCartsService {
    store: Arc<dyn CartStore>,
    cache: Arc<dyn CartCache>,
    catalog: Arc<dyn CatalogClient>,
    background: BackgroundTasks,
    gates: SnapshotGates,
    settings: CartsSettings,
}

impl CachedCartsService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CartStore>,
        cache: Arc<dyn CartCache>,
        catalog: Arc<dyn CatalogClient>,
        background: BackgroundTasks,
        settings: CartsSettings,
    ) -> Self {
        Self {
            store,
            cache,
            catalog,
            background,
            gates: SnapshotGates::default(),
            settings,
        }
    }

    /// Run `call` under the per-call deadline. An elapsed deadline is an
    /// internal error; the call's own result is handed back untouched.
    async fn bounded<T, E, F>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<Result<T, E>, CartsServiceError>
    where
        F: Future<Output = Result<T, E>>,
    {
        timeout(self.settings.call_timeout, call)
            .await
            .map_err(|_elapsed| {
                warn!(operation, "call deadline exceeded");

                CartsServiceError::internal(DeadlineExceeded(operation))
            })
    }

    /// Read a snapshot from the cache. Every failure is a miss.
    async fn cached_snapshot(&self, user: UserUuid, consume: bool) -> Option<Cart> {
        let key = cart_cache_key(user);

        let read = if consume {
            timeout(self.settings.call_timeout, self.cache.read_then_delete(&key)).await
        } else {
            timeout(self.settings.call_timeout, self.cache.read(&key)).await
        };

        let bytes = match read {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => return None,
            Ok(Err(error)) => {
                warn!(%user, "cart cache read failed, falling back to store: {error}");

                return None;
            }
            Err(_elapsed) => {
                warn!(%user, "cart cache read timed out, falling back to store");

                return None;
            }
        };

        match serde_json::from_slice::<Cart>(&bytes) {
            Ok(cart) => Some(cart),
            Err(error) => {
                warn!(%user, "discarding undecodable cart snapshot: {error}");

                None
            }
        }
    }

    async fn get_or_create(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        match self
            .bounded("store.get_by_user", self.store.get_by_user(user))
            .await?
        {
            Ok(cart) => Ok(cart),
            Err(CartStoreError::CartNotFound) => {
                debug!(%user, "creating cart");

                Ok(self
                    .bounded("store.create", self.store.create(user))
                    .await??)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn live_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        Ok(self
            .bounded("store.get_by_user", self.store.get_by_user(user))
            .await??)
    }

    async fn verify_items(&self, cart: &Cart) -> Result<(), CartsServiceError> {
        if cart.items.is_empty() {
            return Err(CartsServiceError::NotFound);
        }

        if cart
            .items
            .iter()
            .any(|item| item.product_id.is_nil() || item.qty <= 0)
        {
            return Err(CartsServiceError::InvalidItem);
        }

        for item in &cart.items {
            let available = match self
                .bounded(
                    "catalog.verify_for_checkout",
                    self.catalog.verify_for_checkout(item.product_id, item.qty),
                )
                .await?
            {
                Ok(available) => available,
                Err(CatalogError::ProductNotFound) => false,
                Err(error) => return Err(CartsServiceError::internal(error)),
            };

            if !available {
                return Err(CartsServiceError::OutOfStock(item.product_id));
            }
        }

        Ok(())
    }

    /// Cache the given snapshot in the background, unless a mutation for the
    /// same user has advanced the gate past `seen` by the time it runs.
    fn schedule_cache_write(&self, cart: &Cart, lease: GateLease, seen: u64) {
        let key = cart_cache_key(cart.user_id);
        let ttl = self.settings.cache_ttl;

        let bytes = match serde_json::to_vec(cart) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(user = %cart.user_id, "could not encode cart snapshot: {error}");

                return;
            }
        };

        let cache = Arc::clone(&self.cache);

        self.background.spawn("cache.write", async move {
            let _serialized = lease.serialize().await;

            if lease.epoch() != seen {
                debug!("dropping snapshot superseded by a later mutation");

                return Ok(());
            }

            cache.write(&key, bytes, ttl).await
        });
    }

    /// Re-read the user's cart from the store and cache it in the background.
    ///
    /// Refreshes for one user run one after another and each reads the store
    /// only once it holds the gate, so the last one to run caches the newest
    /// state.
    fn schedule_refresh(&self, user: UserUuid) {
        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let ttl = self.settings.cache_ttl;
        let lease = self.gates.lease(user);

        lease.advance();

        self.background.spawn("cache.refresh", async move {
            let _serialized = lease.serialize().await;
            let key = cart_cache_key(user);

            match store.get_by_user(user).await {
                Ok(cart) => {
                    let bytes = serde_json::to_vec(&cart)?;

                    cache.write(&key, bytes, ttl).await?;
                }
                Err(CartStoreError::CartNotFound) => cache.delete(&key).await?,
                Err(error) => return Err(RefreshError::from(error)),
            }

            Ok::<(), RefreshError>(())
        });
    }

    fn schedule_cache_delete(&self, user: UserUuid) {
        let cache = Arc::clone(&self.cache);
        let lease = self.gates.lease(user);

        lease.advance();

        self.background.spawn("cache.delete", async move {
            let _serialized = lease.serialize().await;

            cache.delete(&cart_cache_key(user)).await
        });
    }
}

fn validate_qty(qty: i32) -> Result<(), CartsServiceError> {
    if qty <= 0 {
        return Err(CartsServiceError::BadRequest(
            "quantity must be greater than zero",
        ));
    }

    Ok(())
}

fn validate_product(product: ProductUuid) -> Result<(), CartsServiceError> {
    if product.is_nil() {
        return Err(CartsServiceError::BadRequest("product id is required"));
    }

    Ok(())
}

fn catalog_lookup_error(error: CatalogError) -> CartsServiceError {
    match error {
        CatalogError::ProductNotFound => CartsServiceError::NotFound,
        other => CartsServiceError::internal(other),
    }
}

#[async_trait]
impl CartsService for CachedCartsService {
    #[tracing::instrument(name = "carts.get", skip_all, fields(user_id = %user))]
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        if let Some(cart) = self.cached_snapshot(user, false).await {
            return Ok(cart);
        }

        let lease = self.gates.lease(user);
        let seen = lease.epoch();

        let cart = self.live_cart(user).await?;

        self.schedule_cache_write(&cart, lease, seen);

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.add_item",
        skip_all,
        fields(user_id = %user, product_id = %product, qty)
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        qty: i32,
    ) -> Result<CartItem, CartsServiceError> {
        validate_qty(qty)?;
        validate_product(product)?;

        let quote = self
            .bounded(
                "catalog.price_and_availability",
                self.catalog.price_and_availability(product),
            )
            .await?
            .map_err(catalog_lookup_error)?;

        if quote.available_qty < i64::from(qty) {
            return Err(CartsServiceError::BadRequest("insufficient stock"));
        }

        let cart = self.get_or_create(user).await?;

        let item = self
            .bounded(
                "store.upsert_item",
                self.store.upsert_item(cart.id, product, quote.price, qty),
            )
            .await??;

        self.schedule_refresh(user);

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.change_qty",
        skip_all,
        fields(user_id = %user, product_id = %product, qty)
    )]
    async fn change_qty(
        &self,
        user: UserUuid,
        product: ProductUuid,
        qty: i32,
    ) -> Result<CartItem, CartsServiceError> {
        validate_qty(qty)?;
        validate_product(product)?;

        let available = self
            .bounded("catalog.availability", self.catalog.availability(product))
            .await?
            .map_err(catalog_lookup_error)?;

        if available < i64::from(qty) {
            return Err(CartsServiceError::BadRequest("insufficient stock"));
        }

        let cart = self.live_cart(user).await?;

        let item = self
            .bounded(
                "store.change_quantity",
                self.store.change_quantity(cart.id, product, qty),
            )
            .await??;

        self.schedule_refresh(user);

        Ok(item)
    }

    #[tracing::instrument(
        name = "carts.remove_item",
        skip_all,
        fields(user_id = %user, product_id = %product)
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        let cart = self.live_cart(user).await?;

        self.bounded(
            "store.delete_item",
            self.store.delete_item(cart.id, product),
        )
        .await??;

        self.schedule_refresh(user);

        Ok(())
    }

    #[tracing::instrument(name = "carts.clear", skip_all, fields(user_id = %user))]
    async fn clear(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let cart = self.live_cart(user).await?;

        self.bounded("store.delete_cart", self.store.delete_cart(cart.id))
            .await??;

        self.schedule_cache_delete(user);

        Ok(())
    }

    #[tracing::instrument(name = "carts.checkout", skip_all, fields(user_id = %user))]
    async fn checkout(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        // Consuming the snapshot keeps a concurrent checkout from verifying
        // the same cached cart.
        let cart = match self.cached_snapshot(user, true).await {
            Some(cart) => cart,
            None => self.live_cart(user).await?,
        };

        self.verify_items(&cart).await?;

        match self
            .bounded("store.delete_cart", self.store.delete_cart(cart.id))
            .await?
        {
            Ok(()) => {}
            Err(CartStoreError::CartNotFound) => {
                debug!(cart_id = %cart.id, "cart already cleared by a concurrent request");
            }
            Err(error) => return Err(error.into()),
        }

        // A refresh racing this checkout may have re-cached the cart.
        self.schedule_cache_delete(user);

        Ok(Cart {
            status: CartStatus::Checkout,
            ..cart
        })
    }
}

/// Cart operations keyed by the owning user.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, preferring the cached snapshot.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add `qty` units of `product` at the current catalog price, creating the
    /// cart if needed. An existing line is overwritten, not accumulated.
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        qty: i32,
    ) -> Result<CartItem, CartsServiceError>;

    /// Set the quantity of a line already in the cart.
    async fn change_qty(
        &self,
        user: UserUuid,
        product: ProductUuid,
        qty: i32,
    ) -> Result<CartItem, CartsServiceError>;

    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError>;

    /// Delete the cart and all of its items.
    async fn clear(&self, user: UserUuid) -> Result<(), CartsServiceError>;

    /// Re-verify every item with the catalog and, if all are available,
    /// delete the cart. Returns the checked-out snapshot.
    async fn checkout(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;
}
