//! Cart store of record.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;

use crate::{
    database::Db,
    domain::carts::{
        errors::CartStoreError,
        models::{Cart, CartItem, CartUuid, ProductUuid, UserUuid},
        repositories::{PgCartItemsRepository, PgCartsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartStore {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
}

impl PgCartStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get(&self, cart: CartUuid) -> Result<Cart, CartStoreError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.get_cart(&mut tx, cart).await?;

        let items = self.items_repository.get_cart_items(&mut tx, cart.id).await?;

        tx.commit().await?;

        cart.items = items;

        Ok(cart)
    }

    async fn get_by_user(&self, user: UserUuid) -> Result<Cart, CartStoreError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.get_user_cart(&mut tx, user).await?;

        let items = self.items_repository.get_cart_items(&mut tx, cart.id).await?;

        tx.commit().await?;

        cart.items = items;

        Ok(cart)
    }

    async fn create(&self, user: UserUuid) -> Result<Cart, CartStoreError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .carts_repository
            .create_cart(&mut tx, CartUuid::new(), user)
            .await?;

        let cart = match created {
            Some(cart) => cart,
            // Lost the race against a concurrent creator; hand back its cart.
            None => match self.carts_repository.get_user_cart(&mut tx, user).await {
                Ok(cart) => cart,
                Err(sqlx::Error::RowNotFound) => {
                    return Err(CartStoreError::Storage(sqlx::Error::RowNotFound));
                }
                Err(error) => return Err(error.into()),
            },
        };

        let items = self.items_repository.get_cart_items(&mut tx, cart.id).await?;

        tx.commit().await?;

        Ok(Cart { items, ..cart })
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

        let mut tx = self.db.begin().await?;

        // Item writes lock the cart row before any item row.
        if self.carts_repository.touch_cart(&mut tx, cart).await? == 0 {
            return Err(CartStoreError::CartNotFound);
        }

        let item = self
            .items_repository
            .upsert_cart_item(&mut tx, cart, product, price, qty)
            .await?;

        tx.commit().await?;

        Ok(item)
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

        let mut tx = self.db.begin().await?;

        if self.carts_repository.touch_cart(&mut tx, cart).await? == 0 {
            return Err(CartStoreError::ItemNotFound);
        }

        let item = self
            .items_repository
            .change_quantity(&mut tx, cart, product, qty)
            .await?
            .ok_or(CartStoreError::ItemNotFound)?;

        tx.commit().await?;

        Ok(item)
    }

    async fn delete_item(&self, cart: CartUuid, product: ProductUuid) -> Result<(), CartStoreError> {
        let mut tx = self.db.begin().await?;

        if self.carts_repository.touch_cart(&mut tx, cart).await? == 0 {
            return Err(CartStoreError::ItemNotFound);
        }

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, product)
            .await?;

        if rows_affected == 0 {
            return Err(CartStoreError::ItemNotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_cart(&self, cart: CartUuid) -> Result<(), CartStoreError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.carts_repository.delete_cart(&mut tx, cart).await?;

        if rows_affected == 0 {
            return Err(CartStoreError::CartNotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

/// Relational persistence of carts and their line items.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load a cart header and all of its items.
    async fn get(&self, cart: CartUuid) -> Result<Cart, CartStoreError>;

    /// Load the user's live (open or pending) cart with its items.
    async fn get_by_user(&self, user: UserUuid) -> Result<Cart, CartStoreError>;

    /// Create an empty open cart for the user, or return the live cart a
    /// concurrent caller created first.
    async fn create(&self, user: UserUuid) -> Result<Cart, CartStoreError>;

    /// Insert a line, or overwrite price and quantity of an existing one.
    async fn upsert_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        price: Decimal,
        qty: i32,
    ) -> Result<CartItem, CartStoreError>;

    /// Update the quantity of an existing line.
    async fn change_quantity(
        &self,
        cart: CartUuid,
        product: ProductUuid,
        qty: i32,
    ) -> Result<CartItem, CartStoreError>;

    async fn delete_item(&self, cart: CartUuid, product: ProductUuid) -> Result<(), CartStoreError>;

    /// Delete a cart and, by cascade, its items.
    async fn delete_cart(&self, cart: CartUuid) -> Result<(), CartStoreError>;
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use crate::{domain::carts::models::CartStatus, test::TestContext};

    use super::*;

    fn price(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap_or_default()
    }

    #[tokio::test]
    async fn create_returns_empty_open_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let cart = ctx.store.create(user).await?;

        assert_eq!(cart.user_id, user);
        assert_eq!(cart.status, CartStatus::Open);
        assert!(cart.items.is_empty(), "new cart should have no items");

        Ok(())
    }

    #[tokio::test]
    async fn create_twice_returns_the_same_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let first = ctx.store.create(user).await?;
        let second = ctx.store.create(user).await?;

        assert_eq!(first.id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_converge_on_one_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let (first, second) = tokio::join!(ctx.store.create(user), ctx.store.create(user));

        assert_eq!(first?.id, second?.id);

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_cart_returns_cart_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.store.get(CartUuid::new()).await;

        assert!(
            matches!(result, Err(CartStoreError::CartNotFound)),
            "expected CartNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_by_user_without_cart_returns_cart_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.store.get_by_user(UserUuid::new()).await;

        assert!(
            matches!(result, Err(CartStoreError::CartNotFound)),
            "expected CartNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn upsert_overwrites_price_and_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;
        let product = ProductUuid::new();

        ctx.store
            .upsert_item(cart.id, product, price("9.99"), 2)
            .await?;
        ctx.store
            .upsert_item(cart.id, product, price("7.50"), 5)
            .await?;

        let loaded = ctx.store.get(cart.id).await?;

        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items.first().map(|i| i.price), Some(price("7.50")));
        assert_eq!(loaded.items.first().map(|i| i.qty), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn upsert_bumps_cart_updated_at() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;

        ctx.store
            .upsert_item(cart.id, ProductUuid::new(), price("1.00"), 1)
            .await?;

        let loaded = ctx.store.get(cart.id).await?;

        assert!(loaded.updated_at >= cart.updated_at, "updated_at went backwards");

        Ok(())
    }

    #[tokio::test]
    async fn upsert_rejects_non_positive_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;

        for qty in [0, -3] {
            let result = ctx
                .store
                .upsert_item(cart.id, ProductUuid::new(), price("1.00"), qty)
                .await;

            assert!(
                matches!(result, Err(CartStoreError::QtyConstraint)),
                "expected QtyConstraint, got {result:?}"
            );
        }

        assert!(ctx.store.get(cart.id).await?.items.is_empty(), "no row stored");

        Ok(())
    }

    #[tokio::test]
    async fn upsert_into_missing_cart_returns_cart_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .store
            .upsert_item(CartUuid::new(), ProductUuid::new(), price("1.00"), 1)
            .await;

        assert!(
            matches!(result, Err(CartStoreError::CartNotFound)),
            "expected CartNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn change_quantity_updates_only_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;
        let product = ProductUuid::new();

        ctx.store
            .upsert_item(cart.id, product, price("9.99"), 2)
            .await?;

        let item = ctx.store.change_quantity(cart.id, product, 3).await?;

        assert_eq!(item.qty, 3);
        assert_eq!(item.price, price("9.99"));

        Ok(())
    }

    #[tokio::test]
    async fn change_quantity_of_absent_item_returns_item_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;

        let result = ctx
            .store
            .change_quantity(cart.id, ProductUuid::new(), 1)
            .await;

        assert!(
            matches!(result, Err(CartStoreError::ItemNotFound)),
            "expected ItemNotFound, got {result:?}"
        );
        assert!(ctx.store.get(cart.id).await?.items.is_empty(), "no row created");

        Ok(())
    }

    #[tokio::test]
    async fn change_quantity_rejects_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;
        let product = ProductUuid::new();

        ctx.store
            .upsert_item(cart.id, product, price("9.99"), 2)
            .await?;

        let result = ctx.store.change_quantity(cart.id, product, 0).await;

        assert!(
            matches!(result, Err(CartStoreError::QtyConstraint)),
            "expected QtyConstraint, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn quantity_check_constraint_maps_to_qty_constraint() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;

        let result: Result<_, CartStoreError> = sqlx::query(
            "INSERT INTO cart_item (cart_id, product_id, price, quantity) VALUES ($1, $2, 1, 0)",
        )
        .bind(cart.id.into_uuid())
        .bind(ProductUuid::new().into_uuid())
        .execute(ctx.db.pool())
        .await
        .map_err(CartStoreError::from);

        assert!(
            matches!(result, Err(CartStoreError::QtyConstraint)),
            "expected QtyConstraint, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn negative_price_is_a_storage_error_not_a_quantity_error() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;

        let result = ctx
            .store
            .upsert_item(cart.id, ProductUuid::new(), price("-0.01"), 1)
            .await;

        assert!(
            matches!(result, Err(CartStoreError::Storage(_))),
            "expected Storage, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn prices_keep_every_quoted_decimal_place() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;

        let item = ctx
            .store
            .upsert_item(cart.id, ProductUuid::new(), price("9.9999"), 1)
            .await?;

        assert_eq!(item.price, price("9.9999"));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_upsert_and_change_quantity_on_one_line_both_succeed() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;
        let product = ProductUuid::new();

        ctx.store
            .upsert_item(cart.id, product, price("1.00"), 1)
            .await?;

        for round in 2..12 {
            let (upserted, changed) = tokio::join!(
                ctx.store.upsert_item(cart.id, product, price("2.00"), round),
                ctx.store.change_quantity(cart.id, product, round + 100),
            );

            upserted?;
            changed?;
        }

        let (upserted, deleted) = tokio::join!(
            ctx.store
                .upsert_item(cart.id, ProductUuid::new(), price("3.00"), 1),
            ctx.store.delete_item(cart.id, product),
        );

        upserted?;
        deleted?;

        Ok(())
    }

    #[tokio::test]
    async fn change_quantity_and_delete_item_on_missing_cart_return_item_not_found() {
        let ctx = TestContext::new().await;

        let changed = ctx
            .store
            .change_quantity(CartUuid::new(), ProductUuid::new(), 1)
            .await;
        let deleted = ctx
            .store
            .delete_item(CartUuid::new(), ProductUuid::new())
            .await;

        assert!(
            matches!(changed, Err(CartStoreError::ItemNotFound)),
            "expected ItemNotFound, got {changed:?}"
        );
        assert!(
            matches!(deleted, Err(CartStoreError::ItemNotFound)),
            "expected ItemNotFound, got {deleted:?}"
        );
    }

    #[tokio::test]
    async fn delete_item_removes_only_that_line() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.store.create(UserUuid::new()).await?;
        let kept = ProductUuid::new();
        let removed = ProductUuid::new();

        ctx.store.upsert_item(cart.id, kept, price("1.00"), 1).await?;
        ctx.store
            .upsert_item(cart.id, removed, price("2.00"), 1)
            .await?;

        ctx.store.delete_item(cart.id, removed).await?;

        let loaded = ctx.store.get(cart.id).await?;

        assert_eq!(
            loaded.items.iter().map(|i| i.product_id).collect::<Vec<_>>(),
            vec![kept]
        );

        let again = ctx.store.delete_item(cart.id, removed).await;

        assert!(
            matches!(again, Err(CartStoreError::ItemNotFound)),
            "expected ItemNotFound, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_cart_cascades_and_is_not_repeatable() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let cart = ctx.store.create(user).await?;

        ctx.store
            .upsert_item(cart.id, ProductUuid::new(), price("1.00"), 1)
            .await?;

        ctx.store.delete_cart(cart.id).await?;

        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_item WHERE cart_id = $1")
            .bind(cart.id.into_uuid())
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(items, 0);

        let again = ctx.store.delete_cart(cart.id).await;

        assert!(
            matches!(again, Err(CartStoreError::CartNotFound)),
            "expected CartNotFound, got {again:?}"
        );

        let lookup = ctx.store.get_by_user(user).await;

        assert!(
            matches!(lookup, Err(CartStoreError::CartNotFound)),
            "expected CartNotFound, got {lookup:?}"
        );

        Ok(())
    }
}
