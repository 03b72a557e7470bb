//! Test helpers.

use std::{str::FromStr, sync::Arc};

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};

use trolley_app::domain::carts::{
    BackgroundTasks, MockCartsService,
    models::{Cart, CartItem, CartStatus, CartUuid, ProductUuid, UserUuid},
};

use crate::state::State;

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(Arc::new(State::new(
                Arc::new(carts),
                BackgroundTasks::default(),
            ))))
            .push(route),
    )
}

pub(crate) fn make_item(cart: CartUuid, product: ProductUuid, qty: i32) -> CartItem {
    CartItem {
        cart_id: cart,
        product_id: product,
        price: Decimal::from_str("9.99").unwrap_or_default(),
        qty,
    }
}

pub(crate) fn make_cart(user: UserUuid, products: &[ProductUuid]) -> Cart {
    let id = CartUuid::new();

    Cart {
        id,
        user_id: user,
        status: CartStatus::Open,
        items: products
            .iter()
            .map(|product| make_item(id, *product, 1))
            .collect(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
