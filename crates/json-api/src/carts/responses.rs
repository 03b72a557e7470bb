//! Cart response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trolley_app::domain::carts::models::{Cart, CartItem};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub id: Uuid,

    /// The user owning the cart
    pub user_id: Uuid,

    /// Lifecycle status: `OPEN`, `PENDING`, `CHECKOUT` or `ABANDONED`
    pub status: String,

    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id.into_uuid(),
            user_id: cart.user_id.into_uuid(),
            status: cart.status.to_string(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The cart holding the item
    pub cart_id: Uuid,

    /// The product in the cart
    pub product_id: Uuid,

    /// Unit price captured when the item was last added, as a decimal string
    pub price: String,

    /// Number of units
    pub qty: i32,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            cart_id: item.cart_id.into_uuid(),
            product_id: item.product_id.into_uuid(),
            price: item.price.to_string(),
            qty: item.qty,
        }
    }
}
