//! Cart Models

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Marker for cart identifiers.
#[derive(Debug)]
pub enum CartMarker {}

/// Marker for the identifiers of users owning carts.
#[derive(Debug)]
pub enum UserMarker {}

/// Marker for catalog product identifiers.
#[derive(Debug)]
pub enum ProductMarker {}

/// Cart UUID
pub type CartUuid = TypedUuid<CartMarker>;

/// User UUID
pub type UserUuid = TypedUuid<UserMarker>;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductMarker>;

/// Cart lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    Open,
    Pending,
    Checkout,
    Abandoned,
}

impl CartStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Pending => "PENDING",
            Self::Checkout => "CHECKOUT",
            Self::Abandoned => "ABANDONED",
        }
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CartStatus {
    type Error = UnknownCartStatus;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "OPEN" => Ok(Self::Open),
            "PENDING" => Ok(Self::Pending),
            "CHECKOUT" => Ok(Self::Checkout),
            "ABANDONED" => Ok(Self::Abandoned),
            other => Err(UnknownCartStatus(other.to_string())),
        }
    }
}

/// A status string that is not one of the known [`CartStatus`] values.
#[derive(Debug, thiserror::Error)]
#[error("unknown cart status {0:?}")]
pub struct UnknownCartStatus(pub String);

/// Cart Model
///
/// This is also the snapshot stored in the cache, so the serde layout is the
/// cache wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartUuid,
    pub user_id: UserUuid,
    pub status: CartStatus,
    pub items: Vec<CartItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// CartItem Model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_id: CartUuid,
    pub product_id: ProductUuid,
    pub price: Decimal,
    pub qty: i32,
}
