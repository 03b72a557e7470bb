//! Add Cart Item Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trolley_app::domain::carts::models::{ProductUuid, UserUuid};

use crate::{
    carts::{
        errors::{into_status_error, succeeded},
        responses::CartItemResponse,
    },
    extensions::*,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    /// The product to add
    pub product_id: Uuid,

    /// Number of units; replaces any quantity already in the cart
    pub qty: i32,
}

/// Add Cart Item Handler
///
/// Adds a product at its current catalog price, creating the cart if needed.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart item stored"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "http.carts.items.add",
    skip(user_id, json, depot),
    fields(
        user_id = tracing::field::Empty,
        product_id = tracing::field::Empty,
        qty = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    user_id: PathParam<Uuid>,
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartItemResponse>, StatusError> {
    let carts = depot.carts_or_500()?;
    let user = UserUuid::from_uuid(user_id.into_inner());
    let request = json.into_inner();
    let product = ProductUuid::from_uuid(request.product_id);

    let span = tracing::Span::current();

    span.record("user_id", tracing::field::display(user));
    span.record("product_id", tracing::field::display(product));
    span.record("qty", request.qty);

    let item = carts
        .add_item(user, product, request.qty)
        .await
        .map_err(into_status_error("add_item"))?;

    succeeded("add_item");

    tracing::info!(price = %item.price, "added cart item");

    Ok(Json(item.into()))
}
