//! Checkout Cart Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use trolley_app::domain::carts::models::UserUuid;

use crate::{
    carts::{
        errors::{into_status_error, succeeded},
        responses::CartResponse,
    },
    extensions::*,
};

/// Checkout Cart Handler
///
/// Re-verifies every item with the catalog and removes the cart. Returns the
/// checked-out cart.
#[endpoint(
    tags("carts"),
    summary = "Checkout Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart checked out"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found or empty"),
        (status_code = StatusCode::CONFLICT, description = "An item is out of stock"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Cart contains an invalid item"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "http.carts.checkout",
    skip(user_id, depot),
    fields(user_id = tracing::field::Empty, items = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let carts = depot.carts_or_500()?;
    let user = UserUuid::from_uuid(user_id.into_inner());

    let span = tracing::Span::current();

    span.record("user_id", tracing::field::display(user));

    let cart = carts
        .checkout(user)
        .await
        .map_err(into_status_error("checkout"))?;

    span.record("items", cart.items.len());

    succeeded("checkout");

    tracing::info!(cart_id = %cart.id, "checked out cart");

    Ok(Json(cart.into()))
}
