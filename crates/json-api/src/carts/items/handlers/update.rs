//! Change Cart Item Quantity Handler

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

/// Change Quantity Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChangeQuantityRequest {
    /// New number of units
    pub qty: i32,
}

/// Change Cart Item Quantity Handler
#[endpoint(
    tags("carts"),
    summary = "Change Cart Item Quantity",
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "http.carts.items.change_qty",
    skip(user_id, product_id, json, depot),
    fields(
        user_id = tracing::field::Empty,
        product_id = tracing::field::Empty,
        qty = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    user_id: PathParam<Uuid>,
    product_id: PathParam<Uuid>,
    json: JsonBody<ChangeQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartItemResponse>, StatusError> {
    let carts = depot.carts_or_500()?;
    let user = UserUuid::from_uuid(user_id.into_inner());
    let product = ProductUuid::from_uuid(product_id.into_inner());
    let qty = json.into_inner().qty;

    let span = tracing::Span::current();

    span.record("user_id", tracing::field::display(user));
    span.record("product_id", tracing::field::display(product));
    span.record("qty", qty);

    let item = carts
        .change_qty(user, product, qty)
        .await
        .map_err(into_status_error("change_qty"))?;

    succeeded("change_qty");

    Ok(Json(item.into()))
}
