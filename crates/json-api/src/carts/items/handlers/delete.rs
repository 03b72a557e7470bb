//! Remove Cart Item Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use trolley_app::domain::carts::models::{ProductUuid, UserUuid};

use crate::{
    carts::errors::{into_status_error, succeeded},
    extensions::*,
};

/// Remove Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Cart item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
#[tracing::instrument(
    name = "http.carts.items.remove",
    skip(user_id, product_id, depot),
    fields(
        user_id = tracing::field::Empty,
        product_id = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    user_id: PathParam<Uuid>,
    product_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let carts = depot.carts_or_500()?;
    let user = UserUuid::from_uuid(user_id.into_inner());
    let product = ProductUuid::from_uuid(product_id.into_inner());

    let span = tracing::Span::current();

    span.record("user_id", tracing::field::display(user));
    span.record("product_id", tracing::field::display(product));

    carts
        .remove_item(user, product)
        .await
        .map_err(into_status_error("remove_item"))?;

    succeeded("remove_item");

    Ok(StatusCode::OK)
}
