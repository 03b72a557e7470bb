//! Clear Cart Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use trolley_app::domain::carts::models::UserUuid;

use crate::{
    carts::errors::{into_status_error, succeeded},
    extensions::*,
};

/// Clear Cart Handler
///
/// Deletes the cart and all of its items.
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart cleared"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
#[tracing::instrument(
    name = "http.carts.clear",
    skip(user_id, depot),
    fields(user_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let carts = depot.carts_or_500()?;
    let user = UserUuid::from_uuid(user_id.into_inner());

    tracing::Span::current().record("user_id", tracing::field::display(user));

    carts
        .clear(user)
        .await
        .map_err(into_status_error("clear"))?;

    succeeded("clear");

    tracing::info!("cleared cart");

    Ok(StatusCode::OK)
}
