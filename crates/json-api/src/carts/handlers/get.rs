//! Get Cart Handler

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

/// Get Cart Handler
///
/// Returns the user's live cart, served from the snapshot cache when present.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart found"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "http.carts.get",
    skip(user_id, depot),
    fields(user_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let carts = depot.carts_or_500()?;
    let user = UserUuid::from_uuid(user_id.into_inner());

    tracing::Span::current().record("user_id", tracing::field::display(user));

    let cart = carts
        .get_cart(user)
        .await
        .map_err(into_status_error("get_cart"))?;

    succeeded("get_cart");

    Ok(Json(cart.into()))
}
