//! Errors

use salvo::http::StatusError;
use tracing::error;

use trolley_app::domain::carts::CartsServiceError;

use crate::observability::observe_cart_operation;

/// Map a service failure for `operation` onto its HTTP status, counting the
/// outcome.
pub(crate) fn into_status_error(
    operation: &'static str,
) -> impl FnOnce(CartsServiceError) -> StatusError {
    move |error| {
        observe_cart_operation(operation, outcome(&error));

        match error {
            CartsServiceError::NotFound => StatusError::not_found().brief("Cart or item not found"),
            CartsServiceError::BadRequest(reason) => StatusError::bad_request().brief(reason),
            CartsServiceError::OutOfStock(product) => {
                StatusError::conflict().brief(format!("Product {product} is out of stock"))
            }
            CartsServiceError::InvalidItem => {
                StatusError::unprocessable_entity().brief("Cart contains an invalid item")
            }
            CartsServiceError::Internal(source) => {
                error!(operation, "cart operation failed: {source}");

                StatusError::internal_server_error()
            }
        }
    }
}

/// Record a successful `operation`.
pub(crate) fn succeeded(operation: &'static str) {
    observe_cart_operation(operation, "ok");
}

fn outcome(error: &CartsServiceError) -> &'static str {
    match error {
        CartsServiceError::NotFound => "not_found",
        CartsServiceError::BadRequest(_) => "bad_request",
        CartsServiceError::OutOfStock(_) => "out_of_stock",
        CartsServiceError::InvalidItem => "invalid_item",
        CartsServiceError::Internal(_) => "internal",
    }
}
