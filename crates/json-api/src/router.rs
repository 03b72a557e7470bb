//! App Router

use salvo::Router;

use crate::carts;

pub(crate) fn app_router() -> Router {
    Router::with_path("cart/{user_id}")
        .get(carts::get::handler)
        .push(Router::with_path("checkout").post(carts::checkout::handler))
        .push(
            Router::with_path("items")
                .post(carts::items::create::handler)
                .delete(carts::items::clear::handler)
                .push(
                    Router::with_path("{product_id}")
                        .put(carts::items::update::handler)
                        .delete(carts::items::delete::handler),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{prelude::*, test::TestClient};

    use trolley_app::domain::carts::{
        MockCartsService,
        models::{ProductUuid, UserUuid},
    };

    use crate::test_helpers::{carts_service, make_cart, make_item};

    use super::*;

    #[tokio::test]
    async fn routes_reach_each_cart_operation() {
        let user = UserUuid::new();
        let product = ProductUuid::new();
        let cart = make_cart(user, &[product]);
        let checked_out = cart.clone();
        let added = make_item(cart.id, product, 1);
        let changed = make_item(cart.id, product, 2);

        let mut carts = MockCartsService::new();

        carts.expect_get_cart().once().return_once(move |_| Ok(cart));
        carts.expect_add_item().once().return_once(move |_, _, _| Ok(added));
        carts
            .expect_change_qty()
            .once()
            .return_once(move |_, _, _| Ok(changed));
        carts.expect_remove_item().once().return_once(|_, _| Ok(()));
        carts.expect_clear().once().return_once(|_| Ok(()));
        carts
            .expect_checkout()
            .once()
            .return_once(move |_| Ok(checked_out));

        let service = carts_service(carts, app_router());
        let base = format!("http://example.com/cart/{user}");

        let responses = [
            TestClient::get(&base).send(&service).await,
            TestClient::post(format!("{base}/items"))
                .json(&serde_json::json!({ "product_id": product, "qty": 1 }))
                .send(&service)
                .await,
            TestClient::put(format!("{base}/items/{product}"))
                .json(&serde_json::json!({ "qty": 2 }))
                .send(&service)
                .await,
            TestClient::delete(format!("{base}/items/{product}"))
                .send(&service)
                .await,
            TestClient::delete(format!("{base}/items")).send(&service).await,
            TestClient::post(format!("{base}/checkout"))
                .send(&service)
                .await,
        ];

        for res in &responses {
            assert_eq!(res.status_code, Some(StatusCode::OK), "every route should succeed");
        }
    }

    #[tokio::test]
    async fn unknown_routes_return_404() {
        let service = Service::new(app_router());

        let res = TestClient::get("http://example.com/carts").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND), "plural path is not routed");
    }
}
