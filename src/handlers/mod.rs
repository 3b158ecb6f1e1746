mod health;
mod import;
mod metrics;
mod orders;
mod products;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::rate_limit::throttle;
use crate::state::AppState;

// Full route table, every route behind the throttling middleware
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/products/{id}/archive", post(products::archive_product))
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/orders/export", get(orders::export_orders))
        .route("/api/orders/import", post(import::import_csv))
        .route(
            "/api/orders/{id}",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/api/users/{id}/orders/export", get(orders::export_user_orders))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), throttle))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(rate_limit: usize) -> Arc<AppState> {
        let state = Arc::new(AppState::new(rate_limit, 60, 300));
        state.store.add_user("alice", "Alice", "Smith");
        state
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_body(filename: &str, content: &str) -> (String, Vec<u8>) {
        let boundary = "test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"csv_file\"; filename=\"{filename}\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        (
            format!("multipart/form-data; boundary={boundary}"),
            body.into_bytes(),
        )
    }

    #[tokio::test]
    async fn requests_over_the_limit_get_429() {
        let app = router(test_state(2));

        for _ in 0..2 {
            let res = app.clone().oneshot(get("/health")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(res).await;
        assert_eq!(body["error"], "Rate limit exceeded");
        assert_eq!(
            body["message"],
            "You have exceeded the limit of 2 requests per 60 seconds."
        );
        assert!(body["retry_after"].as_str().unwrap().ends_with(" seconds"));
    }

    #[tokio::test]
    async fn admitted_requests_carry_rate_limit_headers() {
        let app = router(test_state(10));

        for _ in 0..2 {
            app.clone().oneshot(get("/health")).await.unwrap();
        }
        let res = app.clone().oneshot(get("/health")).await.unwrap();

        // third admitted request: 3 of 10 slots used
        assert_eq!(res.headers()["x-ratelimit-limit"], "10");
        assert_eq!(res.headers()["x-ratelimit-remaining"], "7");
        assert!(res.headers().contains_key("x-ratelimit-reset"));
    }

    #[tokio::test]
    async fn forwarded_clients_are_limited_independently() {
        let app = router(test_state(1));

        let from = |ip: &str| {
            Request::get("/health")
                .header("x-forwarded-for", ip.to_string())
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(
            app.clone().oneshot(from("9.9.9.9")).await.unwrap().status(),
            StatusCode::OK
        );
        assert_eq!(
            app.clone().oneshot(from("9.9.9.9")).await.unwrap().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            app.clone().oneshot(from("8.8.8.8")).await.unwrap().status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn csv_upload_creates_orders() {
        let state = test_state(10);
        let laptop = state.store.add_product("Laptop", "", 75000.0, 10);
        let app = router(Arc::clone(&state));

        let csv = format!(
            "delivery_address,promocode,user_id,product_ids\n123 Main St,SALE5,1,{}\n",
            laptop.id
        );
        let (content_type, body) = multipart_body("orders.csv", &csv);
        let res = app
            .oneshot(
                Request::post("/api/orders/import")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["created"], 1);
        assert_eq!(json["message"], "Successfully created 1 orders");
        assert_eq!(json["errors"].as_array().unwrap().len(), 0);
        assert_eq!(state.store.orders().len(), 1);
    }

    #[tokio::test]
    async fn non_csv_upload_is_rejected_whole() {
        let state = test_state(10);
        let app = router(Arc::clone(&state));

        let (content_type, body) =
            multipart_body("orders.txt", "delivery_address,promocode,user_id,product_ids\n");
        let res = app
            .oneshot(
                Request::post("/api/orders/import")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["error"], "file must have a .csv extension");
        assert!(state.store.orders().is_empty());
    }

    #[tokio::test]
    async fn created_orders_show_up_in_the_export() {
        let state = test_state(10);
        let laptop = state.store.add_product("Laptop", "", 75000.0, 10);
        let app = router(Arc::clone(&state));

        let res = app
            .clone()
            .oneshot(
                Request::post("/api/orders")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "delivery_address": "123 Main St",
                            "promocode": "SALE5",
                            "user_id": 1,
                            "product_ids": [laptop.id],
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app.clone().oneshot(get("/api/orders/export")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        let orders = json["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["delivery_address"], "123 Main St");
        assert_eq!(orders[0]["user_id"], 1);
        assert_eq!(orders[0]["product_ids"], serde_json::json!([laptop.id]));
    }

    #[tokio::test]
    async fn unknown_user_in_order_creation_is_404() {
        let app = router(test_state(10));

        let res = app
            .oneshot(
                Request::post("/api/orders")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "delivery_address": "123 Main St",
                            "user_id": 77,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let json = body_json(res).await;
        assert_eq!(json["error"], "user with id 77 not found");
    }

    #[tokio::test]
    async fn user_orders_export_is_served_from_cache() {
        let state = test_state(10);
        let laptop = state.store.add_product("Laptop", "", 75000.0, 10);
        let order = state.store.create_order("123 Main St", "", 1);
        state.store.set_order_products(order.id, vec![laptop.id]);
        let app = router(Arc::clone(&state));

        let res = app
            .clone()
            .oneshot(get("/api/users/1/orders/export"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json[0]["user"]["username"], "alice");
        assert_eq!(json[0]["products"][0]["name"], "Laptop");

        // a later order does not show while the cached snapshot is fresh
        state.store.create_order("456 Oak Ave", "", 1);
        let res = app
            .clone()
            .oneshot(get("/api/users/1/orders/export"))
            .await
            .unwrap();
        let json = body_json(res).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
