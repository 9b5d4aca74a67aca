mod common;

use poem::http::StatusCode;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn test_health_endpoint_reports_healthy() {
    let app = spawn_app().await;

    let resp = app.client.get("/api/health").send().await;
    resp.assert_status_is_ok();

    let body = resp.json().await;
    body.value().object().get("status").assert_string("healthy");
}

#[tokio::test]
async fn test_register_login_and_current_user_flow() {
    let app = spawn_app().await;

    let resp = app
        .client
        .post("/api/register")
        .body_json(&json!({
            "fullname": "John Doe",
            "username": "JohnDoe",
            "email": "John.Doe@Example.COM",
            "password": "secret123",
            "password_confirm": "secret123"
        }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let body = resp.json().await;
    let registered = body.value().object();
    // Identity fields are normalized on the way in
    registered.get("username").assert_string("johndoe");
    registered.get("email").assert_string("john.doe@example.com");

    let resp = app
        .client
        .post("/api/login")
        .body_json(&json!({
            "email": "john.doe@example.com",
            "password": "secret123"
        }))
        .send()
        .await;
    resp.assert_status_is_ok();

    // Drive the cookie-based auth gate through the real router
    let user = app
        .app_data
        .user_store
        .find_by_username("johndoe")
        .await
        .unwrap()
        .unwrap();
    let token = app
        .app_data
        .token_service
        .issue(&user.id, false)
        .unwrap()
        .token;

    let resp = app
        .client
        .get("/api/user")
        .header("Cookie", format!("user_session={}", token))
        .send()
        .await;
    resp.assert_status_is_ok();

    let body = resp.json().await;
    body.value().object().get("username").assert_string("johndoe");
}

#[tokio::test]
async fn test_request_without_session_cookie_is_401() {
    let app = spawn_app().await;

    let resp = app.client.get("/api/user").send().await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_with_invalid_token_is_401() {
    let app = spawn_app().await;

    let resp = app
        .client
        .get("/api/user")
        .header("Cookie", "user_session=invalid-token")
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_is_409() {
    let app = spawn_app().await;

    let payload = json!({
        "fullname": "John Doe",
        "username": "johndoe",
        "email": "john@example.com",
        "password": "secret123",
        "password_confirm": "secret123"
    });

    app.client
        .post("/api/register")
        .body_json(&payload)
        .send()
        .await
        .assert_status_is_ok();

    let resp = app
        .client
        .post("/api/register")
        .body_json(&payload)
        .send()
        .await;
    resp.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_view_orders_may_list_but_not_export() {
    let app = spawn_app().await;
    let cookie = app.session_with_permissions(&["view_orders"]).await;

    let resp = app
        .client
        .get("/api/orders")
        .header("Cookie", cookie.clone())
        .send()
        .await;
    resp.assert_status_is_ok();

    let resp = app
        .client
        .post("/api/export")
        .header("Cookie", cookie)
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_export_returns_csv_attachment() {
    let app = spawn_app().await;
    let cookie = app.session_with_permissions(&["edit_orders"]).await;

    app.app_data
        .order_store
        .create(
            "John Doe".to_string(),
            "john@example.com".to_string(),
            vec![
                admin_backend::stores::NewOrderItem {
                    product_title: "Keyboard".to_string(),
                    price: 2099,
                    quantity: 2,
                },
                admin_backend::stores::NewOrderItem {
                    product_title: "Mouse".to_string(),
                    price: 999,
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();

    let resp = app
        .client
        .post("/api/export")
        .header("Cookie", cookie)
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.assert_header("content-type", "text/csv");
    resp.assert_header("content-disposition", "attachment; filename=\"orders.csv\"");
    // Row contents are covered by the export unit tests
}

#[tokio::test]
async fn test_product_crud_status_codes_through_router() {
    let app = spawn_app().await;
    let cookie = app
        .session_with_permissions(&["view_products", "edit_products"])
        .await;

    // Create: 201
    let resp = app
        .client
        .post("/api/products")
        .header("Cookie", cookie.clone())
        .body_json(&json!({
            "title": "Lamp",
            "description": "Desk lamp",
            "image": "https://img.example.com/lamp.png",
            "price": 2500
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    let body = resp.json().await;
    let id = body.value().object().get("id").string().to_string();

    // Update: 202
    let resp = app
        .client
        .put(format!("/api/products/{}", id))
        .header("Cookie", cookie.clone())
        .body_json(&json!({ "price": 1999 }))
        .send()
        .await;
    resp.assert_status(StatusCode::ACCEPTED);

    // Delete: 204
    let resp = app
        .client
        .delete(format!("/api/products/{}", id))
        .header("Cookie", cookie.clone())
        .send()
        .await;
    resp.assert_status(StatusCode::NO_CONTENT);

    // Gone: 404
    let resp = app
        .client
        .get(format!("/api/products/{}", id))
        .header("Cookie", cookie)
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_search_miss_is_404_naming_the_term() {
    let app = spawn_app().await;
    let cookie = app.session_with_permissions(&["view_users"]).await;

    let resp = app
        .client
        .get("/api/users")
        .query("search", &"zz-nobody")
        .header("Cookie", cookie)
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    let body = resp.json().await;
    let message = body.value().object().get("message").string().to_string();
    assert!(message.contains("zz-nobody"));
}

#[tokio::test]
async fn test_chart_returns_ordered_daily_buckets() {
    let app = spawn_app().await;
    let cookie = app.session_with_permissions(&["view_orders"]).await;

    let day = 24 * 60 * 60;
    let base = chrono::Utc::now().timestamp() - 7 * day;
    for offset in [5 * day, 0, 2 * day] {
        app.app_data
            .order_store
            .create_at(
                "Buyer".to_string(),
                "buyer@example.com".to_string(),
                vec![admin_backend::stores::NewOrderItem {
                    product_title: "Widget".to_string(),
                    price: 1000,
                    quantity: 1,
                }],
                base + offset,
            )
            .await
            .unwrap();
    }

    let resp = app
        .client
        .get("/api/chart")
        .header("Cookie", cookie)
        .send()
        .await;
    resp.assert_status_is_ok();

    let body = resp.json().await;
    let points = body.value().array();
    assert_eq!(points.len(), 3);

    let dates: Vec<String> = (0..3)
        .map(|i| points.get(i).object().get("date").string().to_string())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}
