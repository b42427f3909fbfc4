use sea_orm::Database;

use engine::{Engine, Role};
use migration::MigratorTrait;
use server::{ServerConfig, spawn_with_listener};

async fn spawn_server() -> (String, String) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let (_user, token) = engine
        .create_user("ann@example.com", "Ann", "password", Role::User)
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = spawn_with_listener(engine, ServerConfig::default(), listener).unwrap();
    (format!("http://{addr}"), token)
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let (base, _token) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{base}/expenses")).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{base}/expenses"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_round_trip_over_http() {
    let (base, token) = spawn_server().await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{base}/expenses"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "expense_date": "2025-06-01",
            "amount_minor": 10000,
            "currency": "USD",
            "description": "Lunch"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["amount_minor"], 10000);
    assert_eq!(created["added_by_name"], "Ann");
    let id = created["id"].as_i64().unwrap();

    let listed: serde_json::Value = client
        .get(format!("{base}/expenses"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["expenses"].as_array().unwrap().len(), 1);

    let removed: serde_json::Value = client
        .post(format!("{base}/expenses/{id}/remove"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(removed["removed_at"].is_string());

    // Removing again conflicts.
    let res = client
        .post(format!("{base}/expenses/{id}/remove"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    // The default listing keeps the removed record visible, stamped; the
    // summary excludes it.
    let listed: serde_json::Value = client
        .get(format!("{base}/expenses"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let expenses = listed["expenses"].as_array().unwrap();
    assert_eq!(expenses.len(), 1);
    assert!(expenses[0]["removed_at"].is_string());

    // Opting out of removed records empties the list.
    let listed: serde_json::Value = client
        .get(format!("{base}/expenses?include_removed=false"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed["expenses"].as_array().unwrap().is_empty());

    let total: serde_json::Value = client
        .get(format!("{base}/expenses/summary"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(total["total_usd_minor"], 0);
}

#[tokio::test]
async fn rate_override_and_readback() {
    let (base, token) = spawn_server().await;
    let client = reqwest::Client::new();

    // No rate source configured: the fallback rate with no failure flag.
    let rate: serde_json::Value = client
        .get(format!("{base}/rate"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rate["rate"], 13.5);
    assert_eq!(rate["fetch_failed"], false);

    let rate: serde_json::Value = client
        .put(format!("{base}/rate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"rate": 14.2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rate["rate"], 14.2);

    // An unusable override is rejected.
    let res = client
        .put(format!("{base}/rate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"rate": 0.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn aggregates_group_and_convert() {
    let (base, token) = spawn_server().await;
    let client = reqwest::Client::new();

    let acme: serde_json::Value = client
        .post(format!("{base}/suppliers"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"name": "Acme"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for (amount, currency) in [(10000, "USD"), (13500, "BWP")] {
        client
            .post(format!("{base}/expenses"))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "expense_date": "2025-06-01",
                "amount_minor": amount,
                "currency": currency,
                "description": "x",
                "supplier_id": acme["id"]
            }))
            .send()
            .await
            .unwrap();
    }

    let summary: serde_json::Value = client
        .get(format!("{base}/expenses/bySupplier"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = summary["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["label"], "Acme");
    assert_eq!(rows[0]["total_usd_minor"], 10000);
    assert_eq!(rows[0]["total_bwp_minor"], 13500);
    let equiv = rows[0]["total_usd_equiv_minor"].as_f64().unwrap();
    assert!((equiv - 11000.0).abs() < 1e-6);
}
