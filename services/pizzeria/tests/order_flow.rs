//! End-to-end order flow tests against a live PostgreSQL instance.
//!
//! These tests need `DATABASE_URL` pointing at a scratch database and
//! are ignored by default; run them with `cargo test -- --ignored`.
//! They truncate every table, so never point them at real data.

use rust_decimal::Decimal;
use serial_test::serial;
use sqlx::PgPool;

use pizzeria::cart::Cart;
use pizzeria::catalog::{MenuFilter, SortOrder};
use pizzeria::error::AppError;
use pizzeria::input::ScriptedSource;
use pizzeria::models::{NewItem, NewUser, OrderScope, OrderStatus, Role, UpdateUser};
use pizzeria::repositories::{ItemRepository, OrderRepository, StoreRepository, UserRepository};
use pizzeria::session::SessionController;

async fn setup() -> PgPool {
    let config = common::database::DatabaseConfig::from_env().expect("database config");
    let pool = common::database::init_pool(&config)
        .await
        .expect("database pool");

    common::database::run_migrations(&pool, &sqlx::migrate!("./migrations"))
        .await
        .expect("migrations");

    sqlx::query("TRUNCATE order_lines, orders, users, stores, items CASCADE")
        .execute(&pool)
        .await
        .expect("truncate");

    seed(&pool).await;
    pool
}

async fn seed(pool: &PgPool) {
    let stores = [
        ("S1", "123 Main St", "Riverside", "CA", true),
        ("S2", "456 Oak Ave", "Moreno Valley", "CA", false),
    ];
    for (id, address, city, state, is_open) in stores {
        sqlx::query(
            "INSERT INTO stores (store_id, address, city, state, is_open) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(address)
        .bind(city)
        .bind(state)
        .bind(is_open)
        .execute(pool)
        .await
        .expect("seed store");
    }

    let items = ItemRepository::new(pool.clone());
    // production data carries a leading space in some type values
    for (name, item_type, cents) in [
        ("Pepperoni", " entree", 999),
        ("Margherita", "entree", 849),
        ("Soda", "drinks", 150),
    ] {
        items
            .create(&NewItem {
                name: name.to_string(),
                ingredients: "see box".to_string(),
                item_type: item_type.to_string(),
                price: Decimal::new(cents, 2),
                description: String::new(),
            })
            .await
            .expect("seed item");
    }

    let users = UserRepository::new(pool.clone());
    for (login, password) in [("alice", "pw1"), ("bob", "pw2"), ("mgr", "pw3")] {
        users
            .create(&NewUser {
                login: login.to_string(),
                password: password.to_string(),
                phone_number: "951-555-0100".to_string(),
            })
            .await
            .expect("seed user");
    }
    users
        .update(
            "mgr",
            &UpdateUser {
                role: Some(Role::Manager),
                ..Default::default()
            },
        )
        .await
        .expect("promote manager");
}

async fn place_alice_order(pool: &PgPool) -> i64 {
    let items = ItemRepository::new(pool.clone());
    let orders = OrderRepository::new(pool.clone());

    let pepperoni = items.find_by_name("Pepperoni").await.unwrap().unwrap();
    let soda = items.find_by_name("Soda").await.unwrap().unwrap();

    let mut cart = Cart::new("S1");
    cart.add(&pepperoni, 2).unwrap();
    cart.add(&soda, 1).unwrap();
    assert_eq!(cart.total(), Decimal::new(2148, 2));

    orders.create(&cart.to_new_order("alice")).await.unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_order_lifecycle_scenario() {
    let pool = setup().await;
    let orders = OrderRepository::new(pool.clone());

    let order_id = place_alice_order(&pool).await;

    // alice sees her own order with snapshot total and both lines
    let detail = orders.detail(order_id, "alice", Role::Customer).await.unwrap();
    assert_eq!(detail.order.total_price, Decimal::new(2148, 2));
    assert_eq!(detail.order.status, OrderStatus::Incomplete);
    assert_eq!(detail.lines.len(), 2);

    // the manager completes it; repeating the update is not an error
    orders
        .update_status(order_id, OrderStatus::Complete)
        .await
        .unwrap();
    orders
        .update_status(order_id, OrderStatus::Complete)
        .await
        .unwrap();

    let detail = orders.detail(order_id, "mgr", Role::Manager).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::Complete);
    assert_eq!(detail.order.total_price, Decimal::new(2148, 2));
    assert_eq!(detail.lines.len(), 2);

    // another customer cannot tell this order from a nonexistent one
    let err = orders.detail(order_id, "bob", Role::Customer).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("Order")));

    // an id that was never allocated also comes back NotFound
    let err = orders
        .update_status(order_id.wrapping_add(1), OrderStatus::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Order")));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_concurrent_submissions_get_unique_ids() {
    let pool = setup().await;
    let items = ItemRepository::new(pool.clone());
    let soda = items.find_by_name("Soda").await.unwrap().unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let orders = OrderRepository::new(pool.clone());
        let mut cart = Cart::new("S1");
        cart.add(&soda, 1).unwrap();
        let new_order = cart.to_new_order("alice");
        handles.push(tokio::spawn(async move { orders.create(&new_order).await }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8, "order ids must be unique");

    let orders = OrderRepository::new(pool.clone());
    let listed = orders
        .list("alice", Role::Customer, OrderScope::Own)
        .await
        .unwrap();
    assert_eq!(listed.len(), 8);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_customer_scope_is_forced_to_own_orders() {
    let pool = setup().await;
    let orders = OrderRepository::new(pool.clone());

    place_alice_order(&pool).await;

    // bob asks for everything but only his own (none) come back
    let listed = orders
        .list("bob", Role::Customer, OrderScope::All)
        .await
        .unwrap();
    assert!(listed.is_empty());

    let listed = orders
        .list("mgr", Role::Manager, OrderScope::All)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let listed = orders
        .list("mgr", Role::Manager, OrderScope::Recent(5))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_catalog_filters_against_store() {
    let pool = setup().await;
    let items = ItemRepository::new(pool.clone());

    // strict upper bound excludes Pepperoni at 9.99
    let filter = MenuFilter {
        max_price: Some(Decimal::new(999, 2)),
        ..Default::default()
    };
    let listed = items.list(&filter).await.unwrap();
    let names: Vec<_> = listed.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Margherita", "Soda"]);

    // type filter matches despite the leading space stored on Pepperoni
    let filter = MenuFilter {
        max_price: Some(Decimal::new(1000, 2)),
        item_type: Some("entree".to_string()),
        sort: SortOrder::Ascending,
    };
    let listed = items.list(&filter).await.unwrap();
    let names: Vec<_> = listed.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Margherita", "Pepperoni"]);

    // clearing filters returns the full catalog in insertion order
    let mut filter = MenuFilter {
        max_price: Some(Decimal::new(200, 2)),
        item_type: Some("drinks".to_string()),
        sort: SortOrder::Descending,
    };
    filter.clear();
    let listed = items.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].name, "Pepperoni");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_scripted_session_registers_and_orders() {
    let pool = setup().await;

    let script = ScriptedSource::new([
        // register carol
        "1",
        "carol",
        "Secret1!",
        "951-555-0101",
        // log in and place an order at S1
        "2",
        "carol",
        "Secret1!",
        "4",
        "S1",
        // unknown item is reported and leaves the cart untouched
        "Calzone",
        "Soda",
        "2",
        "done",
        // log out and exit
        "20",
        "9",
    ]);

    let mut session = SessionController::new(pool.clone(), script);
    session.run().await.expect("session run");

    let users = UserRepository::new(pool.clone());
    let carol = users.find_by_login("carol").await.unwrap().unwrap();
    assert_eq!(carol.role, Role::Customer);
    // stored credential is a salted hash, not the password itself
    assert_ne!(carol.password_hash, "Secret1!");
    assert!(users.verify_password(&carol, "Secret1!").unwrap());

    let orders = OrderRepository::new(pool.clone());
    let listed = orders
        .list("carol", Role::Customer, OrderScope::Own)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].total_price, Decimal::new(300, 2));
    assert_eq!(listed[0].status, OrderStatus::Incomplete);
    assert_eq!(listed[0].store_id, "S1");

    // the unknown item left no trace in the submitted order
    let detail = orders
        .detail(listed[0].order_id, "carol", Role::Customer)
        .await
        .unwrap();
    assert_eq!(detail.lines.len(), 1);
    assert_eq!(detail.lines[0].item_name, "Soda");
    assert_eq!(detail.lines[0].quantity, 2);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_closed_store_aborts_order_entry() {
    let pool = setup().await;

    let script = ScriptedSource::new([
        "2", "alice", "pw1", // log in
        "4", "S2", // closed store: straight back to the menu
        "20", "9",
    ]);

    let mut session = SessionController::new(pool.clone(), script);
    session.run().await.expect("session run");

    let orders = OrderRepository::new(pool.clone());
    let listed = orders
        .list("alice", Role::Customer, OrderScope::Own)
        .await
        .unwrap();
    assert!(listed.is_empty(), "no partial order may persist");

    let stores = StoreRepository::new(pool);
    let s2 = stores.find_by_id("S2").await.unwrap().unwrap();
    assert!(!s2.is_open);
}
