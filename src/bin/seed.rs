//! Database seeder: permission tags, the three stock roles, and sample
//! products/orders for local development.

use chrono::Utc;
use rand::prelude::*;

use admin_backend::config;
use admin_backend::errors::ApiError;
use admin_backend::stores::{NewOrderItem, OrderStore, ProductStore, RoleStore};

const PERMISSION_TAGS: [&str; 8] = [
    "view_users",
    "edit_users",
    "view_roles",
    "edit_roles",
    "view_products",
    "edit_products",
    "view_orders",
    "edit_orders",
];

const ADJECTIVES: [&str; 10] = [
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible", "Fantastic",
    "Practical", "Sleek", "Awesome",
];

const MATERIALS: [&str; 8] = [
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Leather",
];

const NOUNS: [&str; 10] = [
    "Chair", "Table", "Lamp", "Keyboard", "Mouse", "Shirt", "Shoes", "Hat", "Gloves", "Bottle",
];

const FIRST_NAMES: [&str; 10] = [
    "John", "Jane", "Alex", "Maria", "Chris", "Laura", "Sam", "Nina", "Peter", "Olivia",
];

const LAST_NAMES: [&str; 10] = [
    "Doe", "Smith", "Johnson", "Brown", "Garcia", "Miller", "Davis", "Wilson", "Moore", "Taylor",
];

fn product_title(rng: &mut impl Rng) -> String {
    format!(
        "{} {} {}",
        ADJECTIVES.choose(rng).unwrap(),
        MATERIALS.choose(rng).unwrap(),
        NOUNS.choose(rng).unwrap()
    )
}

/// Seed the 8 permission tags and the Admin/Editor/Viewer roles.
///
/// Skipped entirely when permissions already exist, so reruns do not trip
/// the unique tag index.
async fn seed_rbac(roles: &RoleStore) -> Result<(), ApiError> {
    if !roles.permissions().await?.is_empty() {
        println!("Permissions already seeded, skipping roles");
        return Ok(());
    }

    let mut permission_ids = Vec::new();
    for tag in PERMISSION_TAGS {
        permission_ids.push(roles.create_permission(tag).await?.id);
    }

    roles
        .create("Admin".to_string(), permission_ids.clone())
        .await?;

    // Editor: everything except edit_roles
    let editor: Vec<String> = PERMISSION_TAGS
        .iter()
        .zip(&permission_ids)
        .filter(|&(tag, _)| *tag != "edit_roles")
        .map(|(_, id)| id.clone())
        .collect();
    roles.create("Editor".to_string(), editor).await?;

    // Viewer: the view_* tags only
    let viewer: Vec<String> = PERMISSION_TAGS
        .iter()
        .zip(&permission_ids)
        .filter(|&(tag, _)| tag.starts_with("view_"))
        .map(|(_, id)| id.clone())
        .collect();
    roles.create("Viewer".to_string(), viewer).await?;

    println!("Seeded {} permissions and 3 roles", PERMISSION_TAGS.len());
    Ok(())
}

async fn seed_products(products: &ProductStore, rng: &mut impl Rng) -> Result<(), ApiError> {
    for n in 0..30 {
        let title = product_title(rng);
        products
            .create(
                title.clone(),
                format!("The {} you did not know you needed.", title.to_lowercase()),
                format!("https://picsum.photos/seed/{}/200/200", n),
                rng.random_range(100..10_000),
            )
            .await?;
    }

    println!("Seeded 30 products");
    Ok(())
}

async fn seed_orders(orders: &OrderStore, rng: &mut impl Rng) -> Result<(), ApiError> {
    let day = 24 * 60 * 60;
    let now = Utc::now().timestamp();

    for _ in 0..30 {
        let first = FIRST_NAMES.choose(rng).unwrap();
        let last = LAST_NAMES.choose(rng).unwrap();

        let items: Vec<NewOrderItem> = (0..rng.random_range(1..=3))
            .map(|_| NewOrderItem {
                product_title: product_title(rng),
                price: rng.random_range(100..10_000),
                quantity: rng.random_range(1..=5),
            })
            .collect();

        orders
            .create_at(
                format!("{} {}", first, last),
                format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
                items,
                now - rng.random_range(0..60) * day,
            )
            .await?;
    }

    println!("Seeded 30 orders");
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://admin.db?mode=rwc".to_string());

    let db = config::init_database(&database_url)
        .await
        .expect("Failed to connect to database");
    config::run_migrations(&db)
        .await
        .expect("Failed to run migrations");

    let role_store = RoleStore::new(db.clone());
    let product_store = ProductStore::new(db.clone());
    let order_store = OrderStore::new(db);

    let mut rng = rand::rng();

    seed_rbac(&role_store).await.expect("Failed to seed roles");
    seed_products(&product_store, &mut rng)
        .await
        .expect("Failed to seed products");
    seed_orders(&order_store, &mut rng)
        .await
        .expect("Failed to seed orders");

    println!("🌱 Seeding complete!");
}
