//! Default mock handlers and the fixture data behind them.
//!
//! Data is generated once per registry. With a seed the generated set is
//! reproducible; tokens and ids minted while handling requests are always
//! random, so callers should only rely on the shape of responses.

use super::{MockReply, MockRegistry, MockRequest};
use crate::request::Method;
use crate::{
    Category, CreateProductRequest, Notification, NotificationKind, NotificationPage, OrderPage,
    OrderStatus, OrderSummary, ProductDetail, ProductPage, ProductSummary, Result, Review,
    UserProfile,
};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NICKNAMES: [&str; 12] = [
    "Mei", "Jun", "Lan", "Hao", "Ying", "Bo", "Xin", "Tao", "Qing", "Rui", "Ling", "Feng",
];

const CATEGORY_NAMES: [&str; 10] = [
    "Electronics",
    "Clothing & Bags",
    "Furniture & Appliances",
    "Books & Stationery",
    "Sports & Outdoors",
    "Beauty & Care",
    "Baby & Toys",
    "Food & Drinks",
    "Car Accessories",
    "Other",
];

const ADJECTIVES: [&str; 10] = [
    "Vintage", "Barely used", "Compact", "Handmade", "Wireless", "Foldable", "Classic",
    "Portable", "Oversized", "Limited",
];

const NOUNS: [&str; 12] = [
    "desk lamp", "backpack", "bicycle", "camera", "bookshelf", "headphones", "rice cooker",
    "jacket", "tennis racket", "keyboard", "novel set", "stroller",
];

const SYSTEM_TITLES: [&str; 4] = [
    "Scheduled maintenance",
    "New version available",
    "Security reminder",
    "New feature released",
];

const TRANSACTION_TITLES: [&str; 4] = [
    "Order status updated",
    "Your item was sold",
    "You received a review",
    "New buyer question",
];

struct MockProduct {
    detail: ProductDetail,
    category_id: String,
}

impl MockProduct {
    fn summary(&self) -> ProductSummary {
        ProductSummary {
            product_id: self.detail.product_id.clone(),
            title: self.detail.title.clone(),
            price: self.detail.price,
            main_image_url: self
                .detail
                .image_urls
                .first()
                .cloned()
                .unwrap_or_default(),
        }
    }
}

struct Fixtures {
    users: Vec<UserProfile>,
    categories: Vec<Category>,
    products: Mutex<Vec<MockProduct>>,
    orders: Mutex<Vec<OrderSummary>>,
    notifications: Vec<Notification>,
}

impl Fixtures {
    fn generate(rng: &mut StdRng) -> Self {
        let users: Vec<UserProfile> = (0..rng.gen_range(10..=20))
            .map(|_| UserProfile {
                user_id: uuid_from(rng),
                nickname: pick(rng, &NICKNAMES).to_string(),
                avatar_url: image_url(rng, 100, 100),
                join_date: Some(past_timestamp(rng, 365)[..10].to_string()),
            })
            .collect();

        let mut names = CATEGORY_NAMES.to_vec();
        names.shuffle(rng);
        let categories: Vec<Category> = names
            .into_iter()
            .take(rng.gen_range(8..=12).min(CATEGORY_NAMES.len()))
            .map(|name| Category {
                category_id: uuid_from(rng),
                name: name.to_string(),
                icon_url: image_url(rng, 60, 60),
            })
            .collect();

        let products: Vec<MockProduct> = (0..rng.gen_range(20..=50))
            .map(|_| {
                let seller = users[rng.gen_range(0..users.len())].summary();
                let reviews = (0..rng.gen_range(0..=10))
                    .map(|_| Review {
                        review_id: uuid_from(rng),
                        author: users[rng.gen_range(0..users.len())].summary(),
                        content: format!("{} as described, smooth deal.", pick(rng, &ADJECTIVES)),
                        rating: Some(rng.gen_range(1..=5)),
                        created_at: past_timestamp(rng, 60),
                    })
                    .collect();
                MockProduct {
                    category_id: categories[rng.gen_range(0..categories.len())]
                        .category_id
                        .clone(),
                    detail: ProductDetail {
                        product_id: uuid_from(rng),
                        title: format!("{} {}", pick(rng, &ADJECTIVES), pick(rng, &NOUNS)),
                        description: format!(
                            "Selling my {}. Pick-up or shipping both fine.",
                            pick(rng, &NOUNS)
                        ),
                        price: price(rng, 10, 1000),
                        image_urls: (0..rng.gen_range(3..=6))
                            .map(|_| image_url(rng, 400, 400))
                            .collect(),
                        stock: rng.gen_range(1..=100),
                        seller_info: seller,
                        is_favorite: rng.gen_bool(0.5),
                        posted_at: past_timestamp(rng, 90),
                        reviews,
                    },
                }
            })
            .collect();

        let orders: Vec<OrderSummary> = (0..rng.gen_range(15..=30))
            .map(|_| {
                let product = &products[rng.gen_range(0..products.len())];
                let quantity = rng.gen_range(1..=3);
                OrderSummary {
                    order_id: uuid_from(rng),
                    status: *pick(rng, &OrderStatus::ALL),
                    product_id: product.detail.product_id.clone(),
                    product_title: product.detail.title.clone(),
                    product_main_image_url: product.summary().main_image_url,
                    price_at_purchase: Some(product.detail.price),
                    quantity,
                    total_price: round_cents(product.detail.price * f64::from(quantity)),
                    created_at: past_timestamp(rng, 60),
                }
            })
            .collect();

        let notifications = (0..rng.gen_range(20..=40))
            .map(|_| {
                let kind = if rng.gen_bool(0.5) {
                    NotificationKind::System
                } else {
                    NotificationKind::Transaction
                };
                let title = match kind {
                    NotificationKind::System => pick(rng, &SYSTEM_TITLES),
                    NotificationKind::Transaction => pick(rng, &TRANSACTION_TITLES),
                };
                let created_at = past_timestamp(rng, 30);
                Notification {
                    notification_id: uuid_from(rng),
                    kind,
                    title: title.to_string(),
                    content: format!("{}. Open the app for details.", title),
                    updated_at: Some(created_at.clone()),
                    created_at,
                    is_read: rng.gen_bool(0.5),
                }
            })
            .collect();

        Self {
            users,
            categories,
            products: Mutex::new(products),
            orders: Mutex::new(orders),
            notifications,
        }
    }

    /// The user every mock login signs in as
    fn signed_in_user(&self) -> &UserProfile {
        &self.users[0]
    }
}

/// Wrap a handler so it answers 401 unless a bearer token was sent
fn requires_token<F>(handler: F) -> impl Fn(&MockRequest) -> MockReply + Send + Sync + 'static
where
    F: Fn(&MockRequest) -> MockReply + Send + Sync + 'static,
{
    move |req| match req.authorization.as_deref() {
        Some(value) if value.starts_with("Bearer ") => handler(req),
        _ => MockReply::status(401, json!({ "message": "missing bearer token" })),
    }
}

/// Install the default handler set
pub fn register_defaults(registry: &mut MockRegistry, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let fixtures = Arc::new(Fixtures::generate(&mut rng));

    let f = fixtures.clone();
    registry.register(Method::Post, r"^/auth/login$", move |req| login(&f, req))?;

    let f = fixtures.clone();
    registry.register(
        Method::Get,
        r"^/users/me$",
        requires_token(move |_| MockReply::ok(json!(f.signed_in_user()))),
    )?;

    let f = fixtures.clone();
    registry.register(Method::Get, r"^/products$", move |req| list_products(&f, req))?;

    let f = fixtures.clone();
    registry.register(
        Method::Post,
        r"^/products$",
        requires_token(move |req| create_product(&f, req)),
    )?;

    let f = fixtures.clone();
    registry.register(Method::Get, r"^/products/[\w-]+$", move |req| {
        get_product(&f, req)
    })?;

    let f = fixtures.clone();
    registry.register(Method::Get, r"^/categories$", move |_| {
        MockReply::ok(json!(f.categories))
    })?;

    let f = fixtures.clone();
    registry.register(
        Method::Get,
        r"^/orders$",
        requires_token(move |req| list_orders(&f, req)),
    )?;

    let f = fixtures.clone();
    registry.register(
        Method::Post,
        r"^/orders$",
        requires_token(move |req| create_order(&f, req)),
    )?;

    let f = fixtures;
    registry.register(
        Method::Get,
        r"^/notifications$",
        requires_token(move |req| list_notifications(&f, req)),
    )?;

    registry.register(Method::Post, r"^/files/upload$", requires_token(upload))?;

    Ok(())
}

fn login(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    match req.body_str("code") {
        Some(code) if !code.is_empty() => {
            let mut rng = rand::thread_rng();
            let token: String = (0..32).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
            MockReply::ok(json!({ "token": token, "user": fixtures.signed_in_user() }))
        }
        _ => MockReply::status(400, json!({ "message": "login failed, please retry" })),
    }
}

fn list_products(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    let page = req.query_u32("page", 1).max(1) as usize;
    let size = req.query_u32("size", 10).max(1) as usize;
    let query = req.query_param("query").filter(|q| !q.is_empty());
    let category_id = req.query_param("categoryId").filter(|c| !c.is_empty());

    let products = fixtures
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let matching: Vec<ProductSummary> = products
        .iter()
        .filter(|p| query.map_or(true, |q| p.detail.title.contains(q)))
        .filter(|p| category_id.map_or(true, |c| p.category_id == c))
        .map(MockProduct::summary)
        .collect();

    let page = ProductPage {
        total_pages: total_pages(matching.len(), size),
        total_elements: matching.len() as u64,
        items: matching
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .collect(),
    };
    MockReply::ok(json!(page))
}

fn create_product(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    let payload: CreateProductRequest = match req
        .body
        .clone()
        .map(serde_json::from_value)
        .transpose()
    {
        Ok(Some(payload)) => payload,
        Ok(None) => return MockReply::status(400, json!({ "message": "missing request body" })),
        Err(e) => return MockReply::status(400, json!({ "message": e.to_string() })),
    };

    let detail = ProductDetail {
        product_id: Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        price: payload.price,
        image_urls: payload.image_urls,
        stock: payload.stock,
        seller_info: fixtures.signed_in_user().summary(),
        is_favorite: false,
        posted_at: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        reviews: Vec::new(),
    };
    let reply = MockReply::created(json!(detail));

    fixtures
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(MockProduct {
            detail,
            category_id: payload.category_id,
        });
    reply
}

fn get_product(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    let id = req.last_segment();
    let products = fixtures
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    // Unknown ids resolve to the first product so detail pages always render
    match products
        .iter()
        .find(|p| p.detail.product_id == id)
        .or_else(|| products.first())
    {
        Some(product) => MockReply::ok(json!(product.detail)),
        None => MockReply::status(404, json!({ "message": "product not found" })),
    }
}

fn list_orders(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    let status = req
        .query_param("status")
        .and_then(|s| s.parse::<OrderStatus>().ok());

    let orders = fixtures.orders.lock().unwrap_or_else(PoisonError::into_inner);
    let items: Vec<OrderSummary> = orders
        .iter()
        .filter(|o| status.map_or(true, |s| o.status == s))
        .cloned()
        .collect();

    let page = OrderPage {
        total_pages: 1,
        total_elements: items.len() as u64,
        items,
    };
    MockReply::ok(json!(page))
}

fn create_order(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    let Some(product_id) = req.body_str("productId").map(str::to_string) else {
        return MockReply::status(400, json!({ "message": "productId is required" }));
    };
    let quantity = match req.body.as_ref().and_then(|b| b.get("quantity")) {
        None => 1,
        Some(value) => match value.as_u64().map(u32::try_from) {
            Some(Ok(quantity)) if quantity > 0 => quantity,
            _ => {
                return MockReply::status(
                    400,
                    json!({ "message": format!("invalid quantity: {}", value) }),
                )
            }
        },
    };

    let (title, image, unit_price) = {
        let products = fixtures
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match products.iter().find(|p| p.detail.product_id == product_id) {
            Some(p) => (p.detail.title.clone(), p.summary().main_image_url, p.detail.price),
            None => {
                let mut rng = rand::thread_rng();
                (
                    format!("{} {}", pick(&mut rng, &ADJECTIVES), pick(&mut rng, &NOUNS)),
                    image_url(&mut rng, 200, 200),
                    price(&mut rng, 50, 500),
                )
            }
        }
    };

    let order = OrderSummary {
        order_id: Uuid::new_v4().to_string(),
        status: OrderStatus::ToPay,
        product_id,
        product_title: title,
        product_main_image_url: image,
        price_at_purchase: Some(unit_price),
        quantity,
        total_price: round_cents(unit_price * f64::from(quantity)),
        created_at: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
    };
    let reply = MockReply::created(json!(order));

    fixtures
        .orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(0, order);
    reply
}

fn upload(req: &MockRequest) -> MockReply {
    if let Some(metadata) = req.form_fields.get("metadata") {
        if serde_json::from_str::<Value>(metadata).is_err() {
            return MockReply::status(400, json!({ "message": "metadata must be JSON" }));
        }
    }
    let mut rng = rand::thread_rng();
    MockReply::ok(json!({ "url": image_url(&mut rng, 800, 600) }))
}

fn list_notifications(fixtures: &Fixtures, req: &MockRequest) -> MockReply {
    let kind = req
        .query_param("type")
        .and_then(|t| t.parse::<NotificationKind>().ok());
    let page = req.query_u32("page", 0) as usize;
    let size = req.query_u32("size", 20).max(1) as usize;

    let mut matching: Vec<Notification> = fixtures
        .notifications
        .iter()
        .filter(|n| kind.map_or(true, |k| n.kind == k))
        .cloned()
        .collect();
    // Timestamps share one fixed-width format, so string order is time order
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let page = NotificationPage {
        total_pages: total_pages(matching.len(), size),
        total_elements: matching.len() as u64,
        items: matching.into_iter().skip(page * size).take(size).collect(),
    };
    MockReply::ok(json!(page))
}

fn total_pages(len: usize, size: usize) -> u32 {
    (len.div_ceil(size)).max(1) as u32
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn uuid_from<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

fn image_url<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> String {
    format!(
        "https://dummyimage.com/{}x{}/{:06x}/fff",
        width,
        height,
        rng.gen_range(0..=0xFF_FFFFu32)
    )
}

fn price<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> f64 {
    f64::from(rng.gen_range(min * 100..=max * 100)) / 100.0
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn past_timestamp<R: Rng + ?Sized>(rng: &mut R, max_days: i64) -> String {
    let minutes = rng.gen_range(0..=max_days * 24 * 60);
    (Utc::now() - Duration::minutes(minutes))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
