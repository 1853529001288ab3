//! Wire types exchanged with the shop backend.
//!
//! Field names follow the backend's camelCase JSON. Identifiers are opaque
//! strings throughout, including `categoryId`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Users and Authentication
// ============================================================================

/// Public view of a user, embedded in products and reviews
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub nickname: String,
    pub avatar_url: String,
}

/// The signed-in user's own profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub nickname: String,
    pub avatar_url: String,
    #[serde(default)]
    pub join_date: Option<String>,
}

impl UserProfile {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.user_id.clone(),
            nickname: self.nickname.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub product_id: String,
}

// ============================================================================
// Addresses
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_id: String,
    pub receiver_name: String,
    pub phone_number: String,
    pub address: String,
    pub is_default: bool,
}

/// Body for both creating and replacing an address
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub receiver_name: String,
    pub phone_number: String,
    pub address: String,
    pub is_default: bool,
}

// ============================================================================
// Products, Categories and Reviews
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product_id: String,
    pub title: String,
    pub price: f64,
    pub main_image_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub stock: u32,
    pub seller_info: UserSummary,
    #[serde(default)]
    pub is_favorite: bool,
    pub posted_at: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// One page of `GET /products`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<ProductSummary>,
    pub total_pages: u32,
    pub total_elements: u64,
}

/// Query parameters of `GET /products`; pages start at 1
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// Body for `POST /products` and `PUT /products/{id}`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub category_id: String,
    pub image_urls: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    pub name: String,
    pub icon_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: String,
    pub author: UserSummary,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub items: Vec<Review>,
    pub total_pages: u32,
    pub total_elements: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub content: String,
    pub rating: u8,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

// ============================================================================
// Orders
// ============================================================================

/// Order lifecycle state
///
/// Older backends spell the states in PascalCase; those spellings are
/// accepted on input and always written back in the canonical form.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    #[serde(rename = "TO_PAY", alias = "ToPay")]
    ToPay,
    #[serde(rename = "TO_SHIP", alias = "ToShip")]
    ToShip,
    #[serde(rename = "TO_RECEIVE", alias = "ToReceive")]
    ToReceive,
    #[serde(rename = "COMPLETED", alias = "Completed")]
    Completed,
    #[serde(rename = "CANCELED", alias = "Canceled", alias = "CANCELLED")]
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::ToPay,
        OrderStatus::ToShip,
        OrderStatus::ToReceive,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    /// Canonical wire spelling
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::ToPay => "TO_PAY",
            OrderStatus::ToShip => "TO_SHIP",
            OrderStatus::ToReceive => "TO_RECEIVE",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::ToPay => "Awaiting payment",
            OrderStatus::ToShip => "Awaiting shipment",
            OrderStatus::ToReceive => "Awaiting receipt",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
        }
    }

    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "TO_PAY" | "ToPay" => Ok(OrderStatus::ToPay),
            "TO_SHIP" | "ToShip" => Ok(OrderStatus::ToShip),
            "TO_RECEIVE" | "ToReceive" => Ok(OrderStatus::ToReceive),
            "COMPLETED" | "Completed" => Ok(OrderStatus::Completed),
            "CANCELED" | "Canceled" | "CANCELLED" => Ok(OrderStatus::Canceled),
            other => Err(Error::Other(format!("Unknown order status: {}", other))),
        }
    }
}

/// One row of `GET /orders`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: String,
    pub status: OrderStatus,
    pub product_id: String,
    pub product_title: String,
    pub product_main_image_url: String,
    #[serde(default)]
    pub price_at_purchase: Option<f64>,
    pub quantity: u32,
    pub total_price: f64,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub items: Vec<OrderSummary>,
    pub total_pages: u32,
    pub total_elements: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// Full order as returned by `GET /orders/{id}`
///
/// Address fields are snapshots taken when the order was placed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub price_at_purchase: f64,
    pub quantity: u32,
    pub total_price: f64,
    pub receiver_name_snapshot: String,
    pub phone_number_snapshot: String,
    pub shipping_address_snapshot: String,
    pub product_id: String,
    pub product_title: String,
    pub product_main_image_url: String,
    pub user_id: String,
    pub seller_id: String,
    pub created_at: String,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub shipped_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub canceled_at: Option<String>,
    pub updated_at: String,
}

/// Body for `POST /orders`; the backend snapshots the address
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    System,
    Transaction,
}

impl FromStr for NotificationKind {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "system" => Ok(NotificationKind::System),
            "transaction" => Ok(NotificationKind::Transaction),
            other => Err(Error::Other(format!("Unknown notification type: {}", other))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub is_read: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub total_pages: u32,
    pub total_elements: u64,
}

/// Query parameters of `GET /notifications`; pages start at 0
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NotificationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNotificationsRequest {
    pub notification_ids: Vec<String>,
}

// ============================================================================
// Files
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_order_status_normalized() {
        for (raw, expected) in [
            ("ToPay", OrderStatus::ToPay),
            ("TO_SHIP", OrderStatus::ToShip),
            ("ToReceive", OrderStatus::ToReceive),
            ("Completed", OrderStatus::Completed),
            ("CANCELLED", OrderStatus::Canceled),
        ] {
            let parsed: OrderStatus = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(parsed, expected, "wire value {}", raw);
            assert_eq!(raw.parse::<OrderStatus>().unwrap(), expected);
        }

        // Always written back canonically
        assert_eq!(
            serde_json::to_value(OrderStatus::Canceled).unwrap(),
            json!("CANCELED")
        );
    }

    #[test]
    fn test_unknown_order_status_rejected() {
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert!(serde_json::from_value::<OrderStatus>(json!("SHIPPED")).is_err());
    }

    #[test]
    fn test_final_states() {
        let finals: Vec<_> = OrderStatus::ALL.iter().filter(|s| s.is_final()).collect();
        assert_eq!(finals, vec![&OrderStatus::Completed, &OrderStatus::Canceled]);
    }

    #[test]
    fn test_order_summary_from_backend_json() {
        let body = json!({
            "orderId": "o1",
            "status": "ToShip",
            "productId": "p1",
            "productTitle": "Desk lamp",
            "productMainImageUrl": "https://img/1.png",
            "priceAtPurchase": null,
            "quantity": 2,
            "totalPrice": 59.8,
            "createdAt": "2025-05-01 10:00:00"
        });
        let order: OrderSummary = serde_json::from_value(body).unwrap();
        assert_eq!(order.status, OrderStatus::ToShip);
        assert_eq!(order.price_at_purchase, None);
        assert_eq!(order.quantity, 2);
    }

    #[test]
    fn test_create_order_omits_absent_fields() {
        let request = CreateOrderRequest {
            product_id: "p1".into(),
            quantity: 2,
            address_id: None,
            phone_number: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"productId": "p1", "quantity": 2})
        );
    }

    #[test]
    fn test_notification_type_field() {
        let body = json!({
            "notificationId": "n1",
            "type": "transaction",
            "title": "Order shipped",
            "content": "Your order is on its way",
            "createdAt": "2025-05-01 10:00:00",
            "isRead": false
        });
        let notification: Notification = serde_json::from_value(body).unwrap();
        assert_eq!(notification.kind, NotificationKind::Transaction);
        assert!(notification.updated_at.is_none());
    }
}
