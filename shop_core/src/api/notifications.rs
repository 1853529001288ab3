use super::segment;
use crate::gateway::Gateway;
use crate::request::RequestDescriptor;
use crate::{DeleteNotificationsRequest, NotificationPage, NotificationQuery, Result};

/// Page size used when counting unread notifications
const UNREAD_SCAN_SIZE: u32 = 50;

pub struct NotificationsApi<'a> {
    gateway: &'a Gateway,
}

impl<'a> NotificationsApi<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &NotificationQuery) -> Result<NotificationPage> {
        let descriptor = RequestDescriptor::get("/notifications")
            .authenticated()
            .query(query)?;
        self.gateway.fetch(descriptor).await
    }

    /// Unread notifications among the most recent page
    ///
    /// Only the first page is scanned, so the count saturates at the page size.
    pub async fn unread_count(&self) -> Result<usize> {
        let query = NotificationQuery {
            kind: None,
            page: Some(0),
            size: Some(UNREAD_SCAN_SIZE),
        };
        let page = self.list(&query).await?;
        Ok(page.items.iter().filter(|n| !n.is_read).count())
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        let path = format!("/notifications/{}/read", segment(notification_id)?);
        self.gateway
            .execute(RequestDescriptor::post(path).authenticated())
            .await
    }

    pub async fn delete(&self, notification_id: &str) -> Result<()> {
        let path = format!("/notifications/{}", segment(notification_id)?);
        self.gateway
            .execute(RequestDescriptor::delete(path).authenticated())
            .await
    }

    pub async fn delete_batch(&self, notification_ids: &[String]) -> Result<()> {
        let descriptor = RequestDescriptor::post("/notifications/delete-batch")
            .authenticated()
            .json(&DeleteNotificationsRequest {
                notification_ids: notification_ids.to_vec(),
            })?;
        self.gateway.execute(descriptor).await
    }
}
