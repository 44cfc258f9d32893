//! Orders page: the live order table plus the paid and delivered views.
//!
//! The paid and delivered pages in the dashboard are the same table with a
//! pinned server-side filter, so they share this controller. Row mutations
//! are a status change and a delete; both refetch on success.

use chrono::NaiveDate;

use crate::collab::{CollectionSource, EntityUpdate, NotificationSink, RowDelete};
use crate::models::{Order, OrderStatus, PaymentStatus};
use crate::query::ListQuery;

pub const ORDERS_PATH: &str = "/api/admin/orders";

pub struct OrdersPage<S, U, D, N> {
    source: S,
    status: U,
    rows: D,
    notify: N,
    pub query: ListQuery,
    items: Vec<Order>,
    total: u64,
    pages: u32,
}

impl<S, U, D, N> OrdersPage<S, U, D, N>
where
    S: CollectionSource<Order>,
    U: EntityUpdate<OrderStatus>,
    D: RowDelete,
    N: NotificationSink,
{
    pub fn new(source: S, status: U, rows: D, notify: N) -> Self {
        Self {
            source,
            status,
            rows,
            notify,
            query: ListQuery::default(),
            items: Vec::new(),
            total: 0,
            pages: 0,
        }
    }

    /// The paid-orders view: same table, `payment_status=paid` pinned.
    pub fn paid_view(source: S, status: U, rows: D, notify: N) -> Self {
        let mut page = Self::new(source, status, rows, notify);
        page.query.set_filter("payment_status", PaymentStatus::Paid.as_str());
        page
    }

    /// The delivered-orders view: same table, `status=delivered` pinned.
    pub fn delivered_view(source: S, status: U, rows: D, notify: N) -> Self {
        let mut page = Self::new(source, status, rows, notify);
        page.query.set_filter("status", OrderStatus::Delivered.as_str());
        page
    }

    async fn reload(&mut self) -> Result<(), String> {
        let page = self.source.fetch(&self.query).await?;
        self.total = page.total;
        self.pages = page.pages;
        self.items = page.items;
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<(), String> {
        if let Err(error) = self.reload().await {
            self.notify.error(&error);
            return Err(error);
        }
        Ok(())
    }

    pub fn items(&self) -> &[Order] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_count(&self) -> u32 {
        self.pages
    }

    pub async fn set_page(&mut self, page: u32) -> Result<(), String> {
        self.query.set_page(page);
        self.refresh().await
    }

    pub async fn set_search(&mut self, term: &str) -> Result<(), String> {
        self.query.set_search(term);
        self.refresh().await
    }

    pub async fn set_status_filter(&mut self, status: Option<OrderStatus>) -> Result<(), String> {
        self.query
            .set_filter("status", status.map(|s| s.as_str()).unwrap_or(""));
        self.refresh().await
    }

    pub async fn set_payment_filter(
        &mut self,
        payment: Option<PaymentStatus>,
    ) -> Result<(), String> {
        self.query
            .set_filter("payment_status", payment.map(|p| p.as_str()).unwrap_or(""));
        self.refresh().await
    }

    /// Date-range filter from the panel's two date pickers. `None` clears
    /// that end of the range.
    pub async fn set_date_range(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(), String> {
        self.query.set_filter(
            "from",
            &from.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        );
        self.query.set_filter(
            "to",
            &to.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        );
        self.refresh().await
    }

    pub async fn clear_filters(&mut self) -> Result<(), String> {
        self.query.clear_filters();
        self.refresh().await
    }

    /// Move one order to a new status. One toast either way; a refetch only
    /// on success so a failed change leaves the table as the operator saw it.
    pub async fn update_status(&mut self, id: &str, status: OrderStatus) -> Result<(), String> {
        if let Err(error) = self.status.update(id, status).await {
            self.notify.error(&error);
            return Err(error);
        }
        self.notify
            .success(&format!("Order moved to {status}"));
        self.refresh().await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        if let Err(error) = self.rows.delete(id).await {
            self.notify.error(&error);
            return Err(error);
        }
        self.notify.success("Order deleted");
        self.refresh().await
    }
}
