//! Customers page: lookup table with the ban/unban row mutation.

use crate::collab::{CollectionSource, EntityUpdate, NotificationSink};
use crate::models::Customer;
use crate::query::ListQuery;

pub const CUSTOMERS_PATH: &str = "/api/admin/customers";

pub struct CustomersPage<S, U, N> {
    source: S,
    ban: U,
    notify: N,
    pub query: ListQuery,
    items: Vec<Customer>,
    total: u64,
    pages: u32,
}

impl<S, U, N> CustomersPage<S, U, N>
where
    S: CollectionSource<Customer>,
    U: EntityUpdate<bool>,
    N: NotificationSink,
{
    pub fn new(source: S, ban: U, notify: N) -> Self {
        Self {
            source,
            ban,
            notify,
            query: ListQuery::default(),
            items: Vec::new(),
            total: 0,
            pages: 0,
        }
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

    pub fn items(&self) -> &[Customer] {
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

    /// Ban or unban one customer, then refetch so the row reflects the
    /// backend's view.
    pub async fn set_banned(&mut self, id: &str, banned: bool) -> Result<(), String> {
        if let Err(error) = self.ban.update(id, banned).await {
            self.notify.error(&error);
            return Err(error);
        }
        self.notify.success(if banned {
            "Customer banned"
        } else {
            "Customer unbanned"
        });
        self.refresh().await
    }
}
