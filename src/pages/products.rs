//! Products page: the catalog table.
//!
//! Paginated list with search and category/availability filters, plus the
//! two row mutations the table offers: toggling availability and deleting
//! a product. Every acknowledged mutation refetches the page so the table
//! matches the backend.

use crate::collab::{CollectionSource, EntityUpdate, NotificationSink, RowDelete};
use crate::models::Product;
use crate::query::ListQuery;

pub const PRODUCTS_PATH: &str = "/api/admin/products";

pub struct ProductsPage<S, U, D, N> {
    source: S,
    availability: U,
    rows: D,
    notify: N,
    pub query: ListQuery,
    items: Vec<Product>,
    total: u64,
    pages: u32,
}

impl<S, U, D, N> ProductsPage<S, U, D, N>
where
    S: CollectionSource<Product>,
    U: EntityUpdate<bool>,
    D: RowDelete,
    N: NotificationSink,
{
    pub fn new(source: S, availability: U, rows: D, notify: N) -> Self {
        Self {
            source,
            availability,
            rows,
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

    pub fn items(&self) -> &[Product] {
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

    pub async fn set_category(&mut self, category: &str) -> Result<(), String> {
        self.query.set_filter("category", category);
        self.refresh().await
    }

    pub async fn set_availability_filter(&mut self, available: Option<bool>) -> Result<(), String> {
        match available {
            Some(value) => self.query.set_filter("is_available", if value { "true" } else { "false" }),
            None => self.query.set_filter("is_available", ""),
        }
        self.refresh().await
    }

    pub async fn clear_filters(&mut self) -> Result<(), String> {
        self.query.clear_filters();
        self.refresh().await
    }

    /// Toggle one product's availability. On failure the table is left
    /// untouched and the operator sees one error toast.
    pub async fn set_availability(&mut self, id: &str, available: bool) -> Result<(), String> {
        if let Err(error) = self.availability.update(id, available).await {
            self.notify.error(&error);
            return Err(error);
        }
        self.notify.success(if available {
            "Product marked available"
        } else {
            "Product marked unavailable"
        });
        self.refresh().await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        if let Err(error) = self.rows.delete(id).await {
            self.notify.error(&error);
            return Err(error);
        }
        self.notify.success("Product deleted");
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Page;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price: 8.9,
            category: Some("wraps".to_string()),
            is_available: true,
            image_url: None,
            created_at: None,
        }
    }

    #[derive(Clone, Default)]
    struct FakeSource {
        items: Arc<Mutex<Vec<Product>>>,
        fetches: Arc<AtomicUsize>,
        last_query: Arc<Mutex<Option<ListQuery>>>,
    }

    impl CollectionSource<Product> for FakeSource {
        async fn fetch(&self, query: &ListQuery) -> Result<Page<Product>, String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());
            let items = self.items.lock().unwrap().clone();
            Ok(Page {
                total: items.len() as u64,
                page: query.page,
                pages: 1,
                items,
            })
        }
    }

    #[derive(Clone, Default)]
    struct FakeFlag {
        calls: Arc<Mutex<Vec<(String, bool)>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl EntityUpdate<bool> for FakeFlag {
        async fn update(&self, id: &str, value: bool) -> Result<(), String> {
            if *self.fail.lock().unwrap() {
                return Err("Workstation not authorized".to_string());
            }
            self.calls.lock().unwrap().push((id.to_string(), value));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeDelete {
        deleted: Arc<Mutex<Vec<String>>>,
    }

    impl RowDelete for FakeDelete {
        async fn delete(&self, id: &str) -> Result<(), String> {
            self.deleted.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        successes: Arc<Mutex<Vec<String>>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl NotificationSink for RecordingSink {
        fn success(&self, message: &str) {
            self.successes.lock().unwrap().push(message.to_string());
        }
        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[tokio::test]
    async fn search_and_filters_reach_the_source() {
        let source = FakeSource::default();
        source
            .items
            .lock()
            .unwrap()
            .push(product("p1", "Gyros wrap"));
        let mut page = ProductsPage::new(
            source.clone(),
            FakeFlag::default(),
            FakeDelete::default(),
            RecordingSink::default(),
        );

        page.set_search("gyros").await.unwrap();
        page.set_availability_filter(Some(false)).await.unwrap();

        let query = source.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.search.as_deref(), Some("gyros"));
        assert_eq!(query.filter("is_available"), Some("false"));
        assert_eq!(query.page, 1);
        assert_eq!(page.items().len(), 1);
    }

    #[tokio::test]
    async fn availability_toggle_refetches_on_success() {
        let source = FakeSource::default();
        let flag = FakeFlag::default();
        let sink = RecordingSink::default();
        let mut page = ProductsPage::new(
            source.clone(),
            flag.clone(),
            FakeDelete::default(),
            sink.clone(),
        );

        page.set_availability("p1", false).await.unwrap();

        assert_eq!(
            flag.calls.lock().unwrap().clone(),
            vec![("p1".to_string(), false)]
        );
        assert_eq!(sink.successes.lock().unwrap().len(), 1);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn availability_toggle_failure_skips_the_refetch() {
        let source = FakeSource::default();
        let flag = FakeFlag::default();
        *flag.fail.lock().unwrap() = true;
        let sink = RecordingSink::default();
        let mut page = ProductsPage::new(
            source.clone(),
            flag,
            FakeDelete::default(),
            sink.clone(),
        );

        assert!(page.set_availability("p1", false).await.is_err());
        assert_eq!(sink.errors.lock().unwrap().len(), 1);
        assert!(sink.successes.lock().unwrap().is_empty());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_removes_and_refetches() {
        let source = FakeSource::default();
        let del = FakeDelete::default();
        let sink = RecordingSink::default();
        let mut page = ProductsPage::new(source.clone(), FakeFlag::default(), del.clone(), sink);

        page.delete("p9").await.unwrap();
        assert_eq!(del.deleted.lock().unwrap().clone(), vec!["p9".to_string()]);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }
}
