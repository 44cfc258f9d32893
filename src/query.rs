//! Server-side list query parameters for the dashboard table pages.
//!
//! Every table page sends the same shape: `page`, `limit`, an optional
//! `search` term, and a set of filter pairs from the page's filter panel
//! (status, payment status, category, date range).

/// Query state owned by one table page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            filters: Vec::new(),
        }
    }
}

fn enc(s: &str) -> String {
    s.replace('%', "%25")
        .replace('&', "%26")
        .replace('=', "%3D")
        .replace(' ', "%20")
        .replace('+', "%2B")
        .replace('?', "%3F")
        .replace('#', "%23")
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Update the search term and jump back to the first page, the way the
    /// dashboard tables behave when the search box changes.
    pub fn set_search(&mut self, term: &str) {
        let trimmed = term.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.page = 1;
    }

    /// Set or replace one filter pair. Empty values remove the filter.
    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.filters.retain(|(k, _)| k != key);
        if !value.trim().is_empty() {
            self.filters.push((key.to_string(), value.trim().to_string()));
        }
        self.page = 1;
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Drop every filter (the panel's Clear button). Search and page size
    /// are left alone.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    /// Render as a query string, without a leading `?`. Pagination always
    /// appears; empty parameters are omitted.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref() {
            pairs.push(("search".to_string(), search.to_string()));
        }
        for (k, v) in &self.filters {
            pairs.push((k.clone(), v.clone()));
        }
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", enc(k), enc(v)))
            .collect::<Vec<String>>()
            .join("&")
    }

    /// Append the query string to an endpoint path.
    pub fn to_path(&self, base: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }
}
