use serde::Serialize;
use utoipa::ToSchema;

/// Page number and size after clamping to an endpoint's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// `page` is at least 1; `limit` falls back to `default_limit` and is held within `1..=max_limit`.
    pub fn clamp(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit.max(1)),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total_items: i64) -> PageMeta {
        PageMeta::new(*self, total_items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub start_item: i64,
    pub end_item: i64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let total_pages = (total_items + request.limit - 1) / request.limit;
        let offset = request.offset();

        let (start_item, end_item) = if offset >= total_items {
            (0, 0)
        } else {
            (offset + 1, (offset + request.limit).min(total_items))
        };

        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.limit,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
            start_item,
            end_item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_limit() {
        assert_eq!(
            PageRequest::clamp(Some(0), Some(500), 10, 50),
            PageRequest { page: 1, limit: 50 }
        );
        assert_eq!(
            PageRequest::clamp(Some(-3), Some(0), 10, 50),
            PageRequest { page: 1, limit: 1 }
        );
        assert_eq!(
            PageRequest::clamp(None, None, 20, 100),
            PageRequest { page: 1, limit: 20 }
        );
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(PageRequest::clamp(Some(3), Some(10), 10, 50).offset(), 20);
    }

    #[test]
    fn meta_for_a_middle_page() {
        let meta = PageRequest { page: 2, limit: 10 }.meta(35);
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);
        assert_eq!((meta.start_item, meta.end_item), (11, 20));
    }

    #[test]
    fn meta_for_the_last_partial_page() {
        let meta = PageRequest { page: 4, limit: 10 }.meta(35);
        assert!(!meta.has_next_page);
        assert_eq!((meta.start_item, meta.end_item), (31, 35));
    }

    #[test]
    fn meta_for_an_empty_result() {
        let meta = PageRequest { page: 1, limit: 10 }.meta(0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
        assert_eq!((meta.start_item, meta.end_item), (0, 0));
    }

    #[test]
    fn meta_serializes_camel_case() {
        let json = serde_json::to_value(PageRequest { page: 1, limit: 5 }.meta(7)).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["itemsPerPage"], 5);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["endItem"], 5);
    }
}
