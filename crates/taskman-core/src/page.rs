//! Paging contract between services and repositories

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, falling back to defaults and clamping the size
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
}

impl<T> Page<T> {
    /// Cut a page out of an already ordered collection
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len() as u64;
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size) as u32;
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .collect();

        Self {
            content,
            total_elements,
            total_pages,
            number: request.page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamp() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(PageRequest::new(Some(2), Some(0)).size, 1);
        assert_eq!(PageRequest::new(None, Some(10_000)).size, 100);
    }

    #[test]
    fn test_slice_middle_and_last_page() {
        let items: Vec<u32> = (0..25).collect();

        let page = Page::slice(items.clone(), PageRequest::new(Some(1), Some(10)));
        assert_eq!(page.content, (10..20).collect::<Vec<_>>());
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.number, 1);

        let last = Page::slice(items, PageRequest::new(Some(2), Some(10)));
        assert_eq!(last.content, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_slice_past_the_end_is_empty() {
        let page = Page::slice(vec![1, 2, 3], PageRequest::new(Some(5), Some(2)));
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 2);
    }
}
