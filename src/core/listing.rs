use crate::domain::model::{PageMeta, Post};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 50;

/// Keeps posts whose title contains `query`, ignoring case. A blank query keeps everything.
pub fn filter_by_title(posts: Vec<Post>, query: &str) -> Vec<Post> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return posts;
    }

    posts
        .into_iter()
        .filter(|post| post.title.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Lenient query-string parsing: unparseable values fall back to the defaults.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_LIMIT as i64)
            .clamp(1, MAX_PAGE_LIMIT as i64);

        Self::new(page as usize, limit as usize)
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Slices one page out of `posts`; `total` in the meta is the unsliced length.
pub fn paginate(posts: Vec<Post>, request: PageRequest) -> (Vec<Post>, PageMeta) {
    let total = posts.len();
    let page = posts
        .into_iter()
        .skip(request.offset())
        .take(request.limit)
        .collect();

    let meta = PageMeta {
        page: request.page,
        limit: request.limit,
        total,
    };
    (page, meta)
}
