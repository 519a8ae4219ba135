pub mod aggregate;
pub mod listing;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{Comment, PageMeta, Post, PostWithComments};
pub use crate::domain::ports::{ConfigProvider, PostSource};
pub use crate::utils::error::Result;
pub use aggregate::{Aggregation, AggregationMode, CommentAggregator};
pub use listing::{filter_by_title, paginate, PageRequest};
