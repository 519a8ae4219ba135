// Adapters layer: concrete implementations of the domain ports.

pub mod counting;
pub mod http;

pub use counting::CountingSource;
pub use http::JsonPlaceholderClient;
