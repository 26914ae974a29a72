pub mod error;
pub mod http;
pub mod traits;

pub use error::ApiError;
pub use http::HttpWantedApi;
pub use traits::WantedApi;
