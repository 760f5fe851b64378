pub mod response;
pub mod session;

pub use response::{ApiResponse, ApiResult, Envelope};
