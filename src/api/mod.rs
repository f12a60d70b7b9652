mod client;
mod result;

pub use client::{validate_amount, validate_new, validate_patch, ApiClient, RequestOptions};
pub use result::{ApiResult, Body};
