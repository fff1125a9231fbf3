pub mod backend_client;

pub use backend_client::{extract_created_id, BackendClient, RetryPolicy};
