pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    ClientError, NdjsonLines, RpcClient, base_url, handle_list, handle_start, handle_status,
    handle_stop, parse_url_arg,
};
