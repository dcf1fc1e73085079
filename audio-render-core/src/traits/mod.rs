pub mod backend;
pub mod period_signal;
pub mod stream_client;
