pub mod azure_queue;
pub mod blob_output;
pub mod log_sink;
pub mod queue_sender;
