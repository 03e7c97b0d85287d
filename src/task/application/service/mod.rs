pub mod record_stream;
pub mod result_aggregator;
pub mod task_poller;
