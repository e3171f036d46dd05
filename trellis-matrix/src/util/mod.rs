pub mod double_bucket_queue;
