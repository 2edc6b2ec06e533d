pub mod detector_pool;
pub mod media_processor;
