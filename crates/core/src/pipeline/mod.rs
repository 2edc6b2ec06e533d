pub mod batch_use_case;
pub mod debug_report;
pub mod deidentify_image_use_case;
pub mod deidentify_video_use_case;
pub mod error;
pub mod infrastructure;
pub mod pipeline_logger;
