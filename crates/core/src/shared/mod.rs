pub mod constants;
pub mod face_box;
pub mod frame;
pub mod paths;
pub mod video_metadata;
