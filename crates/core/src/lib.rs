pub mod blurring;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod tracking;
pub mod video;
