pub mod detection;
pub mod detector_provider;
pub mod face_detector;
