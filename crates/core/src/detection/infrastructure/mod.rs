pub mod arcface_embedder;
pub mod model_resolver;
pub mod onnx_provider;
pub mod onnx_yolo_detector;
