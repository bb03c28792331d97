pub mod min_size_detector;
pub mod model_resolver;
pub mod onnx_yolo_detector;
