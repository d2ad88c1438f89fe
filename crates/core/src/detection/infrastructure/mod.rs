pub mod connected_component_extractor;
pub mod execution_provider;
pub mod extractor_factory;
pub mod grid_scan_extractor;
pub mod model_resolver;
pub mod onnx_heatmap_detector;
