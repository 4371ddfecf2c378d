pub mod alpha_mask;
pub mod background_sampler;
pub mod color_model;
pub mod decode;
pub mod edge_guard;
pub mod inter_area;
pub mod mask_refiner;
pub mod options;
pub mod region_grower;
pub mod segmenter;
