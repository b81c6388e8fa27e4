pub mod comparator;
pub mod data_read;
pub mod dump;
pub mod eps_backend;
pub mod errors;
pub mod markers;
pub mod plot_config;
pub mod run_data;
pub mod sci_format;
pub mod slice_files;
pub mod type_lib;
