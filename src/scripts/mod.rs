pub mod sod_final;
