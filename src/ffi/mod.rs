#[cfg(feature = "libjxl")]
pub mod libjxl;
#[cfg(feature = "libjxl")]
pub mod libjxl_sys;
