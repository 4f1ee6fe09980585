pub mod api;
pub mod session;
pub mod static_files;
