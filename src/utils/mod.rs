pub mod banner;
pub mod network;
