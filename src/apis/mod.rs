pub mod application_segment;
pub mod common;
pub mod provider_config;
pub mod segment_group;
