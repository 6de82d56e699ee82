pub mod filtered_listener;
pub mod frame_owner;
pub mod frame_source;
