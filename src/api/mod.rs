pub mod attendance;
pub mod envelope;
