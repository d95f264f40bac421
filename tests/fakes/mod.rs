pub mod recording_backend;
pub mod scripted_sink;
