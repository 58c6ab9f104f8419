pub mod exercises;
pub mod init;
pub mod maintenance;
pub mod misc;
pub mod sessions;
pub mod sets;
pub mod workouts;
