pub mod alignment;
pub mod scene;
pub mod session;
