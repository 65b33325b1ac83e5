pub mod error;
pub mod image;
pub mod navigation;
pub mod params;
pub mod prompt;
pub mod requester;
pub mod session;
pub mod tools;
pub mod viewport;
