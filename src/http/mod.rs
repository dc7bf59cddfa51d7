//! Static file serving for the arcade hub page and the game directory

pub mod response;
pub mod server;
pub mod static_files;
