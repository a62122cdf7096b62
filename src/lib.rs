pub mod config;
pub mod console;
pub mod error;
pub mod persona;
pub mod responder;
