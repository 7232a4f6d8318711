pub mod compile;
pub mod config;
pub mod datamodel;
pub mod element;
pub mod error;
pub mod graph;
pub mod heal;
pub mod parse;
pub mod registry;
pub mod transform;
pub mod validate;
pub mod wasm;

pub use compile::{Compilation, compile, compile_json};
pub use config::CompileOptions;
