pub mod adjacency;
pub mod grid;
pub mod lateral;
pub mod links;
pub mod location;
pub mod matcher;
pub mod records;
pub mod types;
