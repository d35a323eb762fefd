//! Live adapters talking to a real lab server and the real disk.

pub mod client;
pub mod filesystem;
pub mod networks;
pub mod nodes;
pub mod topology;

pub use client::EveClient;
pub use filesystem::LiveFileSystem;
