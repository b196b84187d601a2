pub mod client_directory;

pub use client_directory::DirectoryError;
