// Command handlers module
pub mod config;
pub mod monitor;
pub mod topology;

// Re-exports for cleaner imports
pub use config::handle_config;
pub use monitor::execute as monitor;
pub use topology::execute as topology;
