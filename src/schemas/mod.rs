// Configuration types.

// Optional `config.yaml` contents.
pub mod settings;
// Runtime configuration passed to every component.
pub mod vm_config;
