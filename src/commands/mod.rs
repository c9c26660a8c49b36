// Application subcommands, one module per `tfvm` action.

// Prints the active version.
pub mod current;
// Runs the verified install pipeline.
pub mod install;
// Lists installed versions.
pub mod list;
// Removes an installed version.
pub mod uninstall;
// Switches the active version.
pub mod use_version;
