//! Configuration of the aspect kernel
//!
//! Options are plain serde data, usually read from a JSON file:
//!
//! ```json
//! {
//!   "debug": false,
//!   "features": ["intercept_functions"],
//!   "include": ["App\\**"],
//!   "exclude": ["App\\Generated\\**"],
//!   "pointcuts": { "App->services": "within(App\\Service\\**)" }
//! }
//! ```

pub mod options;

pub use options::{ClassFilter, Feature, KernelOptions};
