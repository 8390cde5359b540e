//! Configuration section definitions.
//!
//! | Module  | TOML Section | Purpose                                     |
//! |---------|--------------|---------------------------------------------|
//! | `build` | `[build]`    | Destination, selectors, languages, workers  |
//! | `serve` | `[serve]`    | Development server                          |

mod build;
mod serve;

pub use build::BuildConfig;
pub use serve::ServeConfig;
