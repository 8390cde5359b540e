//! Concrete pipeline stages.
//!
//! | Stage              | Effect                                              |
//! |--------------------|-----------------------------------------------------|
//! | `Translate`        | `$key` substitution, drops locale tables            |
//! | `FrontMatter`      | splits the YAML header off the body                 |
//! | `Markdown`         | renders Markdown to HTML                            |
//! | `RegisterTemplate` | hands templates to the view engine, always drops    |
//! | `Layout`           | wraps a page in its layout                          |
//! | `Minify`           | HTML/CSS/JS minification                            |
//! | `Copy`             | identity                                            |

mod copy;
mod front_matter;
mod layout;
mod markdown;
mod minify;
mod template;
mod translate;

pub use copy::Copy;
pub use front_matter::FrontMatter;
pub use layout::Layout;
pub use markdown::{Markdown, MarkdownOptions};
pub use minify::{Minify, minify_css, minify_html, minify_js};
pub use template::RegisterTemplate;
pub use translate::{TEXT_EXTENSIONS, Translate};
