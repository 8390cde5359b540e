//! Imported YAML data exposed to templates as globals.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::asset::Header;
use crate::log;

/// Load each YAML file under its file stem (`_data/site.yml` -> `site`).
///
/// Unreadable or malformed files are logged and skipped; later files with
/// the same stem replace earlier ones.
pub fn load_imports<P: AsRef<Path>>(paths: &[P]) -> Header {
    let mut globals = Mapping::new();
    for path in paths {
        let path = path.as_ref();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match read_yaml(path) {
            Ok(value) => {
                globals.insert(Value::String(stem.to_string()), value);
            }
            Err(err) => log!("import"; "{}: {}", path.display(), err),
        }
    }
    Header::from_mapping(globals)
}

fn read_yaml(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}
