//! Template registration stage.

use std::sync::Arc;

use anyhow::Result;

use crate::asset::Asset;
use crate::pipeline::Processor;
use crate::view::ViewEngine;

/// Registers layouts and includes with the view engine. Templates are never
/// exported, so this stage always ends the chain.
pub struct RegisterTemplate {
    views: Arc<ViewEngine>,
}

impl RegisterTemplate {
    pub fn new(views: Arc<ViewEngine>) -> Self {
        Self { views }
    }
}

impl Processor for RegisterTemplate {
    fn name(&self) -> &str {
        "register_template"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        self.views.register(asset)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::OutputAsset;

    #[test]
    fn test_registers_and_drops() {
        let views = Arc::new(ViewEngine::new());
        let stage = RegisterTemplate::new(Arc::clone(&views));
        let asset: Asset = OutputAsset::new("/site", "_layouts/base.html", "<main>{{ body }}</main>").into();

        assert!(stage.process(&asset).unwrap().is_none());
        assert!(views.get("base").is_some());
    }
}
