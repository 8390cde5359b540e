//! Layout application stage.

use std::sync::Arc;

use anyhow::Result;

use crate::asset::Asset;
use crate::pipeline::Processor;
use crate::view::ViewEngine;
use crate::debug;

/// Wraps pages in the layout named by their `layout` header key.
///
/// Pages without front matter are dropped: only pages that declare a header
/// are published from Markdown. A header without `layout` leaves the
/// content as rendered.
pub struct Layout {
    views: Arc<ViewEngine>,
}

impl Layout {
    pub fn new(views: Arc<ViewEngine>) -> Self {
        Self { views }
    }
}

impl Processor for Layout {
    fn name(&self) -> &str {
        "layout"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        let Some(header) = asset.header() else {
            debug!("layout"; "{}: no front matter, not published", asset.relative_name());
            return Ok(None);
        };
        let Some(layout) = header.get_str("layout") else {
            return Ok(Some(asset.clone()));
        };

        let html = self.views.render_page(asset, layout)?;
        Ok(Some(asset.derive(html).into()))
    }
}
