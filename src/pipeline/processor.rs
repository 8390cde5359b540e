//! The processor contract and the per-stage failure boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::Result;

use super::Chain;
use crate::asset::Asset;
use crate::log;

/// One named transformation step.
///
/// `Ok(None)` drops the asset from the chain. `Err` is caught by the chain,
/// logged under the processor's name, and treated as a drop. A single
/// instance is shared by every worker, so implementations hold no per-asset
/// state.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, asset: &Asset) -> Result<Option<Asset>>;
}

impl<P: Processor + ?Sized> Processor for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        (**self).process(asset)
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        (**self).process(asset)
    }
}

/// Processor built from a closure, see [`processor`].
pub struct FnProcessor<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named processor.
///
/// ```ignore
/// let upper = processor("upper", |asset| {
///     let text = asset.content().text().unwrap_or_default().to_uppercase();
///     Ok(Some(asset.derive(text).into()))
/// });
/// ```
pub fn processor<F>(name: impl Into<String>, f: F) -> FnProcessor<F>
where
    F: Fn(&Asset) -> Result<Option<Asset>> + Send + Sync,
{
    FnProcessor {
        name: name.into(),
        f,
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: Fn(&Asset) -> Result<Option<Asset>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        (self.f)(asset)
    }
}

/// Composition available on every processor: `a.next(b).next(c)`.
pub trait ProcessorExt: Processor + Sized + 'static {
    /// Chain `stage` after `self`. The chain takes this processor's name.
    fn next(self, stage: impl Processor + 'static) -> Chain {
        let name = self.name().to_string();
        Chain::new(name).next(self).next(stage)
    }
}

impl<P: Processor + 'static> ProcessorExt for P {}

/// Result of running one asset through a stage or a whole chain.
#[derive(Debug, Clone)]
pub enum StageOutcome {
    Produced(Asset),
    Dropped,
    Failed,
}

impl StageOutcome {
    pub fn into_asset(self) -> Option<Asset> {
        match self {
            Self::Produced(asset) => Some(asset),
            Self::Dropped | Self::Failed => None,
        }
    }
}

/// Run `stage` on `asset` behind the failure boundary.
///
/// Errors are logged as `[<stage>] <relative name>: <error chain>`; panics
/// are caught and logged under `error`.
pub fn run_stage(stage: &dyn Processor, asset: &Asset) -> StageOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| stage.process(asset))) {
        Ok(Ok(Some(output))) => StageOutcome::Produced(output),
        Ok(Ok(None)) => StageOutcome::Dropped,
        Ok(Err(err)) => {
            log!(stage.name(); "{}: {:#}", asset.relative_name(), err);
            StageOutcome::Failed
        }
        Err(payload) => {
            log!(
                "error";
                "{} panicked on {}: {}",
                stage.name(),
                asset.relative_name(),
                panic_message(payload.as_ref())
            );
            StageOutcome::Failed
        }
    }
}

pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::OutputAsset;
    use anyhow::bail;

    fn asset(name: &str) -> Asset {
        OutputAsset::new("/site", name, "content").into()
    }

    #[test]
    fn test_closure_processor() {
        let upper = processor("upper", |asset: &Asset| {
            let text = asset.content().text().unwrap_or_default().to_uppercase();
            Ok(Some(asset.derive(text).into()))
        });

        assert_eq!(upper.name(), "upper");
        let out = upper.process(&asset("a.txt")).unwrap().unwrap();
        assert_eq!(out.content().text(), Some("CONTENT"));
    }

    #[test]
    fn test_run_stage_outcomes() {
        let keep = processor("keep", |a: &Asset| Ok(Some(a.clone())));
        let drop = processor("drop", |_: &Asset| Ok(None));
        let fail = processor("fail", |_: &Asset| bail!("broken input"));

        assert!(matches!(run_stage(&keep, &asset("a")), StageOutcome::Produced(_)));
        assert!(matches!(run_stage(&drop, &asset("a")), StageOutcome::Dropped));
        assert!(matches!(run_stage(&fail, &asset("a")), StageOutcome::Failed));
    }

    #[test]
    fn test_run_stage_catches_panics() {
        let boom = processor("boom", |_: &Asset| -> Result<Option<Asset>> {
            panic!("stage exploded")
        });
        assert!(matches!(run_stage(&boom, &asset("a")), StageOutcome::Failed));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
