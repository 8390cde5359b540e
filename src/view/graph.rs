//! Include resolution.
//!
//! Includes form a graph `template -> included templates`. Before a template
//! is rendered its includes are inlined depth-first; a name that reappears on
//! the current path is a cycle.

use super::{Segment, Template, ViewError, ViewHandle};

/// Maximum include (and layout) nesting depth.
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// Inline all includes reachable from `root`.
///
/// The result contains no [`Segment::Include`].
pub(super) fn resolve<F>(root: &Template, lookup: F) -> Result<Vec<Segment>, ViewError>
where
    F: Fn(&str) -> Option<ViewHandle>,
{
    let mut out = Vec::with_capacity(root.segments.len());
    let mut path = vec![root.name.clone()];
    inline(root, &lookup, &mut path, &mut out)?;
    Ok(out)
}

/// Transitive include names of `root`, dependencies before dependents.
pub(super) fn dependencies<F>(root: &Template, lookup: F) -> Result<Vec<String>, ViewError>
where
    F: Fn(&str) -> Option<ViewHandle>,
{
    let mut order = Vec::new();
    let mut path = vec![root.name.clone()];
    visit(root, &lookup, &mut path, &mut order)?;
    Ok(order)
}

fn inline<F>(
    template: &Template,
    lookup: &F,
    path: &mut Vec<String>,
    out: &mut Vec<Segment>,
) -> Result<(), ViewError>
where
    F: Fn(&str) -> Option<ViewHandle>,
{
    for segment in &template.segments {
        let Segment::Include(name) = segment else {
            out.push(segment.clone());
            continue;
        };
        let included = enter(name, lookup, path)?;
        inline(&included, lookup, path, out)?;
        path.pop();
    }
    Ok(())
}

fn visit<F>(
    template: &Template,
    lookup: &F,
    path: &mut Vec<String>,
    order: &mut Vec<String>,
) -> Result<(), ViewError>
where
    F: Fn(&str) -> Option<ViewHandle>,
{
    for name in template.includes() {
        let included = enter(name, lookup, path)?;
        visit(&included, lookup, path, order)?;
        path.pop();
        if !order.iter().any(|seen| seen == name) {
            order.push(name.to_string());
        }
    }
    Ok(())
}

/// Push `name` onto the include path after the cycle and depth checks.
fn enter<F>(name: &str, lookup: &F, path: &mut Vec<String>) -> Result<ViewHandle, ViewError>
where
    F: Fn(&str) -> Option<ViewHandle>,
{
    if path.iter().any(|seen| seen == name) {
        return Err(ViewError::Cycle(describe_cycle(path, name)));
    }
    if path.len() > MAX_INCLUDE_DEPTH {
        return Err(ViewError::TooDeep {
            name: name.to_string(),
            depth: MAX_INCLUDE_DEPTH,
        });
    }
    let included = lookup(name).ok_or_else(|| ViewError::Missing(name.to_string()))?;
    path.push(name.to_string());
    Ok(included)
}

/// `a -> b -> a`, starting at the first occurrence of `name`.
pub(super) fn describe_cycle(path: &[String], name: &str) -> String {
    let start = path.iter().position(|seen| seen == name).unwrap_or(0);
    let mut parts: Vec<&str> = path[start..].iter().map(String::as_str).collect();
    parts.push(name);
    parts.join(" -> ")
}
