//! Minification stage.
//!
//! Uses oxc for JavaScript and lightningcss for CSS; HTML gets a
//! whitespace/comment pass that leaves raw-text elements alone.

use anyhow::Result;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::asset::Asset;
use crate::debug;
use crate::pipeline::Processor;

/// Elements whose content is copied verbatim.
const RAW_ELEMENTS: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Minifies HTML, CSS and JS by extension; other assets pass through.
///
/// When a minifier rejects its input the original content is kept.
#[derive(Debug, Clone, Default)]
pub struct Minify;

impl Processor for Minify {
    fn name(&self) -> &str {
        "minify"
    }

    fn process(&self, asset: &Asset) -> Result<Option<Asset>> {
        let content = asset.content();
        let Some(text) = content.text() else {
            return Ok(Some(asset.clone()));
        };

        let minified = match asset.extension() {
            "html" | "htm" => Some(minify_html(text)),
            "css" => minify_css(text),
            "js" => minify_js(text),
            _ => return Ok(Some(asset.clone())),
        };

        match minified {
            Some(minified) => Ok(Some(asset.derive(minified).into())),
            None => {
                debug!("minify"; "{}: not minifiable, kept as is", asset.relative_name());
                Ok(Some(asset.clone()))
            }
        }
    }
}

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Collapse whitespace and strip comments from HTML.
///
/// Whitespace runs in text become one space; whitespace-only runs that
/// span a line break between tags are removed. Content of `pre`,
/// `textarea`, `script` and `style` is copied verbatim.
pub fn minify_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            match after.find("-->") {
                Some(end) => rest = &after[end + 3..],
                None => rest = "",
            }
            continue;
        }

        if rest.starts_with('<') {
            let end = match raw_element(rest) {
                Some(tag) => raw_element_end(rest, tag),
                None => rest.find('>').map_or(rest.len(), |i| i + 1),
            };
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let end = rest.find('<').unwrap_or(rest.len());
        push_collapsed(&mut out, &rest[..end]);
        rest = &rest[end..];
    }

    out.trim().to_string()
}

/// Raw-text element opened at the start of `html`, if any.
fn raw_element(html: &str) -> Option<&'static str> {
    let bytes = html.as_bytes();
    RAW_ELEMENTS.into_iter().find(|tag| {
        let n = tag.len();
        bytes.len() > n + 1
            && bytes[1..=n].eq_ignore_ascii_case(tag.as_bytes())
            && matches!(bytes[n + 1], b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r')
    })
}

/// Byte offset just past the closing tag of the raw element at the start
/// of `html`, or the end of input when it is never closed.
fn raw_element_end(html: &str, tag: &str) -> usize {
    let lower = html.to_ascii_lowercase();
    let close = format!("</{tag}");
    match lower.find(&close) {
        Some(start) => lower[start..]
            .find('>')
            .map_or(html.len(), |i| start + i + 1),
        None => html.len(),
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    if text.trim().is_empty() {
        if !text.is_empty() && !text.contains('\n') {
            out.push(' ');
        }
        return;
    }

    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
}
