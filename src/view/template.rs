//! Template syntax and compilation.
//!
//! ```text
//! ---
//! layout: base            # optional parent layout
//! ---
//! <article>
//!   <h1>{{ title }}</h1>  # page header value, then imported data
//!   {{ body }}            # content being wrapped
//!   {% include footer %}  # another registered template
//! </article>
//! ```

use crate::asset::Header;

use super::ViewError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Body,
    /// Dotted lookup key.
    Var(String),
    /// Template name of the include.
    Include(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    /// Parent layout from the template's own front matter.
    pub layout: Option<String>,
    pub segments: Vec<Segment>,
}

impl Template {
    /// Names of directly included templates.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Include(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Turns template source into a [`Template`].
pub trait Compile: Send + Sync {
    fn compile(&self, name: &str, source: &str, header: Option<&Header>)
    -> Result<Template, ViewError>;
}

/// The built-in `{{ }}` / `{% %}` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateParser;

impl Compile for TemplateParser {
    fn compile(
        &self,
        name: &str,
        source: &str,
        header: Option<&Header>,
    ) -> Result<Template, ViewError> {
        Ok(Template {
            name: name.to_string(),
            layout: header
                .and_then(|h| h.get_str("layout"))
                .map(template_name),
            segments: parse(name, source)?,
        })
    }
}

/// Registry name for a template reference: the file stem of the last
/// path segment (`_includes/nav.html` -> `nav`).
pub fn template_name(reference: &str) -> String {
    let file = reference.trim().rsplit('/').next().unwrap_or_default();
    match file.rfind('.') {
        Some(dot) if dot > 0 => file[..dot].to_string(),
        _ => file.to_string(),
    }
}

const DELIMITERS: [(&str, &str); 2] = [("{{", "}}"), ("{%", "%}")];

pub fn parse(name: &str, source: &str) -> Result<Vec<Segment>, ViewError> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    loop {
        let next = DELIMITERS
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|at| (at, open, close)))
            .min_by_key(|&(at, ..)| at);
        let Some((start, open, close)) = next else {
            break;
        };

        if start > 0 {
            segments.push(Segment::Text(rest[..start].to_string()));
        }

        let inner_start = start + open.len();
        let Some(len) = rest[inner_start..].find(close) else {
            return Err(ViewError::Unclosed {
                template: name.to_string(),
                open,
                offset: offset + start,
            });
        };
        let inner = rest[inner_start..inner_start + len].trim();

        let segment = if open == "{{" {
            expression(name, inner, offset + start)?
        } else {
            directive(name, inner)?
        };
        segments.push(segment);

        let consumed = inner_start + len + close.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }
    Ok(segments)
}

fn expression(name: &str, inner: &str, offset: usize) -> Result<Segment, ViewError> {
    match inner {
        "" => Err(ViewError::EmptyExpression {
            template: name.to_string(),
            offset,
        }),
        "body" => Ok(Segment::Body),
        key => Ok(Segment::Var(key.to_string())),
    }
}

fn directive(name: &str, inner: &str) -> Result<Segment, ViewError> {
    let mut words = inner.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("include"), Some(target), None) => Ok(Segment::Include(template_name(
            target.trim_matches(['"', '\'']),
        ))),
        _ => Err(ViewError::UnknownDirective {
            template: name.to_string(),
            directive: inner.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let segments = parse("t", "<h1>{{ title }}</h1>{{body}}{% include \"nav.html\" %}!").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Text("<h1>".into()),
                Segment::Var("title".into()),
                Segment::Text("</h1>".into()),
                Segment::Body,
                Segment::Include("nav".into()),
                Segment::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse("t", "plain").unwrap(), vec![Segment::Text("plain".into())]);
        assert!(parse("t", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("t", "ab{{ title"),
            Err(ViewError::Unclosed { offset: 2, open: "{{", .. })
        ));
        assert!(matches!(parse("t", "{{ }}"), Err(ViewError::EmptyExpression { .. })));
        assert!(matches!(
            parse("t", "{% for x in y %}"),
            Err(ViewError::UnknownDirective { .. })
        ));
    }

    #[test]
    fn test_template_name() {
        assert_eq!(template_name("_includes/nav.html"), "nav");
        assert_eq!(template_name("base"), "base");
        assert_eq!(template_name(" post.html "), "post");
    }

    #[test]
    fn test_compile_reads_layout() {
        let header = Header::parse("layout: _layouts/base.html").unwrap();
        let template = TemplateParser
            .compile("post", "{{ body }}{% include footer %}", Some(&header))
            .unwrap();
        assert_eq!(template.layout.as_deref(), Some("base"));
        assert_eq!(template.includes().collect::<Vec<_>>(), vec!["footer"]);
    }
}
