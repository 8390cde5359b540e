use thiserror::Error;

use crate::asset::HeaderError;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("template `{0}` is not valid UTF-8")]
    NotText(String),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("template `{template}`: unclosed `{open}` at byte {offset}")]
    Unclosed {
        template: String,
        open: &'static str,
        offset: usize,
    },

    #[error("template `{template}`: empty expression at byte {offset}")]
    EmptyExpression { template: String, offset: usize },

    #[error("template `{template}`: unknown directive `{directive}`")]
    UnknownDirective { template: String, directive: String },

    #[error("unknown template `{0}`")]
    Missing(String),

    #[error("template cycle: {0}")]
    Cycle(String),

    #[error("templates nested more than {depth} levels deep at `{name}`")]
    TooDeep { name: String, depth: usize },
}
