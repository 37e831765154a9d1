use miette::{Diagnostic, SourceSpan};
use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
};

#[derive(Debug, Diagnostic)]
pub enum TypeaheadError {
    #[diagnostic(code(typeahead::terminal), url(docsrs))]
    Terminal {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(typeahead::event), url(docsrs))]
    Event {
        #[source_code]
        src: String,
        #[label("event error occurred here")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(typeahead::channel), url(docsrs))]
    ChannelClosed {
        #[source_code]
        src: String,
        #[label("channel closed")]
        err_span: SourceSpan,
    },

    #[diagnostic(
        code(typeahead::config),
        url(docsrs),
        help("check the theme and widget configuration values")
    )]
    Config {
        #[source_code]
        src: String,
        #[label("invalid value")]
        err_span: SourceSpan,
        msg: String,
    },
}

pub type TypeaheadResult<T> = miette::Result<T>;

impl Display for TypeaheadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TypeaheadError::Terminal { msg, .. } => write!(f, "Terminal error: {}", msg),
            TypeaheadError::Event { msg, .. } => write!(f, "Event error: {}", msg),
            TypeaheadError::ChannelClosed { .. } => write!(f, "Channel closed"),
            TypeaheadError::Config { msg, .. } => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for TypeaheadError {}

impl TypeaheadError {
    pub fn terminal(
        src: impl Into<String>,
        err_span: impl Into<SourceSpan>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Terminal {
            src: src.into(),
            err_span: err_span.into(),
            msg: msg.into(),
        }
    }

    pub fn event(
        src: impl Into<String>,
        err_span: impl Into<SourceSpan>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Event {
            src: src.into(),
            err_span: err_span.into(),
            msg: msg.into(),
        }
    }

    pub fn channel_closed(src: impl Into<String>, err_span: impl Into<SourceSpan>) -> Self {
        Self::ChannelClosed {
            src: src.into(),
            err_span: err_span.into(),
        }
    }

    /// Builds a configuration error whose label covers the whole `field = value` source.
    pub fn config(field: &str, value: impl Display, msg: impl Into<String>) -> Self {
        let src = format!("{} = {}", field, value);
        let span = (field.len() + 3, src.len() - field.len() - 3);
        Self::Config {
            src,
            err_span: span.into(),
            msg: msg.into(),
        }
    }
}
