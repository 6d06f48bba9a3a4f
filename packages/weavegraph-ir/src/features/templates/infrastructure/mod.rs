mod text_expander;

pub use text_expander::{TextTemplate, TextTemplateExpander};
