//! Text template expander
//!
//! Registry of named text snippets. `{value}` is replaced by the bound value
//! name, `{target}` by the display name of the target member, and
//! `{tag:KEY}` by a tag value from the advice's tag bag.

use crate::features::templates::domain::TemplateRef;
use crate::features::templates::ports::{
    BindingShape, BoundTemplate, ExpansionContext, TemplateError, TemplateExpander,
};
use crate::shared::models::{SpecialType, TypeRef};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTemplate {
    pub text: String,
    /// Type the snippet validates; `None` accepts any value
    pub value_type: Option<TypeRef>,
    /// Snippet only makes sense before (`Some(false)`) or after (`Some(true)`) the call
    pub output_only: Option<bool>,
}

impl TextTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value_type: None,
            output_only: None,
        }
    }

    pub fn for_type(mut self, ty: TypeRef) -> Self {
        self.value_type = Some(ty);
        self
    }

    pub fn before_call_only(mut self) -> Self {
        self.output_only = Some(false);
        self
    }

    pub fn after_call_only(mut self) -> Self {
        self.output_only = Some(true);
        self
    }
}

#[derive(Debug, Default)]
pub struct TextTemplateExpander {
    templates: FxHashMap<String, TextTemplate>,
}

/// A snippet typed `object` accepts any non-void value
fn accepts(expected: &TypeRef, found: &TypeRef) -> bool {
    if expected == found {
        return true;
    }
    matches!(expected, TypeRef::Special(SpecialType::Object)) && !found.is_void()
}

impl TextTemplateExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, template: TextTemplate) -> &mut Self {
        self.templates.insert(name.into(), template);
        self
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.register(name, TextTemplate::new(text));
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, template: TextTemplate) -> Self {
        self.register(name, template);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn lookup(&self, template: &TemplateRef) -> Result<&TextTemplate, TemplateError> {
        self.templates
            .get(&template.name)
            .ok_or_else(|| TemplateError::NotFound(template.name.clone()))
    }
}

impl TemplateExpander for TextTemplateExpander {
    fn try_bind(
        &self,
        template: &TemplateRef,
        shape: &BindingShape,
    ) -> Result<BoundTemplate, TemplateError> {
        let text = self.lookup(template)?;

        if let Some(expected) = &text.value_type {
            if !accepts(expected, &shape.value_type) {
                return Err(TemplateError::TypeMismatch {
                    template: template.name.clone(),
                    expected: format!("{}", expected),
                    found: format!("{}", shape.value_type),
                });
            }
        }

        if let Some(output_only) = text.output_only {
            if output_only != shape.is_output {
                return Err(TemplateError::Expansion {
                    template: template.name.clone(),
                    reason: format!(
                        "template is only valid {} the original call",
                        if output_only { "after" } else { "before" }
                    ),
                });
            }
        }

        Ok(BoundTemplate {
            template: template.clone(),
            shape: shape.clone(),
        })
    }

    fn expand(
        &self,
        bound: &BoundTemplate,
        context: &ExpansionContext<'_>,
    ) -> Result<String, TemplateError> {
        let text = self.lookup(&bound.template)?;
        let mut out = text.text.replace("{value}", &bound.shape.value_name);
        if out.contains("{target}") {
            out = out.replace("{target}", &context.model.display_name(context.target));
        }

        while let Some(start) = out.find("{tag:") {
            let Some(len) = out[start..].find('}') else {
                return Err(TemplateError::Expansion {
                    template: bound.template.name.clone(),
                    reason: "unterminated tag placeholder".to_string(),
                });
            };
            let key = &out[start + 5..start + len];
            let value = match context.tags.get(key) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => {
                    return Err(TemplateError::Expansion {
                        template: bound.template.name.clone(),
                        reason: format!("missing tag '{}'", key),
                    })
                }
            };
            out.replace_range(start..start + len + 1, &value);
        }

        Ok(out)
    }
}
