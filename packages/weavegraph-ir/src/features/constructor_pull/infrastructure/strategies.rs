//! Reference pull strategies

use crate::features::constructor_pull::ports::{PullAction, PullRequest, PullSink, PullStrategy};

/// `_logger`, `Logger` -> `logger`
pub fn parameter_name_for(member_name: &str) -> String {
    let trimmed = member_name.trim_start_matches('_');
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => member_name.to_string(),
    }
}

/// Reuse a same-named, same-typed parameter; otherwise append one
#[derive(Debug, Clone, Default)]
pub struct AppendParameterStrategy {
    /// Default value of appended parameters, making them optional
    pub default_value: Option<String>,
}

impl AppendParameterStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(value: impl Into<String>) -> Self {
        Self {
            default_value: Some(value.into()),
        }
    }
}

impl PullStrategy for AppendParameterStrategy {
    fn decide(&self, request: &PullRequest<'_>, _sink: &mut PullSink<'_>) -> PullAction {
        let (name, ty, default_value) = match request.forwarded {
            Some(forwarded) => (
                forwarded.name.clone(),
                forwarded.ty.clone(),
                forwarded.default_value.clone().or_else(|| self.default_value.clone()),
            ),
            None => (
                parameter_name_for(request.member_name),
                request.member_type.clone(),
                self.default_value.clone(),
            ),
        };

        let existing = request
            .model
            .parameters(request.constructor)
            .iter()
            .position(|p| p.name == name && p.ty == ty && p.pulled_for.is_none());
        match existing {
            Some(index) => PullAction::UseExistingParameter {
                index: index as u16,
            },
            None => PullAction::AppendParameterAndPull {
                name,
                ty,
                default_value,
            },
        }
    }
}

/// Never pulls; forwarders pass `default`
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverPullStrategy;

impl PullStrategy for NeverPullStrategy {
    fn decide(&self, _request: &PullRequest<'_>, _sink: &mut PullSink<'_>) -> PullAction {
        PullAction::DoNotPull
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_name_for() {
        assert_eq!(parameter_name_for("_logger"), "logger");
        assert_eq!(parameter_name_for("Logger"), "logger");
        assert_eq!(parameter_name_for("clock"), "clock");
    }
}
