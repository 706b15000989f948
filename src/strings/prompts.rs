//! # Prompts
//!
//! The planning instruction sent to providers, rendered from `prompts/planner.md`.

/// A builder for rendering prompts with context.
pub struct PromptRenderer<'a> {
    template: &'a str,
    replacements: Vec<(&'a str, String)>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            replacements: Vec::new(),
        }
    }

    pub fn set(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.replacements.push((key, value.into()));
        self
    }

    pub fn render(self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in self.replacements {
            result = result.replace(key, &value);
        }

        if let Some(start) = result.find("{{") {
            if let Some(end) = result[start..].find("}}") {
                let placeholder = &result[start..start + end + 2];
                tracing::error!("[PROMPT RENDER ERROR] Unreplaced placeholder found in output: {}", placeholder);
            }
        }

        result
    }
}

pub const PLANNER_TEMPLATE: &str = include_str!("../../prompts/planner.md");

/// System instruction for the planning provider.
pub fn planner_instruction(schema: &str, app_dir: &str, preview_port: u16) -> String {
    PromptRenderer::new(PLANNER_TEMPLATE)
        .set("{{SCHEMA}}", schema.trim_end())
        .set("{{APP_DIR}}", app_dir)
        .set("{{PREVIEW_PORT}}", preview_port.to_string())
        .render()
}
