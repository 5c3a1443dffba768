//! Prompt template rendering
//!
//! Templates are plain text with three literal placeholders. There is no
//! escaping, nesting or conditional logic: each placeholder is replaced by
//! plain substring substitution and anything else is left verbatim.

/// Built-in system prompt used when the configured one is blank
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "你是一名专业的答题助手，请根据题目内容和选项快速给出最可能的正确答案，并提供必要的推理。";

/// Built-in user prompt template used when the configured one is blank
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "题目：{{title}}\n选项：{{options}}\n类型：{{type}}\n\n请给出最可能的正确答案，并在必要时给出简要解释。";

/// Rendered in place of a field that is empty after trimming
pub const EMPTY_FIELD: &str = "无";

pub const TITLE_PLACEHOLDER: &str = "{{title}}";
pub const OPTIONS_PLACEHOLDER: &str = "{{options}}";
pub const TYPE_PLACEHOLDER: &str = "{{type}}";

/// The question fields a template can reference
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionFields<'a> {
    pub title: &'a str,
    pub options: &'a str,
    pub kind: &'a str,
}

/// Substitute every placeholder occurrence with its trimmed field value
pub fn render_prompt(template: &str, fields: &QuestionFields<'_>) -> String {
    [
        (TITLE_PLACEHOLDER, fields.title),
        (OPTIONS_PLACEHOLDER, fields.options),
        (TYPE_PLACEHOLDER, fields.kind),
    ]
    .into_iter()
    .fold(template.to_string(), |prompt, (placeholder, value)| {
        let value = value.trim();
        let value = if value.is_empty() { EMPTY_FIELD } else { value };
        prompt.replace(placeholder, value)
    })
}
