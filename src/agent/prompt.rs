//! Prompt composition from YAML message-chain templates.
//!
//! A prompt file is a YAML list of `{role, content}` messages with
//! `{name}` placeholders (`{{` and `}}` for literal braces). Mapping
//! parameters are rendered as YAML indented by four spaces so they can sit
//! inside a `content: |` block.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::config::PromptSource;
use crate::error::PromptError;

/// Parameter the board view is injected under.
pub const WORLD_REPRESENTATION: &str = "world_representation";

const YAML_INDENT: &str = "    ";

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a message.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Loads prompt files from a directory and composes them into one chain.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    prompts_dir: PathBuf,
}

impl PromptComposer {
    /// Create a composer rooted at `prompts_dir`.
    #[must_use]
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
        }
    }

    /// Directory prompt files are resolved against.
    #[must_use]
    pub fn prompts_dir(&self) -> &Path {
        &self.prompts_dir
    }

    /// Read a prompt file.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Io`] if the file cannot be read.
    pub fn load_prompt_file(&self, file: &str) -> Result<String, PromptError> {
        let path = self.prompts_dir.join(file);
        fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source })
    }

    /// Compose every source, in order, into one message chain.
    ///
    /// `injected` parameters are added to each source's own parameters and
    /// win on name clashes. Files whose content is not a YAML list are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing, a placeholder has no value,
    /// or the substituted text is not valid YAML.
    pub fn compose(
        &self,
        sources: &[PromptSource],
        injected: &BTreeMap<String, Value>,
    ) -> Result<Vec<Message>, PromptError> {
        let mut chain = Vec::new();
        for source in sources {
            let file = source.prompt_filepath.as_str();
            let template = self.load_prompt_file(file)?;

            let mut params = source.template_params.clone();
            params.extend(injected.iter().map(|(k, v)| (k.clone(), v.clone())));
            let rendered = render_params(&params, file)?;
            let content = substitute(&template, &rendered, file)?;

            let yaml_error = |source| PromptError::Yaml {
                file: file.to_string(),
                source,
            };
            let value: Value = serde_yaml::from_str(&content).map_err(yaml_error)?;
            if !value.is_sequence() {
                tracing::warn!(file, "prompt file is not a message list, skipped");
                continue;
            }
            let messages: Vec<Message> = serde_yaml::from_value(value).map_err(yaml_error)?;
            chain.extend(messages);
        }

        if let Some(last) = chain.last_mut().filter(|m| m.role == "assistant") {
            last.content = last.content.trim_end().to_string();
        }
        Ok(chain)
    }
}

/// Render parameter values to the text substituted into templates.
fn render_params(
    params: &BTreeMap<String, Value>,
    file: &str,
) -> Result<BTreeMap<String, String>, PromptError> {
    params
        .iter()
        .map(|(name, value)| {
            render_value(value)
                .map(|text| (name.clone(), text))
                .map_err(|source| PromptError::Yaml {
                    file: file.to_string(),
                    source,
                })
        })
        .collect()
}

/// Text form of one parameter value.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn render_value(value: &Value) -> Result<String, serde_yaml::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Mapping(_) => {
            let yaml = serde_yaml::to_string(value)?;
            let indented: Vec<String> = yaml.lines().map(|line| format!("{YAML_INDENT}{line}")).collect();
            Ok(indented.join("\n"))
        }
        _ => Ok(serde_yaml::to_string(value)?.trim_end().to_string()),
    }
}

/// Replace `{name}` placeholders in `template`.
///
/// # Errors
///
/// Returns an error for unknown names or an unclosed `{`.
pub fn substitute(
    template: &str,
    params: &BTreeMap<String, String>,
    file: &str,
) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(PromptError::UnterminatedPlaceholder(file.to_string())),
                    }
                }
                let value = params.get(name.trim()).ok_or_else(|| PromptError::MissingParameter {
                    name: name.trim().to_string(),
                    file: file.to_string(),
                })?;
                out.push_str(value);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Split the system prompt off a chain.
///
/// The last `system` message wins; all other messages keep their order.
#[must_use]
pub fn extract_system_message(chain: &[Message]) -> (String, Vec<Message>) {
    let mut system = String::new();
    let mut rest = Vec::with_capacity(chain.len());
    for message in chain {
        if message.role == "system" {
            system.clone_from(&message.content);
        } else {
            rest.push(message.clone());
        }
    }
    (system, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_substitute() {
        let out = substitute("Hi {name}, {{literal}}", &params(&[("name", "P1")]), "t.yaml").unwrap();
        assert_eq!(out, "Hi P1, {literal}");
    }

    #[test]
    fn test_substitute_errors() {
        assert!(matches!(
            substitute("{missing}", &BTreeMap::new(), "t.yaml"),
            Err(PromptError::MissingParameter { name, .. }) if name == "missing"
        ));
        assert!(matches!(
            substitute("{open", &BTreeMap::new(), "t.yaml"),
            Err(PromptError::UnterminatedPlaceholder(_))
        ));
    }

    #[test]
    fn test_mapping_rendered_as_indented_yaml() {
        let value: Value = serde_yaml::from_str("a: 1\nb: two\n").unwrap();
        assert_eq!(render_value(&value).unwrap(), "    a: 1\n    b: two");
        assert_eq!(render_value(&Value::from(5)).unwrap(), "5");
        assert_eq!(render_value(&Value::from("text")).unwrap(), "text");
    }

    #[test]
    fn test_compose_chain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("intro.yaml"),
            "- role: system\n  content: You play {side}.\n- role: user\n  content: |\n    Board:\n{world_representation}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("prefill.yaml"),
            "- name: prefill\n  role: assistant\n  content: \"{{\\\"moves\\\":   \"\n",
        )
        .unwrap();

        let composer = PromptComposer::new(dir.path());
        let sources = vec![
            PromptSource {
                prompt_filepath: "intro.yaml".to_string(),
                template_params: BTreeMap::from([("side".to_string(), Value::from("west"))]),
            },
            PromptSource {
                prompt_filepath: "prefill.yaml".to_string(),
                template_params: BTreeMap::new(),
            },
        ];
        let world: Value = serde_yaml::from_str("cells: 3").unwrap();
        let injected = BTreeMap::from([(WORLD_REPRESENTATION.to_string(), world)]);

        let chain = composer.compose(&sources, &injected).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], Message::new("system", "You play west."));
        assert!(chain[1].content.contains("cells: 3"));
        assert_eq!(chain[2].content, "{\"moves\":");

        let (system, rest) = extract_system_message(&chain);
        assert_eq!(system, "You play west.");
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let composer = PromptComposer::new("/nonexistent/prompts");
        let sources = vec![PromptSource {
            prompt_filepath: "nope.yaml".to_string(),
            template_params: BTreeMap::new(),
        }];
        assert!(matches!(
            composer.compose(&sources, &BTreeMap::new()),
            Err(PromptError::Io { .. })
        ));
    }
}
