use crate::domain::{SupplementaryText, Topic, ValidationError};
use crate::models::SubscriptionRecord;
use crate::utils::is_empty_or_whitespace;

pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Instructions handed to the downstream research agent. The agent's output
/// ends up verbatim in an email body, hence the formatting rules.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"
You are an excellent researcher. Strictly follow rules 1 and 2 below.
1: The result must contain only a summary and the news sources (URLs) it is based on. Do not include anything else.
2: The result will be displayed in the body of an email. Format it so that it is easy to read there.

Search for recent, reliable information about "{topic}" and summarize it.
"#;

const SUPPLEMENTARY_HEADING: &str = "Additional instructions:";

/// A rendered prompt together with the validated topic it was rendered for.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    text: String,
    topic: Topic,
}

impl Prompt {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<Prompt> for String {
    fn from(prompt: Prompt) -> Self {
        prompt.text
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn parse(template: String) -> Result<PromptTemplate, String> {
        if is_empty_or_whitespace(&template) {
            Err(String::from("A prompt template is required."))
        } else if !template.contains(TOPIC_PLACEHOLDER) {
            Err(format!(
                "The prompt template must contain the {} placeholder.",
                TOPIC_PLACEHOLDER
            ))
        } else {
            Ok(Self { template })
        }
    }

    pub fn render(&self, record: &SubscriptionRecord) -> Result<Prompt, ValidationError> {
        let topic = Topic::parse(record.topic.clone()).map_err(ValidationError::Topic)?;
        let supplementary = SupplementaryText::parse(record.optional_text.as_deref());

        Ok(self.render_parts(topic, supplementary.as_ref()))
    }

    fn render_parts(&self, topic: Topic, supplementary: Option<&SupplementaryText>) -> Prompt {
        // Single pass: a topic that itself contains the placeholder is not expanded again.
        let mut prompt = self
            .template
            .trim()
            .replace(TOPIC_PLACEHOLDER, topic.as_ref());

        if let Some(text) = supplementary {
            prompt.push_str("\n\n");
            prompt.push_str(SUPPLEMENTARY_HEADING);
            prompt.push('\n');
            prompt.push_str(text.as_ref());
        }

        Prompt {
            text: prompt.trim().to_string(),
            topic,
        }
    }
}
