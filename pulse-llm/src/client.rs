use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pulse_core::{Article, PulseError, UserProfile};

/// Client for the chat-completion API used by ranking and personalization.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
}

/// Ranked interest list as the model returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedInterests {
    pub recommended_interests: Vec<String>,
}

impl LlmClient {
    pub fn new() -> Result<Self, PulseError> {
        // async-openai reads OPENAI_API_KEY from env automatically
        let config = OpenAIConfig::default();
        let client = Client::with_config(config);

        Ok(Self {
            client,
            model: "gpt-4o".to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Run one system+user chat completion and return the raw text reply.
    pub async fn simple_chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PulseError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| PulseError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| PulseError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(0.3)
            .build()
            .map_err(|e| PulseError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PulseError::api(format!("LLM API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| PulseError::parse("No response from LLM"))
    }

    /// Rank the profile's interests and return the top `k`.
    ///
    /// A ranking failure is a hard failure for the caller: without the
    /// selected interests there is nothing to aggregate.
    #[instrument(skip(self, profile), fields(k = profile.k))]
    pub async fn rank_interests(&self, profile: &UserProfile) -> Result<Vec<String>, PulseError> {
        let system_prompt = r#"You rank a user's interests by how strongly they align with the user's age and goals.

Respond with valid JSON in this exact format:
{
  "recommended_interests": ["interest1", "interest2"]
}

Only include interests from the provided list, ordered by intensity of alignment."#;

        let user_prompt = format!(
            r#"User Profile:
- Age: {}
- Goals: {}

Interests to evaluate: {:?}

Pick the top {} interests that best align with the user's age and goals."#,
            profile.age, profile.goals, profile.interests, profile.k
        );

        let response = self.simple_chat(system_prompt, &user_prompt).await?;
        let json_str = extract_json(&response)?;

        let ranked: RankedInterests = serde_json::from_str(&json_str)
            .map_err(|e| PulseError::parse(format!("Failed to parse ranked interests: {}", e)))?;

        if ranked.recommended_interests.is_empty() {
            return Err(PulseError::parse("Ranker returned no interests"));
        }

        let mut interests = ranked.recommended_interests;
        interests.truncate(profile.k);
        Ok(interests)
    }

    /// Rewrite an article headline to show direct personal impact.
    ///
    /// Callers treat a failure as non-fatal and keep the original title.
    #[instrument(skip(self, profile, article))]
    pub async fn personalize_headline(
        &self,
        profile: &UserProfile,
        interest: &str,
        article: &Article,
    ) -> Result<String, PulseError> {
        let system_prompt = r#"You rewrite news headlines to show the DIRECT PERSONAL IMPACT on the reader.

Examples:
- Instead of "Gold prices expected to rise next month"
- Say: "Invest in gold now - potential profit if you sell next month"

- Instead of "Central bank raises rates by 0.5%"
- Say: "Your loan payments may rise this month due to the rate hike"

- Instead of "Tech hiring slowdown expected"
- Say: "Upskill now - tech job market tightening for mid-level roles"

Generate ONE concise, actionable headline (max 120 characters) that:
1. Shows direct personal impact with numbers if possible
2. Uses "you/your" language
3. Is actionable and specific

Return ONLY the headline text, nothing else."#;

        let content_excerpt: String = article
            .content
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(500)
            .collect();

        let user_prompt = format!(
            r#"User Profile:
- Age: {}
- Goals: {}
- Interest: {}

News Article:
Title: {}
Content: {}"#,
            profile.age, profile.goals, interest, article.title, content_excerpt
        );

        let headline = self.simple_chat(system_prompt, &user_prompt).await?;
        let headline = headline.trim().trim_matches('"').to_string();

        if headline.is_empty() {
            return Err(PulseError::parse("Empty personalized headline"));
        }

        Ok(headline)
    }
}

/// Extract JSON from a response that might contain markdown code blocks
pub(crate) fn extract_json(content: &str) -> Result<String, PulseError> {
    // Try to find JSON in code blocks first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Ok(content[start..start + end].trim().to_string());
        }
    }

    // Try plain code blocks
    if let Some(start) = content.find("```") {
        let start = start + 3;
        // Skip language identifier if present
        let start = content[start..]
            .find('\n')
            .map(|n| start + n + 1)
            .unwrap_or(start);
        if let Some(end) = content[start..].find("```") {
            return Ok(content[start..start + end].trim().to_string());
        }
    }

    // Try to find raw JSON
    if let Some(start) = content.find('{') {
        if let Some(end) = content.rfind('}') {
            return Ok(content[start..=end].to_string());
        }
    }

    Err(PulseError::parse("No JSON found in response"))
}
