//! Contextual chat about displayed articles
//!
//! Keeps a single conversation per service instance: the history and the
//! current article context live behind a mutex and survive across requests
//! until `reset` is called.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::instrument;

use pulse_core::{Article, PulseError, UserProfile};

use crate::client::LlmClient;

/// How many recent turns are replayed to the model
const HISTORY_WINDOW: usize = 10;

/// How much article content goes into the context block, per article
const CONTEXT_CONTENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
struct ChatTurn {
    role: ChatRole,
    content: String,
}

#[derive(Default)]
struct ChatState {
    history: Vec<ChatTurn>,
    news_context: Vec<Article>,
}

/// A chat response with its generation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

/// Stateful chat service over the LLM client.
pub struct ChatService {
    client: LlmClient,
    state: Mutex<ChatState>,
}

impl ChatService {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            state: Mutex::new(ChatState::default()),
        }
    }

    /// Process one chat message.
    ///
    /// A provided `news_context` replaces the stored one; otherwise the
    /// articles from the previous request remain in effect.
    #[instrument(skip(self, message, news_context, profile))]
    pub async fn chat(
        &self,
        message: &str,
        news_context: Option<Vec<Article>>,
        profile: Option<&UserProfile>,
    ) -> Result<ChatReply, PulseError> {
        let (system_instruction, transcript) = {
            let mut state = self.state.lock().await;

            if let Some(articles) = news_context {
                state.news_context = articles;
            }
            state.history.push(ChatTurn {
                role: ChatRole::User,
                content: message.to_string(),
            });

            (
                build_system_instruction(&state.news_context, profile),
                build_transcript(&state.history, HISTORY_WINDOW),
            )
        };

        let response = self
            .client
            .simple_chat(&system_instruction, &transcript)
            .await?;
        let response = response.trim().to_string();

        {
            let mut state = self.state.lock().await;
            state.history.push(ChatTurn {
                role: ChatRole::Assistant,
                content: response.clone(),
            });
        }

        Ok(ChatReply {
            response,
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    /// Clear the conversation history and article context.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.history.clear();
        state.news_context.clear();
    }
}

/// Build the system instruction from the article context and profile.
fn build_system_instruction(articles: &[Article], profile: Option<&UserProfile>) -> String {
    let mut instruction = String::from(
        "You are a personalized news impact assistant. Analyze the news specifically \
         for the user based on their profile. Speak directly to the user with \"you\" \
         and \"your\"; give actionable, specific advice; never give generic responses.\n\n",
    );

    if let Some(profile) = profile {
        instruction.push_str(&format!(
            "USER PROFILE (this is the person you are talking to):\n\
             - Age: {} years old\n\
             - Goals: {}\n\
             - Interests: {}\n\n\
             When they ask how news affects them, analyze the impact for a \
             {}-year-old with these goals.\n\n",
            profile.age,
            profile.goals,
            profile.interests.join(", "),
            profile.age,
        ));
    }

    instruction.push_str(&build_context_block(articles));
    instruction
}

/// Numbered article context block for the system instruction.
fn build_context_block(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "No news articles are currently loaded.".to_string();
    }

    let mut context = String::from("Here are the news articles the user is viewing:\n\n");
    for (i, article) in articles.iter().enumerate() {
        let content: String = article
            .content
            .as_deref()
            .or(article.snippet.as_deref())
            .unwrap_or("No content")
            .chars()
            .take(CONTEXT_CONTENT_CHARS)
            .collect();

        context.push_str(&format!(
            "Article {}:\nTitle: {}\nSource: {}\nContent: {}\nLink: {}\n\n",
            i + 1,
            article.title,
            article.source,
            content,
            article.link,
        ));
    }
    context
}

/// Render the last `window` turns as a plain transcript.
fn build_transcript(history: &[ChatTurn], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|turn| {
            let role = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{}: {}", role, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content: &str) -> Article {
        Article {
            title: title.to_string(),
            link: format!("https://example.com/{}", title),
            source: "Example".to_string(),
            snippet: None,
            date: None,
            content: Some(content.to_string()),
            image: None,
        }
    }

    #[test]
    fn context_block_numbers_articles() {
        let block = build_context_block(&[article("one", "alpha"), article("two", "beta")]);
        assert!(block.contains("Article 1:"));
        assert!(block.contains("Article 2:"));
        assert!(block.contains("alpha"));
    }

    #[test]
    fn empty_context_is_explicit() {
        assert_eq!(
            build_context_block(&[]),
            "No news articles are currently loaded."
        );
    }

    #[test]
    fn system_instruction_includes_profile() {
        let profile = UserProfile {
            age: 34,
            goals: "retire early".to_string(),
            interests: vec!["finance".to_string(), "ai".to_string()],
            k: 2,
        };
        let instruction = build_system_instruction(&[], Some(&profile));
        assert!(instruction.contains("34 years old"));
        assert!(instruction.contains("retire early"));
        assert!(instruction.contains("finance, ai"));
    }

    #[test]
    fn transcript_keeps_only_recent_turns() {
        let history: Vec<ChatTurn> = (0..15)
            .map(|i| ChatTurn {
                role: if i % 2 == 0 {
                    ChatRole::User
                } else {
                    ChatRole::Assistant
                },
                content: format!("turn {}", i),
            })
            .collect();

        let transcript = build_transcript(&history, 10);
        assert!(!transcript.contains("turn 4"));
        assert!(transcript.contains("turn 5"));
        assert!(transcript.contains("turn 14"));
    }
}
