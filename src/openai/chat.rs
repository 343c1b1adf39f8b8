use anyhow::{Error, Result, bail};

use crate::openai::{Message, completion};

/// Runs a single completion turn by passing a transcript to the LLM
/// and returning the generated reply. The reply is labeled with the
/// `system` role to match what clients persist back into the
/// transcript.
pub async fn complete(
    history: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<Message, Error> {
    let resp = completion(history, api_hostname, api_key, model).await?;

    if let Some(msg) = resp["choices"][0]["message"]["content"].as_str() {
        Ok(Message::new("system", msg))
    } else {
        bail!("No message received. Resp:\n\n {}", resp);
    }
}
