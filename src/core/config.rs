use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chat_dir: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("CHATD_STORAGE_PATH").unwrap_or("./".to_string());
        let chat_dir = format!("{}/chats", storage_path.trim_end_matches("/"));
        // Groq serves an OpenAI compatible completion API under /openai
        let openai_api_hostname = env::var("CHATD_LLM_HOST")
            .unwrap_or_else(|_| "https://api.groq.com/openai".to_string());
        let openai_api_key = env::var("GROQ_API_KEY").expect("Missing env var GROQ_API_KEY");
        let openai_model =
            env::var("CHATD_LLM_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());

        Self {
            chat_dir,
            openai_api_hostname,
            openai_api_key,
            openai_model,
        }
    }
}
