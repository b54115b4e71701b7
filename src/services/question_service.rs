use crate::error::Result;
use crate::models::question::{Question, OPTIONS_PER_QUESTION};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

const QUESTION_TEMPLATES: [&str; 10] = [
    "Which of the following best describes {topic}?",
    "Which scenario is a common use case for {topic}?",
    "Which statement about {topic} is most accurate?",
    "Which choice is NOT typically related to {topic}?",
    "What is a key benefit of using {topic}?",
    "Which practice aligns with best use of {topic}?",
    "Which pitfall should be avoided when working with {topic}?",
    "Which component is most closely associated with {topic}?",
    "Which metric is most relevant when evaluating {topic}?",
    "Which tool complements {topic} in production?",
];

const GENERIC_DISTRACTORS: [&str; 7] = [
    "A static website template",
    "A relational database engine",
    "A low-level memory allocator",
    "A general-purpose web framework",
    "A spreadsheet formatting feature",
    "A container orchestration plugin",
    "A graphics rendering filter",
];

const BENEFITS: [&str; 5] = [
    "Improved efficiency and automation",
    "Better scalability under variable loads",
    "Faster prototyping and iteration",
    "Enhanced developer productivity",
    "More consistent outcomes at scale",
];

const USE_CASES: [&str; 5] = [
    "Summarizing long documents",
    "Automating repetitive workflows",
    "Building intelligent assistants",
    "Retrieving domain knowledge with RAG",
    "Generating structured outputs from prompts",
];

const BEST_PRACTICES: [&str; 5] = [
    "Add guardrails and validations",
    "Use retrieval to ground responses",
    "Evaluate with real-world test sets",
    "Version prompts and track metrics",
    "Cache responses for repeat queries",
];

#[derive(Clone)]
pub struct QuestionService {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl QuestionService {
    pub fn new(api_key: Option<String>, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    /// Produces exactly `count` questions. The remote model is tried first
    /// when a key is configured; any failure falls through to the local
    /// template generator, so callers never observe a generation error.
    pub async fn generate(&self, topic: &str, count: usize) -> Vec<Question> {
        let mut questions = match &self.api_key {
            Some(key) => match self.generate_remote(key, topic, count).await {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = ?e, "question generation failed; using local templates");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if questions.len() < count {
            let start = questions.len();
            let mut extra = Self::fallback_questions(topic, count - start);
            for (i, q) in extra.iter_mut().enumerate() {
                q.id = format!("q{}", start + i + 1);
            }
            questions.append(&mut extra);
        }
        questions.truncate(count);
        questions
    }

    async fn generate_remote(
        &self,
        api_key: &str,
        topic: &str,
        count: usize,
    ) -> Result<Vec<Question>> {
        let prompt = format!(
            "Return ONLY valid JSON (no markdown). Schema: {{\n  \"questions\": [ {{ \"id\": string, \"text\": string, \"options\": [string,string,string,string], \"correct_index\": number }} ]\n}}. Topic: {}. questions length: {}. Keep options concise and distinct.",
            topic, count
        );

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [ {"role": "user", "content": prompt} ],
            "temperature": 0.4,
        });

        let text = self.chat_completion(api_key, payload).await?;
        Ok(Self::parse_questions(&text, topic))
    }

    async fn chat_completion(&self, api_key: &str, payload: JsonValue) -> Result<String> {
        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }

    /// Defensive parse of the model output: a bare JSON object with a
    /// `questions` array, or the first `[...]` span of the raw text.
    fn parse_questions(text: &str, topic: &str) -> Vec<Question> {
        if let Ok(obj) = serde_json::from_str::<JsonValue>(text) {
            if let Some(arr) = obj.get("questions").and_then(|a| a.as_array()) {
                if !arr.is_empty() {
                    return Self::coerce_all(arr, topic);
                }
            }
        }

        let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
            return Vec::new();
        };
        if end <= start {
            return Vec::new();
        }
        match serde_json::from_str::<JsonValue>(&text[start..=end]) {
            Ok(JsonValue::Array(arr)) => Self::coerce_all(&arr, topic),
            _ => Vec::new(),
        }
    }

    fn coerce_all(arr: &[JsonValue], topic: &str) -> Vec<Question> {
        arr.iter()
            .enumerate()
            .map(|(i, v)| Self::coerce_question(v, i, topic))
            .collect()
    }

    /// Every missing or malformed field gets a synthetic default; a bad
    /// question from the model still yields a well-formed record.
    fn coerce_question(v: &JsonValue, index: usize, topic: &str) -> Question {
        let id = match v.get("id") {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => format!("q{}", index + 1),
        };

        let text = v
            .get("text")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .unwrap_or_else(|| format!("Question about {} {}", topic, index + 1));

        let mut options: Vec<String> = v
            .get("options")
            .and_then(|o| o.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|x| x.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        if options.len() != OPTIONS_PER_QUESTION {
            options = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        }

        let correct_index = v
            .get("correct_index")
            .and_then(|c| c.as_i64())
            .filter(|&c| c >= 0 && (c as usize) < options.len())
            .unwrap_or(0) as usize;

        Question {
            id,
            text,
            options,
            correct_index,
        }
    }

    /// Offline generator: varied template questions with one topic-tagged
    /// correct option and three distractors drawn without replacement.
    pub fn fallback_questions(topic: &str, count: usize) -> Vec<Question> {
        let mut rng = rand::thread_rng();
        let mut questions = Vec::with_capacity(count);

        for i in 0..count {
            let template = QUESTION_TEMPLATES
                .choose(&mut rng)
                .unwrap_or(&QUESTION_TEMPLATES[0]);
            let text = template.replace("{topic}", topic);

            let buckets = ["benefit", "use_case", "best_practice", "mixed"];
            let bucket = buckets.choose(&mut rng).copied().unwrap_or("mixed");

            let (correct, mut wrongs): (String, Vec<String>) = match bucket {
                "benefit" => Self::draw(&BENEFITS, &mut rng),
                "use_case" => Self::draw(&USE_CASES, &mut rng),
                "best_practice" => Self::draw(&BEST_PRACTICES, &mut rng),
                _ => {
                    let pool: Vec<&str> = BENEFITS
                        .iter()
                        .chain(USE_CASES.iter())
                        .chain(BEST_PRACTICES.iter())
                        .copied()
                        .collect();
                    let correct = pool.choose(&mut rng).copied().unwrap_or(BENEFITS[0]);
                    let wide: Vec<&str> = pool
                        .iter()
                        .chain(GENERIC_DISTRACTORS.iter())
                        .copied()
                        .filter(|s| *s != correct)
                        .collect();
                    let wrongs = wide
                        .choose_multiple(&mut rng, 3)
                        .map(|s| s.to_string())
                        .collect();
                    (correct.to_string(), wrongs)
                }
            };

            // Decorate roughly half the distractors so they read on-topic.
            for w in wrongs.iter_mut() {
                if rng.gen_bool(0.5) {
                    *w = format!("{} (not {})", w, topic);
                }
            }

            let correct_option = format!("{} (in context of {})", correct, topic);
            let mut options = wrongs;
            options.push(correct_option.clone());
            options.shuffle(&mut rng);
            let correct_index = options
                .iter()
                .position(|o| o == &correct_option)
                .unwrap_or(0);

            questions.push(Question {
                id: format!("q{}", i + 1),
                text,
                options,
                correct_index,
            });
        }

        questions
    }

    fn draw(pool: &[&str], rng: &mut impl Rng) -> (String, Vec<String>) {
        let correct = pool.choose(rng).copied().unwrap_or("");
        let wrongs = GENERIC_DISTRACTORS
            .choose_multiple(rng, 3)
            .map(|s| s.to_string())
            .collect();
        (correct.to_string(), wrongs)
    }
}
