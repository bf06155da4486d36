//! Chat-completions AI client - AIEnhancementClient over an OpenAI-compatible API.
//!
//! Works against any `/chat/completions` endpoint (DeepSeek by default).
//! Both generation calls ask the model for a JSON object and parse it into
//! the domain payload; a reply that does not parse becomes an unsuccessful
//! [`AiResponse`] rather than an error.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ChatCompletionsConfig::new(Some(api_key))
//!     .with_model("deepseek-chat")
//!     .with_base_url("https://api.deepseek.com/v1");
//!
//! let client = ChatCompletionsEnhancementClient::new(config)?;
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::health::{
    GestationSnapshot, HealthProfileSnapshot, HealthRiskAnalysis, PersonalizedRecommendations,
};
use crate::ports::{AIEnhancementClient, AIError, AiResponse};

const SYSTEM_PROMPT: &str = "你是一位经验丰富的产科医生和孕期健康顾问。\
请根据用户提供的孕妇健康信息进行专业分析，只输出符合要求格式的JSON，不要输出任何其他内容。";

/// Configuration for the chat-completions client.
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    /// API key; without one the client reports itself unavailable.
    api_key: Option<Secret<String>>,
    /// Model name (e.g., "deepseek-chat").
    pub model: String,
    /// Base URL for the API, without trailing `/chat/completions`.
    pub base_url: String,
    /// Bound on the availability probe.
    pub probe_timeout: Duration,
    pub temperature: f32,
}

impl ChatCompletionsConfig {
    /// Creates a configuration with default model and endpoint.
    pub fn new(api_key: Option<Secret<String>>) -> Self {
        Self {
            api_key,
            model: "deepseek-chat".to_string(),
            base_url: "https://api.deepseek.com/v1".to_string(),
            probe_timeout: Duration::from_secs(5),
            temperature: 0.3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the availability probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.trim().is_empty())
    }
}

/// AIEnhancementClient backed by an OpenAI-compatible chat API.
pub struct ChatCompletionsEnhancementClient {
    config: ChatCompletionsConfig,
    client: Client,
}

impl ChatCompletionsEnhancementClient {
    /// Creates a client with the given configuration.
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url)
    }

    fn require_key(&self) -> Result<&str, AIError> {
        self.config.api_key().ok_or(AIError::AuthenticationFailed)
    }

    /// Sends one prompt and parses the model's JSON reply into `T`.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        user_prompt: String,
    ) -> Result<AiResponse<T>, AIError> {
        let api_key = self.require_key()?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = handle_response_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        Ok(parse_payload(&content))
    }
}

#[async_trait]
impl AIEnhancementClient for ChatCompletionsEnhancementClient {
    async fn is_available(&self) -> Result<bool, AIError> {
        let Some(api_key) = self.config.api_key() else {
            return Ok(false);
        };

        let response = self
            .client
            .get(self.models_url())
            .bearer_auth(api_key)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.probe_timeout.as_secs(),
                    }
                } else {
                    map_transport_error(e)
                }
            })?;

        Ok(response.status().is_success())
    }

    async fn generate_analysis(
        &self,
        profile: &HealthProfileSnapshot,
        gestation: Option<&GestationSnapshot>,
    ) -> Result<AiResponse<HealthRiskAnalysis>, AIError> {
        self.complete_json(analysis_prompt(profile, gestation, today()))
            .await
    }

    async fn generate_recommendations(
        &self,
        profile: &HealthProfileSnapshot,
        gestation: Option<&GestationSnapshot>,
        risk_factors: &[String],
    ) -> Result<AiResponse<PersonalizedRecommendations>, AIError> {
        self.complete_json(recommendations_prompt(
            profile,
            gestation,
            risk_factors,
            today(),
        ))
        .await
    }
}

fn map_transport_error(e: reqwest::Error) -> AIError {
    if e.is_connect() {
        AIError::network(format!("Connection failed: {}", e))
    } else {
        AIError::network(e.to_string())
    }
}

/// Maps non-success statuses to [`AIError`].
async fn handle_response_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(30);
    let error_body = response.text().await.unwrap_or_default();

    Err(status_error(status.as_u16(), retry_after, error_body))
}

fn status_error(status: u16, retry_after_secs: u32, error_body: String) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::RateLimited { retry_after_secs },
        400 | 422 => AIError::InvalidRequest(error_body),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Parses the model's reply, tolerating a fenced code block around the JSON.
fn parse_payload<T: DeserializeOwned>(content: &str) -> AiResponse<T> {
    match serde_json::from_str::<T>(strip_code_fence(content)) {
        Ok(data) => AiResponse::ok(data),
        Err(e) => AiResponse::failure(format!("AI返回内容解析失败: {}", e)),
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ----- Prompts -----

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn describe_profile(
    profile: &HealthProfileSnapshot,
    gestation: Option<&GestationSnapshot>,
    today: NaiveDate,
) -> String {
    let mut lines = vec![
        format!("年龄：{}岁", profile.age),
        format!("身高：{}cm", profile.height),
        format!("孕前体重：{}kg", profile.pre_pregnancy_weight),
        format!("当前体重：{}kg", profile.current_weight),
        format!("孕期增重：{:.1}kg", profile.weight_gain()),
        format!("孕前BMI：{:.1}", profile.bmi()),
        format!("血型：{}", profile.blood_type),
        format!("既往病史：{}", text_or_none(&profile.medical_history)),
        format!("家族病史：{}", text_or_none(&profile.family_history)),
        format!("过敏史：{}", text_or_none(&profile.allergies_history)),
        format!("孕产史：{}", text_or_none(&profile.obstetric_history)),
        format!("是否吸烟：{}", yes_no(profile.is_smoking)),
        format!("是否饮酒：{}", yes_no(profile.is_drinking)),
    ];

    if let Some(gestation) = gestation {
        if let Some(age) = gestation.gestational_age_on(today) {
            lines.push(format!("当前孕周：{}周{}天", age.weeks, age.days));
        }
        let days = gestation.days_until_due_on(today);
        if days >= 0 {
            lines.push(format!("距预产期：{}天", days));
        } else {
            lines.push(format!("已超过预产期：{}天", -days));
        }
    }

    lines.join("\n")
}

fn analysis_prompt(
    profile: &HealthProfileSnapshot,
    gestation: Option<&GestationSnapshot>,
    today: NaiveDate,
) -> String {
    format!(
        "请对以下孕妇的健康状况进行全面的妊娠风险评估。\n\n{}\n\n\
请严格按照以下JSON格式输出：\n\
{{\"overallAssessment\": \"总体评估\", \"riskScore\": 1到10的整数, \"riskLevel\": \"低/中/高\", \
\"detailedAnalyses\": [{{\"category\": \"类别\", \"analysis\": \"分析\", \"riskLevel\": \"低/中/高\", \
\"suggestions\": [\"建议\"]}}], \"comprehensiveRecommendation\": \"综合建议\"}}",
        describe_profile(profile, gestation, today)
    )
}

fn recommendations_prompt(
    profile: &HealthProfileSnapshot,
    gestation: Option<&GestationSnapshot>,
    risk_factors: &[String],
    today: NaiveDate,
) -> String {
    let factors = if risk_factors.is_empty() {
        "无".to_string()
    } else {
        risk_factors.join("、")
    };

    format!(
        "请为以下孕妇制定个性化的孕期健康建议。\n\n{}\n风险因素：{}\n\n\
请严格按照以下JSON格式输出：\n\
{{\"categoryRecommendations\": [{{\"category\": \"类别\", \"recommendations\": [\"建议\"], \
\"priority\": \"高/中/低\"}}], \"dietPlan\": \"饮食计划\", \"exercisePlan\": \"运动计划\", \
\"lifestyleAdjustments\": \"生活方式调整\", \"monitoringAdvice\": \"监测建议\", \
\"warningSignsToWatch\": [\"需警惕的症状\"]}}",
        describe_profile(profile, gestation, today),
        factors
    )
}

fn text_or_none(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => "无",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "是"
    } else {
        "否"
    }
}

// ----- Chat API Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
