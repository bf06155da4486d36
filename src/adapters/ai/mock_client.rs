//! Mock AI Enhancement Client for testing.
//!
//! Provides a configurable mock implementation of the AIEnhancementClient port,
//! allowing tests to run without calling the real AI service.
//!
//! # Features
//!
//! - Scripted availability probe (available, unavailable, probe error)
//! - Pre-configured responses per generation method (consumed in order)
//! - Simulated delays and never-resolving calls for timeout testing
//! - Call tracking, including whether a call ran to completion
//!
//! # Example
//!
//! ```ignore
//! let client = MockAIEnhancementClient::new()
//!     .with_analysis(MockOutcome::Hang)
//!     .with_recommendations_delay(Duration::from_millis(10));
//!
//! let response = client.generate_recommendations(&profile, None, &[]).await?;
//! assert_eq!(client.calls().recommendations_completed, 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::health::{
    CategoryRecommendation, DetailedAnalysis, GestationSnapshot, HealthProfileSnapshot,
    HealthRiskAnalysis, PersonalizedRecommendations,
};
use crate::ports::{AIEnhancementClient, AIError, AiResponse};

/// A scripted outcome for one generation call.
#[derive(Debug, Clone)]
pub enum MockOutcome<T> {
    /// Return this envelope (successful or not).
    Respond(AiResponse<T>),
    /// Fail the call.
    Fail(AIError),
    /// Never resolve.
    Hang,
}

/// Call counters recorded by the mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockCallLog {
    pub probes: usize,
    pub analysis_started: usize,
    pub analysis_completed: usize,
    pub recommendations_started: usize,
    pub recommendations_completed: usize,
    /// Risk factors passed to the latest recommendations call.
    pub last_risk_factors: Option<Vec<String>>,
}

impl MockCallLog {
    /// Generation calls started, excluding probes.
    pub fn generation_calls(&self) -> usize {
        self.analysis_started + self.recommendations_started
    }
}

/// Mock AI client for testing.
#[derive(Debug, Clone)]
pub struct MockAIEnhancementClient {
    availability: Result<bool, AIError>,
    analysis: Arc<Mutex<VecDeque<MockOutcome<HealthRiskAnalysis>>>>,
    recommendations: Arc<Mutex<VecDeque<MockOutcome<PersonalizedRecommendations>>>>,
    analysis_delay: Duration,
    recommendations_delay: Duration,
    calls: Arc<Mutex<MockCallLog>>,
}

impl Default for MockAIEnhancementClient {
    fn default() -> Self {
        Self::new()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIEnhancementClient {
    /// Creates an available mock that answers every call with sample data.
    pub fn new() -> Self {
        Self {
            availability: Ok(true),
            analysis: Arc::new(Mutex::new(VecDeque::new())),
            recommendations: Arc::new(Mutex::new(VecDeque::new())),
            analysis_delay: Duration::ZERO,
            recommendations_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(MockCallLog::default())),
        }
    }

    /// Probe answers `false`.
    pub fn unavailable() -> Self {
        Self::new().with_availability(Ok(false))
    }

    /// Sets what the availability probe returns.
    pub fn with_availability(mut self, availability: Result<bool, AIError>) -> Self {
        self.availability = availability;
        self
    }

    /// Queues an outcome for `generate_analysis`.
    pub fn with_analysis(self, outcome: MockOutcome<HealthRiskAnalysis>) -> Self {
        locked(&self.analysis).push_back(outcome);
        self
    }

    /// Queues an outcome for `generate_recommendations`.
    pub fn with_recommendations(self, outcome: MockOutcome<PersonalizedRecommendations>) -> Self {
        locked(&self.recommendations).push_back(outcome);
        self
    }

    /// Sets simulated latency for `generate_analysis`.
    pub fn with_analysis_delay(mut self, delay: Duration) -> Self {
        self.analysis_delay = delay;
        self
    }

    /// Sets simulated latency for `generate_recommendations`.
    pub fn with_recommendations_delay(mut self, delay: Duration) -> Self {
        self.recommendations_delay = delay;
        self
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> MockCallLog {
        locked(&self.calls).clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        *locked(&self.calls) = MockCallLog::default();
    }

    /// Canned analysis returned when no outcome is queued.
    pub fn sample_analysis() -> HealthRiskAnalysis {
        HealthRiskAnalysis {
            overall_assessment: "综合评估显示妊娠风险处于可控范围".to_string(),
            risk_score: 4,
            risk_level: "中低".to_string(),
            detailed_analyses: vec![DetailedAnalysis {
                category: "体重".to_string(),
                analysis: "孕前BMI正常".to_string(),
                risk_level: "低".to_string(),
                suggestions: vec!["保持均衡饮食".to_string()],
            }],
            comprehensive_recommendation: "按时产检，保持良好生活习惯".to_string(),
        }
    }

    /// Canned care plan returned when no outcome is queued.
    pub fn sample_recommendations() -> PersonalizedRecommendations {
        PersonalizedRecommendations {
            category_recommendations: vec![CategoryRecommendation {
                category: "营养".to_string(),
                recommendations: vec!["每日补充叶酸0.4mg".to_string()],
                priority: "高".to_string(),
            }],
            diet_plan: "三餐规律，增加优质蛋白".to_string(),
            exercise_plan: "每日散步30分钟".to_string(),
            lifestyle_adjustments: "保证充足睡眠".to_string(),
            monitoring_advice: "每周称重一次".to_string(),
            warning_signs_to_watch: vec!["阴道出血".to_string(), "胎动减少".to_string()],
        }
    }

    async fn play<T>(
        outcome: Option<MockOutcome<T>>,
        default: T,
        delay: Duration,
    ) -> Result<AiResponse<T>, AIError> {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        match outcome {
            None => Ok(AiResponse::ok(default)),
            Some(MockOutcome::Respond(response)) => Ok(response),
            Some(MockOutcome::Fail(err)) => Err(err),
            Some(MockOutcome::Hang) => futures::future::pending().await,
        }
    }
}

#[async_trait]
impl AIEnhancementClient for MockAIEnhancementClient {
    async fn is_available(&self) -> Result<bool, AIError> {
        locked(&self.calls).probes += 1;
        self.availability.clone()
    }

    async fn generate_analysis(
        &self,
        _profile: &HealthProfileSnapshot,
        _gestation: Option<&GestationSnapshot>,
    ) -> Result<AiResponse<HealthRiskAnalysis>, AIError> {
        locked(&self.calls).analysis_started += 1;
        let outcome = locked(&self.analysis).pop_front();

        let result = Self::play(outcome, Self::sample_analysis(), self.analysis_delay).await;

        locked(&self.calls).analysis_completed += 1;
        result
    }

    async fn generate_recommendations(
        &self,
        _profile: &HealthProfileSnapshot,
        _gestation: Option<&GestationSnapshot>,
        risk_factors: &[String],
    ) -> Result<AiResponse<PersonalizedRecommendations>, AIError> {
        {
            let mut calls = locked(&self.calls);
            calls.recommendations_started += 1;
            calls.last_risk_factors = Some(risk_factors.to_vec());
        }
        let outcome = locked(&self.recommendations).pop_front();

        let result = Self::play(
            outcome,
            Self::sample_recommendations(),
            self.recommendations_delay,
        )
        .await;

        locked(&self.calls).recommendations_completed += 1;
        result
    }
}
