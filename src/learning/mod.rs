//! Learning API client
//!
//! Courses, lessons, progress, achievements and daily challenges. Runs
//! under the demo-fallback auth policy: a missing token is bootstrapped
//! from the demo endpoint and a 401 is retried once.

use crate::client::transport::{build_http_client, AuthPolicy, RequestSpec, Transport};
use crate::config::ClientConfig;
use crate::session::Session;
use crate::Result;
use serde_json::json;
use std::sync::Arc;

pub mod models;

pub use models::*;

pub struct LearningClient {
    transport: Transport,
}

impl LearningClient {
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self> {
        let http = build_http_client(config)?;
        Ok(Self {
            transport: Transport::new(
                http,
                format!("{}/learning", config.api_base_url),
                config.api_base_url.clone(),
                session,
                AuthPolicy::DemoFallback,
            ),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.transport.session()
    }

    /// Re-run the demo bootstrap on demand
    pub async fn initialize_auth(&self) {
        self.transport.reinitialize().await;
    }

    // =============================
    // Courses
    // =============================

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.transport.request(RequestSpec::get("/api/courses/")).await
    }

    pub async fn course(&self, course_id: &str) -> Result<Course> {
        self.transport
            .request(RequestSpec::get(format!("/api/courses/{}/", course_id)))
            .await
    }

    pub async fn enroll(&self, course_id: &str) -> Result<EnrollmentResponse> {
        self.transport
            .request(RequestSpec::post(format!("/api/courses/{}/enroll/", course_id)))
            .await
    }

    pub async fn course_progress(&self, course_id: &str) -> Result<UserCourseProgress> {
        self.transport
            .request(RequestSpec::get(format!("/api/courses/{}/progress/", course_id)))
            .await
    }

    // =============================
    // Lessons
    // =============================

    pub async fn lessons(&self, course_id: Option<&str>) -> Result<Vec<Lesson>> {
        let mut spec = RequestSpec::get("/api/lessons/");
        if let Some(course) = course_id {
            spec = spec.query(&json!({ "course": course }))?;
        }
        self.transport.request(spec).await
    }

    pub async fn start_lesson(&self, lesson_id: &str) -> Result<LessonStartResponse> {
        self.transport
            .request(RequestSpec::post(format!("/api/lessons/{}/start/", lesson_id)))
            .await
    }

    pub async fn complete_lesson(
        &self,
        lesson_id: &str,
        completion: &LessonCompletion,
    ) -> Result<LessonCompletionResponse> {
        self.transport
            .request(
                RequestSpec::post(format!("/api/lessons/{}/complete/", lesson_id))
                    .json(completion)?,
            )
            .await
    }

    // =============================
    // Progress, Achievements, Challenges
    // =============================

    pub async fn user_progress(&self) -> Result<Vec<UserCourseProgress>> {
        self.transport.request(RequestSpec::get("/api/progress/")).await
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>> {
        self.transport.request(RequestSpec::get("/api/achievements/")).await
    }

    pub async fn user_achievements(&self) -> Result<Vec<UserAchievement>> {
        self.transport
            .request(RequestSpec::get("/api/my-achievements/"))
            .await
    }

    pub async fn daily_challenges(&self) -> Result<Vec<DailyChallenge>> {
        self.transport
            .request(RequestSpec::get("/api/daily-challenges/"))
            .await
    }

    pub async fn attempt_challenge(
        &self,
        challenge_id: &str,
        answer: serde_json::Value,
    ) -> Result<ChallengeResult> {
        self.transport
            .request(
                RequestSpec::post(format!("/api/daily-challenges/{}/attempt/", challenge_id))
                    .json(&json!({ "answer": answer }))?,
            )
            .await
    }

    pub async fn analytics(&self, range: Option<AnalyticsRange>) -> Result<LearningAnalytics> {
        let mut spec = RequestSpec::get("/api/analytics/");
        if let Some(range) = range {
            spec = spec.query(&json!({ "time_range": range.as_str() }))?;
        }
        self.transport.request(spec).await
    }
}
