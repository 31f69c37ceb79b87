//! Learning content records

use crate::de;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    #[default]
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    Video,
    #[default]
    Reading,
    Interactive,
    Quiz,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    #[default]
    MultipleChoice,
    TrueFalse,
    Input,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsRange {
    Week,
    Month,
    All,
}

impl AnalyticsRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsRange::Week => "week",
            AnalyticsRange::Month => "month",
            AnalyticsRange::All => "all",
        }
    }
}

//
// ================= Courses & Lessons =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, deserialize_with = "de::metric")]
    pub estimated_duration_hours: f64,
    #[serde(default)]
    pub estimated_duration_formatted: String,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub total_lessons: u32,
    #[serde(default)]
    pub user_progress: Option<UserCourseProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lesson_type: LessonType,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub estimated_duration_formatted: String,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default)]
    pub passing_score: u32,
}

fn default_true() -> bool {
    true
}

//
// ================= Progress =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCourseProgress {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(deserialize_with = "de::id")]
    pub course: String,
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub course_icon: String,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub lessons_completed: u32,
    #[serde(default)]
    pub total_time_spent_minutes: u32,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub current_lesson: Option<String>,
    #[serde(default)]
    pub current_lesson_title: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::metric")]
    pub average_score: f64,
    #[serde(default, deserialize_with = "de::metric")]
    pub completion_percentage: f64,
    #[serde(default)]
    pub lesson_progress: Vec<UserLessonProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLessonProgress {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(deserialize_with = "de::id")]
    pub lesson: String,
    #[serde(default)]
    pub lesson_title: String,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default, deserialize_with = "de::opt_metric")]
    pub score: Option<f64>,
    #[serde(default)]
    pub time_spent_minutes: u32,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_responses: serde_json::Value,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    #[serde(default)]
    pub message: String,
    pub progress: UserCourseProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonStartResponse {
    #[serde(default)]
    pub message: String,
    pub progress: UserLessonProgress,
}

/// Body for completing a lesson
#[derive(Debug, Clone, Default, Serialize)]
pub struct LessonCompletion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_responses: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonCompletionResponse {
    #[serde(default)]
    pub message: String,
    pub lesson_progress: UserLessonProgress,
    pub course_progress: UserCourseProgress,
}

//
// ================= Achievements & Challenges =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub achievement_type: String,
    #[serde(default)]
    pub requirements: serde_json::Value,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_metric")]
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAchievement {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub achievement: Achievement,
    pub earned_at: DateTime<Utc>,
    #[serde(default)]
    pub points_earned: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallenge {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub challenge_type: ChallengeType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub date_available: Option<NaiveDate>,
    #[serde(default)]
    pub user_attempt: Option<UserChallengeAttempt>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_today: bool,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserChallengeAttempt {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(deserialize_with = "de::id")]
    pub challenge: String,
    #[serde(default)]
    pub challenge_title: String,
    #[serde(default)]
    pub user_answer: serde_json::Value,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub points_earned: u32,
    #[serde(default)]
    pub time_taken_seconds: u32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResult {
    #[serde(default)]
    pub message: String,
    pub is_correct: bool,
    #[serde(default)]
    pub points_earned: u32,
    #[serde(default)]
    pub explanation: String,
    pub attempt: UserChallengeAttempt,
}

//
// ================= Analytics =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningAnalytics {
    #[serde(default)]
    pub total_courses_enrolled: u32,
    #[serde(default)]
    pub total_courses_completed: u32,
    #[serde(default)]
    pub total_lessons_completed: u32,
    #[serde(default, deserialize_with = "de::metric")]
    pub total_time_spent_hours: f64,
    #[serde(default, deserialize_with = "de::metric")]
    pub average_session_minutes: f64,
    #[serde(default)]
    pub total_points_earned: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub unlocked_achievements: u32,
    #[serde(default)]
    pub total_achievements: u32,
    #[serde(default)]
    pub completed_challenges: u32,
    #[serde(default)]
    pub total_challenges: u32,
    #[serde(default)]
    pub recent_achievements: Vec<UserAchievement>,
    #[serde(default)]
    pub course_progress: Vec<UserCourseProgress>,
    #[serde(default)]
    pub activity_by_date: HashMap<String, u32>,
    #[serde(default)]
    pub topic_distribution: HashMap<String, u32>,
}

impl Course {
    /// Completion in percent from the user's progress record, 0 when not enrolled
    pub fn completion_percent(&self) -> f64 {
        match &self.user_progress {
            Some(p) if p.completion_percentage > 0.0 => p.completion_percentage.min(100.0),
            Some(p) if self.total_lessons > 0 => {
                (p.lessons_completed as f64 / self.total_lessons as f64 * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }
}
