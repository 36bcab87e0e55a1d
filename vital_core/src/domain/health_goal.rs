//! Health goal entity and progress tracking.

use super::ids::{generate_id, next_timestamp, parse_iso, to_iso};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "goal";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightTarget,
    Activity,
    WaterIntake,
    Sleep,
    StepCount,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::WeightTarget => "weight_target",
            GoalType::Activity => "activity",
            GoalType::WaterIntake => "water_intake",
            GoalType::Sleep => "sleep",
            GoalType::StepCount => "step_count",
        }
    }
}

string_enum_impls!(
    GoalType,
    "goal type",
    [
        GoalType::WeightTarget,
        GoalType::Activity,
        GoalType::WaterIntake,
        GoalType::Sleep,
        GoalType::StepCount,
    ]
);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Paused => "paused",
        }
    }
}

string_enum_impls!(
    GoalStatus,
    "goal status",
    [GoalStatus::Active, GoalStatus::Completed, GoalStatus::Paused]
);

#[derive(Clone, Debug)]
pub struct NewHealthGoal {
    pub user_id: String,
    pub goal_type: GoalType,
    pub description: String,
    pub target_value: f64,
    pub unit: String,
    pub start_date: DateTime<Utc>,
    pub target_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthGoal {
    id: String,
    user_id: String,
    goal_type: GoalType,
    description: String,
    target_value: f64,
    current_value: f64,
    unit: String,
    status: GoalStatus,
    start_date: DateTime<Utc>,
    target_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HealthGoal {
    /// A new active goal with no progress
    pub fn create(new: NewHealthGoal) -> Result<Self> {
        if !new.target_value.is_finite() || new.target_value < 0.0 {
            return Err(Error::InvalidValue(format!(
                "goal target must be a non-negative number, got {}",
                new.target_value
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: generate_id(ID_PREFIX),
            user_id: new.user_id,
            goal_type: new.goal_type,
            description: new.description,
            target_value: new.target_value,
            current_value: 0.0,
            unit: new.unit,
            status: GoalStatus::Active,
            start_date: new.start_date,
            target_date: new.target_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// A copy with `current_value` replaced
    ///
    /// The goal is `Completed` exactly when the new value reaches the target.
    /// Dropping back below the target reopens a completed goal; a paused
    /// goal stays paused until it completes.
    pub fn update_progress(&self, current_value: f64) -> Self {
        let status = if current_value >= self.target_value {
            GoalStatus::Completed
        } else if self.status == GoalStatus::Paused {
            GoalStatus::Paused
        } else {
            GoalStatus::Active
        };
        if status != self.status {
            tracing::debug!("Goal {} status {} -> {}", self.id, self.status, status);
        }
        Self {
            current_value,
            status,
            ..self.touched()
        }
    }

    /// A paused copy; completed goals are returned unchanged
    pub fn pause(&self) -> Self {
        match self.status {
            GoalStatus::Active => Self {
                status: GoalStatus::Paused,
                ..self.touched()
            },
            GoalStatus::Paused | GoalStatus::Completed => self.clone(),
        }
    }

    /// An active copy of a paused goal
    pub fn resume(&self) -> Self {
        match self.status {
            GoalStatus::Paused => Self {
                status: GoalStatus::Active,
                ..self.touched()
            },
            GoalStatus::Active | GoalStatus::Completed => self.clone(),
        }
    }

    fn touched(&self) -> Self {
        Self {
            updated_at: next_timestamp(self.updated_at),
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn goal_type(&self) -> GoalType {
        self.goal_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn status(&self) -> GoalStatus {
        self.status
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn target_date(&self) -> Option<DateTime<Utc>> {
        self.target_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    /// `current / target` as a percentage in [0, 100]; 0 when the target is 0
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value == 0.0 {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).clamp(0.0, 100.0)
    }

    /// Whole days until `target_date`, negative once overdue
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.target_date.map(|target| (target - now).num_days())
    }

    pub fn to_api_request(&self) -> HealthGoalPayload {
        HealthGoalPayload {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            goal_type: self.goal_type,
            description: self.description.clone(),
            target_value: self.target_value,
            current_value: self.current_value,
            unit: self.unit.clone(),
            status: self.status,
            start_date: to_iso(&self.start_date),
            target_date: self.target_date.as_ref().map(to_iso),
            created_at: to_iso(&self.created_at),
            updated_at: to_iso(&self.updated_at),
        }
    }
}

/// Wire shape of a goal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthGoalPayload {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub description: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub status: GoalStatus,
    pub start_date: String,
    #[serde(default)]
    pub target_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<HealthGoalPayload> for HealthGoal {
    type Error = Error;

    fn try_from(payload: HealthGoalPayload) -> Result<Self> {
        let target_date = payload
            .target_date
            .as_deref()
            .map(|value| parse_iso("target_date", value))
            .transpose()?;
        let goal = HealthGoal {
            start_date: parse_iso("start_date", &payload.start_date)?,
            target_date,
            created_at: parse_iso("created_at", &payload.created_at)?,
            updated_at: parse_iso("updated_at", &payload.updated_at)?,
            id: payload.id,
            user_id: payload.user_id,
            goal_type: payload.goal_type,
            description: payload.description,
            target_value: payload.target_value,
            current_value: payload.current_value,
            unit: payload.unit,
            status: payload.status,
        };
        // The backend's status is advisory; completion always follows the values.
        Ok(goal.reconciled())
    }
}

impl HealthGoal {
    fn reconciled(mut self) -> Self {
        if self.current_value >= self.target_value {
            self.status = GoalStatus::Completed;
        } else if self.status == GoalStatus::Completed {
            self.status = GoalStatus::Active;
        }
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_goal(target_value: f64) -> HealthGoal {
    HealthGoal::create(NewHealthGoal {
        user_id: "user_1".into(),
        goal_type: GoalType::StepCount,
        description: "Walk more".into(),
        target_value,
        unit: "steps".into(),
        start_date: Utc::now(),
        target_date: None,
    })
    .unwrap()
}
