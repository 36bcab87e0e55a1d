//! Health log entries. Logs are append-only facts with no update path.

use super::ids::{generate_id, parse_iso, to_iso};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "log";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    Weight,
    BloodPressure,
    Steps,
    HeartRate,
    Sleep,
    WaterIntake,
    Exercise,
    Medication,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Weight => "weight",
            LogType::BloodPressure => "blood_pressure",
            LogType::Steps => "steps",
            LogType::HeartRate => "heart_rate",
            LogType::Sleep => "sleep",
            LogType::WaterIntake => "water_intake",
            LogType::Exercise => "exercise",
            LogType::Medication => "medication",
        }
    }

    /// Unit used when the caller does not name one
    pub fn default_unit(&self) -> &'static str {
        match self {
            LogType::Weight => "kg",
            LogType::BloodPressure => "mmHg",
            LogType::Steps => "steps",
            LogType::HeartRate => "bpm",
            LogType::Sleep => "hours",
            LogType::WaterIntake => "ml",
            LogType::Exercise => "minutes",
            LogType::Medication => "dose",
        }
    }
}

string_enum_impls!(
    LogType,
    "log type",
    [
        LogType::Weight,
        LogType::BloodPressure,
        LogType::Steps,
        LogType::HeartRate,
        LogType::Sleep,
        LogType::WaterIntake,
        LogType::Exercise,
        LogType::Medication,
    ]
);

#[derive(Clone, Debug)]
pub struct NewHealthLog {
    pub user_id: String,
    pub log_type: LogType,
    pub value: f64,
    /// Defaults to [`LogType::default_unit`]
    pub unit: Option<String>,
    pub notes: Option<String>,
    /// When the measurement happened; defaults to now
    pub logged_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthLog {
    id: String,
    user_id: String,
    log_type: LogType,
    value: f64,
    unit: String,
    notes: Option<String>,
    logged_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl HealthLog {
    pub fn create(new: NewHealthLog) -> Result<Self> {
        if !new.value.is_finite() {
            return Err(Error::InvalidValue(format!(
                "{} value must be a finite number",
                new.log_type
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: generate_id(ID_PREFIX),
            user_id: new.user_id,
            log_type: new.log_type,
            value: new.value,
            unit: new
                .unit
                .unwrap_or_else(|| new.log_type.default_unit().to_string()),
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            logged_at: new.logged_at.unwrap_or(now),
            created_at: now,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn logged_at(&self) -> DateTime<Utc> {
        self.logged_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn to_api_request(&self) -> HealthLogPayload {
        HealthLogPayload {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            log_type: self.log_type,
            value: self.value,
            unit: self.unit.clone(),
            notes: self.notes.clone(),
            logged_at: to_iso(&self.logged_at),
            created_at: to_iso(&self.created_at),
        }
    }
}

/// Wire shape of a log entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthLogPayload {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub logged_at: String,
    pub created_at: String,
}

impl TryFrom<HealthLogPayload> for HealthLog {
    type Error = Error;

    fn try_from(payload: HealthLogPayload) -> Result<Self> {
        Ok(HealthLog {
            logged_at: parse_iso("logged_at", &payload.logged_at)?,
            created_at: parse_iso("created_at", &payload.created_at)?,
            id: payload.id,
            user_id: payload.user_id,
            log_type: payload.log_type,
            value: payload.value,
            unit: payload.unit,
            notes: payload.notes,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_log(log_type: LogType, value: f64) -> HealthLog {
    HealthLog::create(NewHealthLog {
        user_id: "user_1".into(),
        log_type,
        value,
        unit: None,
        notes: None,
        logged_at: None,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_create_stamps_identity_and_defaults() {
        let log = sample_log(LogType::HeartRate, 62.0);
        assert!(log.id().starts_with("log_"));
        assert_eq!(log.unit(), "bpm");
        assert_eq!(log.logged_at(), log.created_at());
        assert_eq!(log.notes(), None);
    }

    #[test]
    fn test_logged_at_is_distinct_from_created_at() {
        let yesterday = Utc::now() - Duration::days(1);
        let log = HealthLog::create(NewHealthLog {
            user_id: "user_1".into(),
            log_type: LogType::Sleep,
            value: 7.5,
            unit: Some("h".into()),
            notes: Some("restless".into()),
            logged_at: Some(yesterday),
        })
        .unwrap();

        assert_eq!(log.logged_at(), yesterday);
        assert!(log.created_at() > log.logged_at());
        assert_eq!(log.unit(), "h");
        assert_eq!(log.notes(), Some("restless"));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let result = HealthLog::create(NewHealthLog {
            user_id: "user_1".into(),
            log_type: LogType::Steps,
            value: f64::INFINITY,
            unit: None,
            notes: None,
            logged_at: None,
        });
        assert!(matches!(result, Err(Error::InvalidValue(_))));
    }

    #[test]
    fn test_api_request_shape() {
        let log = sample_log(LogType::BloodPressure, 120.0);
        let json = serde_json::to_value(log.to_api_request()).unwrap();
        assert_eq!(json["type"], "blood_pressure");
        assert_eq!(json["unit"], "mmHg");
        assert!(json["logged_at"].is_string());

        let restored = HealthLog::try_from(log.to_api_request()).unwrap();
        assert_eq!(restored.id(), log.id());
        assert_eq!(restored.log_type(), LogType::BloodPressure);
    }

    #[test]
    fn test_parse_log_type() {
        assert_eq!("water_intake".parse::<LogType>().unwrap(), LogType::WaterIntake);
        assert!("glucose".parse::<LogType>().is_err());
    }
}
