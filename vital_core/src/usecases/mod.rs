//! Application operations. Each use-case owns the repositories it needs and
//! performs a single business action.

pub mod goals;
pub mod logs;
pub mod prediction;
pub mod profile;

pub use goals::{CreateHealthGoalUseCase, GetHealthGoalsUseCase, UpdateGoalProgressUseCase};
pub use logs::{GetHealthLogsUseCase, LogHealthMetricUseCase, SyncOfflineLogsUseCase, SyncReport};
pub use prediction::GetHealthPredictionUseCase;
pub use profile::{GetUserProfileUseCase, UpdateUserProfileUseCase};

#[cfg(test)]
pub(crate) mod testing;
