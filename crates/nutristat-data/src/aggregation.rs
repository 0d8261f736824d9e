//! Named aggregations and their binding to job tasks.

use crate::error::{DataError, DataResult};
use crate::ingestor::DataIngestor;
use nutristat_jobs::{JobOutput, JobResult, Task, TaskFn, TaskInput};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The statistics the server can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    StatesMean,
    StateMean,
    Best5,
    Worst5,
    GlobalMean,
    DiffFromMean,
    StateDiffFromMean,
    MeanByCategory,
    StateMeanByCategory,
}

impl Aggregation {
    /// Every aggregation, in route order.
    pub const ALL: [Aggregation; 9] = [
        Aggregation::StatesMean,
        Aggregation::StateMean,
        Aggregation::Best5,
        Aggregation::Worst5,
        Aggregation::GlobalMean,
        Aggregation::DiffFromMean,
        Aggregation::StateDiffFromMean,
        Aggregation::MeanByCategory,
        Aggregation::StateMeanByCategory,
    ];

    /// Name used in routes and task names.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Aggregation::StatesMean => "states_mean",
            Aggregation::StateMean => "state_mean",
            Aggregation::Best5 => "best5",
            Aggregation::Worst5 => "worst5",
            Aggregation::GlobalMean => "global_mean",
            Aggregation::DiffFromMean => "diff_from_mean",
            Aggregation::StateDiffFromMean => "state_diff_from_mean",
            Aggregation::MeanByCategory => "mean_by_category",
            Aggregation::StateMeanByCategory => "state_mean_by_category",
        }
    }

    /// True for the operations scoped to a single state.
    pub const fn requires_state(&self) -> bool {
        matches!(
            self,
            Aggregation::StateMean
                | Aggregation::StateDiffFromMean
                | Aggregation::StateMeanByCategory
        )
    }

    /// Runs the aggregation against the dataset.
    pub fn apply(&self, ingestor: &DataIngestor, input: &TaskInput) -> DataResult<JobOutput> {
        let question = input.question.as_str();
        let state = || {
            input
                .state
                .as_deref()
                .ok_or(DataError::MissingArgument("state"))
        };

        match self {
            Aggregation::StatesMean => ingestor.states_mean(question),
            Aggregation::StateMean => ingestor.state_mean(state()?, question),
            Aggregation::Best5 => ingestor.best5(question),
            Aggregation::Worst5 => ingestor.worst5(question),
            Aggregation::GlobalMean => ingestor.global_mean(question),
            Aggregation::DiffFromMean => ingestor.diff_from_mean(question),
            Aggregation::StateDiffFromMean => ingestor.state_diff_from_mean(state()?, question),
            Aggregation::MeanByCategory => ingestor.mean_by_category(question),
            Aggregation::StateMeanByCategory => {
                ingestor.state_mean_by_category(state()?, question)
            }
        }
    }

    /// Binds the aggregation to a shared dataset as a job function.
    pub fn task_fn(self, ingestor: Arc<DataIngestor>) -> TaskFn {
        Arc::new(move |input: &TaskInput| -> JobResult<JobOutput> {
            Ok(self.apply(&ingestor, input)?)
        })
    }

    /// Builds a job task, checking that a state is present when required.
    pub fn task(
        self,
        ingestor: Arc<DataIngestor>,
        question: impl Into<String>,
        state: Option<String>,
    ) -> DataResult<Task> {
        let task = Task::new(self.as_str(), self.task_fn(ingestor), question);
        if !self.requires_state() {
            return Ok(task);
        }
        match state {
            Some(state) => Ok(task.with_state(state)),
            None => Err(DataError::MissingArgument("state")),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aggregation::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DataError::UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::Record;
    use serde_json::json;

    fn ingestor() -> Arc<DataIngestor> {
        Arc::new(DataIngestor::from_records(vec![Record {
            location: "Ohio".to_string(),
            question: "Q".to_string(),
            data_value: Some(12.0),
            category: Some("Total".to_string()),
            segment: Some("Total".to_string()),
        }]))
    }

    #[test]
    fn test_names_round_trip() {
        for aggregation in Aggregation::ALL {
            assert_eq!(aggregation.as_str().parse::<Aggregation>().unwrap(), aggregation);
            assert_eq!(
                serde_json::to_value(aggregation).unwrap(),
                json!(aggregation.as_str())
            );
        }
        assert!(matches!(
            "median".parse::<Aggregation>(),
            Err(DataError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_state_requirements() {
        let scoped: Vec<_> = Aggregation::ALL
            .into_iter()
            .filter(Aggregation::requires_state)
            .collect();
        assert_eq!(
            scoped,
            vec![
                Aggregation::StateMean,
                Aggregation::StateDiffFromMean,
                Aggregation::StateMeanByCategory
            ]
        );
    }

    #[test]
    fn test_task_requires_state() {
        let err = Aggregation::StateMean
            .task(ingestor(), "Q", None)
            .unwrap_err();
        assert!(matches!(err, DataError::MissingArgument("state")));
    }

    #[test]
    fn test_task_runs_bound_aggregation() {
        let task = Aggregation::StateMean
            .task(ingestor(), "Q", Some("Ohio".to_string()))
            .unwrap();
        assert_eq!(task.name(), "state_mean");

        let output = task.run().unwrap();
        assert_eq!(serde_json::to_value(&output).unwrap(), json!({"Ohio": 12.0}));
    }

    #[test]
    fn test_state_is_dropped_for_unscoped_aggregations() {
        let task = Aggregation::GlobalMean
            .task(ingestor(), "Q", Some("Ohio".to_string()))
            .unwrap();
        assert!(task.input().state.is_none());
    }

    #[test]
    fn test_unknown_question_surfaces_as_job_error() {
        let task = Aggregation::Best5.task(ingestor(), "Nope", None).unwrap();
        let err = task.run().unwrap_err();
        assert!(err.to_string().contains("Invalid question: Nope"));
    }
}
