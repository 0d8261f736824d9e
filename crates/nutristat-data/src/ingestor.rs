//! Dataset loading and the statistics computed over it.

use crate::error::{DataError, DataResult};
use crate::questions::Direction;
use crate::tuple_key::tuple_key;
use nutristat_jobs::JobOutput;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of states reported by `best5` and `worst5`.
pub const TOP_N: usize = 5;

/// One survey row. Columns not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    #[serde(rename = "LocationDesc")]
    pub location: String,

    #[serde(rename = "Question")]
    pub question: String,

    #[serde(rename = "Data_Value", default, deserialize_with = "csv::invalid_option")]
    pub data_value: Option<f64>,

    #[serde(rename = "StratificationCategory1", default)]
    pub category: Option<String>,

    #[serde(rename = "Stratification1", default)]
    pub segment: Option<String>,
}

impl Record {
    fn stratification(&self) -> Option<(&str, &str)> {
        match (self.category.as_deref(), self.segment.as_deref()) {
            (Some(c), Some(s)) if !c.is_empty() && !s.is_empty() => Some((c, s)),
            _ => None,
        }
    }
}

/// Running mean that skips missing values.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            self.sum += v;
            self.count += 1;
        }
    }

    /// NaN when no value was present.
    fn value(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Converts a float to JSON. NaN and infinities become `null`.
pub fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// In-memory copy of the dataset.
#[derive(Debug, Clone)]
pub struct DataIngestor {
    source: Option<PathBuf>,
    records: Vec<Record>,
    questions: BTreeSet<String>,
}

impl DataIngestor {
    /// Loads the CSV file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }

        let reader = csv::Reader::from_path(path)?;
        let mut ingestor = Self::from_csv(reader)?;
        ingestor.source = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            rows = ingestor.records.len(),
            questions = ingestor.questions.len(),
            "Dataset loaded"
        );
        Ok(ingestor)
    }

    /// Loads CSV content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> DataResult<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> DataResult<Self> {
        let records = reader
            .deserialize::<Record>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_records(records))
    }

    /// Builds an ingestor from rows already in memory.
    pub fn from_records(records: Vec<Record>) -> Self {
        let questions = records.iter().map(|r| r.question.clone()).collect();
        Self {
            source: None,
            records,
            questions,
        }
    }

    /// Path the dataset was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct questions present in the dataset.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }

    pub fn has_question(&self, question: &str) -> bool {
        self.questions.contains(question)
    }

    fn rows_for<'a>(&'a self, question: &'a str) -> DataResult<impl Iterator<Item = &'a Record>> {
        if !self.has_question(question) {
            debug!(question, "Unknown question");
            return Err(DataError::UnknownQuestion(question.to_string()));
        }
        Ok(self.records.iter().filter(move |r| r.question == question))
    }

    /// Per-state means grouped in state-name order.
    fn grouped_state_means(&self, question: &str) -> DataResult<Vec<(String, f64)>> {
        let mut groups: BTreeMap<&str, Mean> = BTreeMap::new();
        for record in self.rows_for(question)? {
            groups
                .entry(record.location.as_str())
                .or_default()
                .push(record.data_value);
        }
        Ok(groups
            .into_iter()
            .map(|(state, mean)| (state.to_string(), mean.value()))
            .collect())
    }

    fn sorted_state_means(&self, question: &str, descending: bool) -> DataResult<Vec<(String, f64)>> {
        let mut means = self.grouped_state_means(question)?;
        sort_by_value(&mut means, descending);
        Ok(means)
    }

    fn mean_where<'a, F>(&'a self, question: &'a str, filter: F) -> DataResult<f64>
    where
        F: Fn(&Record) -> bool,
    {
        let mut mean = Mean::default();
        for record in self.rows_for(question)?.filter(|r| filter(r)) {
            mean.push(record.data_value);
        }
        Ok(mean.value())
    }

    /// Mean per state, ascending by value.
    pub fn states_mean(&self, question: &str) -> DataResult<JobOutput> {
        let means = self.sorted_state_means(question, false)?;
        Ok(to_output(means))
    }

    /// Mean for one state, as `{state: mean}`.
    pub fn state_mean(&self, state: &str, question: &str) -> DataResult<JobOutput> {
        let mean = self.mean_where(question, |r| r.location == state)?;
        Ok(JobOutput::from_iter([(state, number(mean))]))
    }

    /// The five states with the best means, best first.
    pub fn best5(&self, question: &str) -> DataResult<JobOutput> {
        let descending = Direction::of(question) == Direction::HigherIsBetter;
        let means = self.sorted_state_means(question, descending)?;
        Ok(to_output(means.into_iter().take(TOP_N)))
    }

    /// The five states with the worst means, worst first.
    pub fn worst5(&self, question: &str) -> DataResult<JobOutput> {
        let descending = Direction::of(question) == Direction::LowerIsBetter;
        let means = self.sorted_state_means(question, descending)?;
        Ok(to_output(means.into_iter().take(TOP_N)))
    }

    fn global_mean_value(&self, question: &str) -> DataResult<f64> {
        self.mean_where(question, |_| true)
    }

    /// Mean over every row for the question, as `{"global_mean": mean}`.
    pub fn global_mean(&self, question: &str) -> DataResult<JobOutput> {
        let mean = self.global_mean_value(question)?;
        Ok(JobOutput::from_iter([("global_mean", number(mean))]))
    }

    /// `global_mean - state_mean` per state, in `states_mean` order.
    pub fn diff_from_mean(&self, question: &str) -> DataResult<JobOutput> {
        let global = self.global_mean_value(question)?;
        let means = self.sorted_state_means(question, false)?;
        Ok(to_output(
            means.into_iter().map(|(state, mean)| (state, global - mean)),
        ))
    }

    /// `global_mean - state_mean` for one state.
    pub fn state_diff_from_mean(&self, state: &str, question: &str) -> DataResult<JobOutput> {
        let global = self.global_mean_value(question)?;
        let mean = self.mean_where(question, |r| r.location == state)?;
        Ok(JobOutput::from_iter([(state, number(global - mean))]))
    }

    /// Mean per (state, category, segment), keyed by the tuple string and
    /// sorted by that key.
    pub fn mean_by_category(&self, question: &str) -> DataResult<JobOutput> {
        let mut groups: BTreeMap<String, Mean> = BTreeMap::new();
        for record in self.rows_for(question)? {
            if let Some((category, segment)) = record.stratification() {
                groups
                    .entry(tuple_key(&[record.location.as_str(), category, segment]))
                    .or_default()
                    .push(record.data_value);
            }
        }
        Ok(to_output(
            groups.into_iter().map(|(key, mean)| (key, mean.value())),
        ))
    }

    /// Mean per (category, segment) for one state, as
    /// `{state: {"('<category>', '<segment>')": mean}}`.
    pub fn state_mean_by_category(&self, state: &str, question: &str) -> DataResult<JobOutput> {
        let mut groups: BTreeMap<(&str, &str), Mean> = BTreeMap::new();
        for record in self.rows_for(question)?.filter(|r| r.location == state) {
            if let Some(key) = record.stratification() {
                groups.entry(key).or_default().push(record.data_value);
            }
        }

        let inner: Map<String, Value> = groups
            .into_iter()
            .map(|((category, segment), mean)| {
                (tuple_key(&[category, segment]), number(mean.value()))
            })
            .collect();

        Ok(JobOutput::from_iter([(state, Value::Object(inner))]))
    }
}

/// Stable sort by value; NaN always sorts last.
fn sort_by_value(entries: &mut [(String, f64)], descending: bool) {
    entries.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    });
}

fn to_output<I>(entries: I) -> JobOutput
where
    I: IntoIterator<Item = (String, f64)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key, number(value)))
        .collect()
}
