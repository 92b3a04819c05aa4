use serde::{Deserialize, Serialize};

/// One intraday close.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Provider timestamp, e.g. "2024-05-17 19:55:00". Sorts chronologically.
    pub timestamp: String,
    pub close: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: impl Into<String>, close: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            close,
        }
    }
}

/// Close prices in ascending chronological order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<SeriesPoint>);

impl Series {
    /// Build a series from points in any order.
    pub fn new(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Self(points)
    }

    /// Keep only the `limit` most recent points.
    pub fn keep_recent(mut self, limit: usize) -> Self {
        if self.0.len() > limit {
            self.0.drain(..self.0.len() - limit);
        }
        self
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.0
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|point| point.close)
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
