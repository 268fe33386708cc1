#![allow(dead_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// Chart payload in the labels/datasets layout the dashboards consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Pairs each label with the first dataset's value (missing values are 0).
    pub fn series(&self) -> Vec<(&str, f64)> {
        let values = self.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[]);
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), values.get(i).copied().unwrap_or(0.0)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub bar_chart: ChartData,
    #[serde(default)]
    pub pie_chart: ChartData,
    #[serde(default)]
    pub average_score: Option<f64>,
}
