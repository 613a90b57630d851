use comfy_table::{Cell, CellAlignment, Table};
use crate::format::{format_currency, format_number};
use crate::util::new_table;

/// Widest bar drawn, in characters
const BAR_WIDTH: usize = 40;

/// Category chart: one value per label
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BarChart {
    pub(crate) title: String,
    pub(crate) labels: Vec<String>,
    pub(crate) values: Vec<f64>,
}

/// Part-of-whole chart
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ShareChart {
    pub(crate) title: String,
    pub(crate) slices: Vec<(String, f64)>,
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.max(1))
}

impl BarChart {
    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn to_table(&self) -> Table {
        let max = self.values.iter().cloned().fold(0.0, f64::max);
        let mut table = new_table();
        table.set_header(vec!["", "Valor", ""]);
        for (label, value) in self.labels.iter().zip(self.values.iter()) {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(format_currency(*value)).set_alignment(CellAlignment::Right),
                Cell::new(bar(*value, max)),
            ]);
        }
        table
    }
}

impl ShareChart {
    pub(crate) fn total(&self) -> f64 {
        self.slices.iter().map(|(_, v)| v).sum()
    }

    /// Percentage of each slice over the slices shown
    pub(crate) fn percentages(&self) -> Vec<f64> {
        let total = self.total();
        self.slices.iter()
            .map(|(_, v)| if total == 0.0 { 0.0 } else { v / total * 100.0 })
            .collect()
    }

    pub(crate) fn to_table(&self) -> Table {
        let max = self.slices.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let mut table = new_table();
        table.set_header(vec!["", "Valor", "%", ""]);
        for ((label, value), percent) in self.slices.iter().zip(self.percentages()) {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(format_currency(*value)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{}%", format_number(percent, 2))).set_alignment(CellAlignment::Right),
                Cell::new(bar(*value, max)),
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_length() {
        assert_eq!(bar(10.0, 10.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0.001, 10.0).chars().count(), 1);
        assert_eq!(bar(0.0, 10.0), "");
        assert_eq!(bar(-3.0, 10.0), "");
    }

    #[test]
    fn test_share_percentages() {
        let chart = ShareChart {
            title: "CC".to_string(),
            slices: vec![("A".to_string(), 300.0), ("B".to_string(), 100.0)],
        };
        assert_eq!(chart.percentages(), vec![75.0, 25.0]);
        let rendered = chart.to_table().to_string();
        assert!(rendered.contains("75,00%"));
        assert!(rendered.contains("R$ 300,00"));
    }

    #[test]
    fn test_bar_chart_table() {
        let chart = BarChart {
            title: "Custo".to_string(),
            labels: vec!["Jan".to_string(), "Fev".to_string()],
            values: vec![1000.0, 0.0],
        };
        let rendered = chart.to_table().to_string();
        assert!(rendered.contains("Jan"));
        assert!(rendered.contains("R$ 1.000,00"));
        assert!(!chart.is_empty());
    }
}
