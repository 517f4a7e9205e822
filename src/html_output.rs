//! HTML summary report
//!
//! One standalone `summary.html` per run: every summary table (median, MAD,
//! standard deviation per metric type) with a green-to-red gradient across
//! each row, followed by an overview of the decision taken per comparison.

use crate::decision::DecisionOutcome;
use crate::record::MetricType;
use crate::summary::SummaryTable;

/// Gradient end for the smallest value of a row
const LOW: (u8, u8, u8) = (84, 174, 99);
/// Gradient midpoint
const MID: (u8, u8, u8) = (242, 242, 242);
/// Gradient end for the largest value of a row
const HIGH: (u8, u8, u8) = (214, 96, 77);

/// A comparison that produced no decision
#[derive(Debug, Clone)]
pub struct HtmlFailure {
    pub metric: MetricType,
    pub source: String,
    pub message: String,
}

/// HTML output formatter
#[derive(Debug, Default)]
pub struct HtmlOutput {
    tables: Vec<SummaryTable>,
    outcomes: Vec<DecisionOutcome>,
    failures: Vec<HtmlFailure>,
}

impl HtmlOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: SummaryTable) {
        self.tables.push(table);
    }

    pub fn add_outcome(&mut self, outcome: DecisionOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn add_failure(&mut self, failure: HtmlFailure) {
        self.failures.push(failure);
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        caption {
            font-family: monospace;
            font-weight: bold;
            padding: 6px;
            text-align: left;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px 8px;
            font-family: monospace;
        }
        th {
            background-color: #4a90d9;
            color: white;
        }
        th.row-heading {
            text-align: left;
        }
        td.value {
            width: 8em;
            text-align: center;
        }
        td.missing {
            color: #999;
        }
        .decision-table th {
            background-color: #5cb85c;
        }
        .significant {
            font-weight: bold;
        }
        .failed {
            color: #cc0000;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    /// Background colour of a value within its row range
    fn gradient_color(value: f64, low: f64, high: f64) -> String {
        let t = if high > low {
            ((value - low) / (high - low)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let (from, to, local) = if t < 0.5 {
            (LOW, MID, t * 2.0)
        } else {
            (MID, HIGH, (t - 0.5) * 2.0)
        };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * local).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            mix(from.0, to.0),
            mix(from.1, to.1),
            mix(from.2, to.2)
        )
    }

    fn format_cell(value: Option<f64>, range: Option<(f64, f64)>) -> String {
        match (value, range) {
            (Some(v), Some((low, high))) => format!(
                r#"<td class="value" style="background-color: {}">{:.3}</td>"#,
                Self::gradient_color(v, low, high),
                v
            ),
            (Some(v), None) => format!(r#"<td class="value">{:.3}</td>"#, v),
            (None, _) => r#"<td class="value missing">nan</td>"#.to_string(),
        }
    }

    /// Render one summary table
    fn render_table(table: &SummaryTable) -> String {
        let mut html = String::new();

        html.push_str("    <table class=\"summary-table\">\n");
        html.push_str(&format!(
            "        <caption>{}</caption>\n",
            Self::escape_html(&table.caption)
        ));

        let header: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("<th>{}</th>", Self::escape_html(c)))
            .collect();
        html.push_str(&format!("        <tr><th></th>{}</tr>\n", header.join("")));

        for (i, source) in table.rows.iter().enumerate() {
            let range = table.row_range(i);
            let cells: Vec<String> = table.cells[i]
                .iter()
                .map(|&value| Self::format_cell(value, range))
                .collect();
            html.push_str(&format!(
                "        <tr><th class=\"row-heading\">{}</th>{}</tr>\n",
                Self::escape_html(source),
                cells.join("")
            ));
        }

        html.push_str("    </table>\n");
        html.push_str("    <br>\n");
        html
    }

    /// Render the decision overview
    fn render_decisions(&self) -> String {
        let mut html = String::new();

        html.push_str("    <h2>Decisions</h2>\n");
        html.push_str("    <table class=\"decision-table\">\n");
        html.push_str("        <tr><th>Metric</th><th>Source</th><th>Normal</th><th>Equal variance</th><th>Omnibus test</th><th>p-value</th><th>Post-hoc test</th></tr>\n");

        for outcome in &self.outcomes {
            let class = if outcome.significant() {
                " class=\"significant\""
            } else {
                ""
            };
            html.push_str(&format!(
                "        <tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.3e}</td><td>{}</td></tr>\n",
                class,
                outcome.metric,
                Self::escape_html(&outcome.source),
                if outcome.is_normal { "yes" } else { "no" },
                if outcome.is_equal_variance { "yes" } else { "no" },
                outcome.omnibus.test,
                outcome.omnibus.p_value,
                outcome
                    .posthoc_test()
                    .map(|t| t.name())
                    .unwrap_or("-"),
            ));
        }

        for failure in &self.failures {
            html.push_str(&format!(
                "        <tr class=\"failed\"><td>{}</td><td>{}</td><td colspan=\"5\">{}</td></tr>\n",
                failure.metric,
                Self::escape_html(&failure.source),
                Self::escape_html(&failure.message)
            ));
        }

        html.push_str("    </table>\n");
        html
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("    <title>Cluster Metrics Summary</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str("    <h1>Cluster Metrics Summary</h1>\n");

        for table in &self.tables {
            html.push_str(&Self::render_table(table));
        }

        if !self.outcomes.is_empty() || !self.failures.is_empty() {
            html.push_str(&self.render_decisions());
        }

        html.push_str("    <div class=\"footer\">\n");
        html.push_str(&format!(
            "        Generated by clusterstat {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Statistic;

    fn table() -> SummaryTable {
        SummaryTable {
            metric: MetricType::NodesCpu,
            statistic: Statistic::Median,
            caption: "Nodes CPU Usage [%] - Median".to_string(),
            rows: vec!["edge".to_string(), "infra".to_string()],
            columns: vec!["k3s".to_string(), "kubernetes".to_string()],
            cells: vec![vec![Some(10.0), Some(50.12345)], vec![None, Some(3.0)]],
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(HtmlOutput::escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(HtmlOutput::escape_html("a&b"), "a&amp;b");
        assert_eq!(HtmlOutput::escape_html("\"test\""), "&quot;test&quot;");
        assert_eq!(HtmlOutput::escape_html("'test'"), "&#39;test&#39;");
    }

    #[test]
    fn test_html_output_basic_structure() {
        let html = HtmlOutput::new().to_html();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(html.contains("<style>"));
        assert!(!html.contains("Decisions"));
    }

    #[test]
    fn test_table_values_use_three_decimals() {
        let mut output = HtmlOutput::new();
        output.add_table(table());
        let html = output.to_html();

        assert!(html.contains("<caption>Nodes CPU Usage [%] - Median</caption>"));
        assert!(html.contains(">10.000</td>"));
        assert!(html.contains(">50.123</td>"));
        assert!(html.contains(">nan</td>"));
        assert!(html.contains("<th>k3s</th><th>kubernetes</th>"));
    }

    #[test]
    fn test_row_gradient_runs_low_to_high() {
        assert_eq!(HtmlOutput::gradient_color(10.0, 10.0, 50.0), "#54ae63");
        assert_eq!(HtmlOutput::gradient_color(50.0, 10.0, 50.0), "#d6604d");
        assert_eq!(HtmlOutput::gradient_color(30.0, 10.0, 50.0), "#f2f2f2");
        // a single value in a row sits at the midpoint
        assert_eq!(HtmlOutput::gradient_color(3.0, 3.0, 3.0), "#f2f2f2");
    }

    #[test]
    fn test_failures_are_listed() {
        let mut output = HtmlOutput::new();
        output.add_failure(HtmlFailure {
            metric: MetricType::ContainersCpu,
            source: "kafka-ui".to_string(),
            message: "only <1> technology".to_string(),
        });
        let html = output.to_html();

        assert!(html.contains("Decisions"));
        assert!(html.contains("containers_cpu"));
        assert!(html.contains("only &lt;1&gt; technology"));
    }
}
