//! Text rendering for the analysis results. Everything here is a pure
//! value-to-string transform; printing is the caller's business.

use crate::analysis::cluster::{ClusterAssignment, Linkage};
use crate::analysis::correlation::{CorrelatedPair, CorrelationMatrix};
use crate::analysis::rolling::RollingSeries;
use crate::analysis::summary::StatsSummary;
use std::fmt::Write;

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn shade(r: f64) -> char {
    // Map [-1, 1] onto the ramp by magnitude-independent position.
    let normalized = (r + 1.0) / 2.0;
    let idx = (normalized * (SHADES.len() - 1) as f64) as usize;
    SHADES[idx.min(SHADES.len() - 1)]
}

/// Shade-character heatmap of the correlation matrix. Undefined entries
/// render as '·' so holes stay visible.
pub fn render_heatmap(matrix: &CorrelationMatrix) -> String {
    let names = matrix.names();
    let label_width = names.iter().map(|s| s.len()).max().unwrap_or(4);
    let mut out = String::new();

    let _ = write!(out, "{:>width$} ", "", width = label_width);
    for name in names {
        let _ = write!(out, "{}", name.chars().next().unwrap_or('?'));
    }
    out.push('\n');

    for (i, name) in names.iter().enumerate() {
        let _ = write!(out, "{:>width$} ", name, width = label_width);
        for j in 0..names.len() {
            match matrix.get(i, j) {
                Some(r) => out.push(shade(r)),
                None => out.push('·'),
            }
        }
        out.push('\n');
    }
    out
}

/// Ranked pair listing from a correlation scan.
pub fn render_pairs(pairs: &[CorrelatedPair]) -> String {
    let mut out = String::new();
    for pair in pairs {
        let _ = writeln!(
            out,
            "{} - {}: {:.3} (p-value: {:.3e}, n={})",
            pair.first, pair.second, pair.correlation, pair.p_value, pair.observations
        );
    }
    out
}

/// Merge-tree listing readable as a dendrogram: leaves are named, merged
/// clusters referenced as #id.
pub fn render_linkage(linkage: &Linkage) -> String {
    let n = linkage.labels.len();
    let describe = |id: usize| {
        if id < n {
            linkage.labels[id].clone()
        } else {
            format!("#{id}")
        }
    };

    let mut out = String::new();
    for (step, merge) in linkage.steps.iter().enumerate() {
        let _ = writeln!(
            out,
            "step {:>3}: {} + {} -> #{} (distance {:.4}, size {})",
            step + 1,
            describe(merge.left),
            describe(merge.right),
            n + step,
            merge.distance,
            merge.size
        );
    }
    out
}

/// Cluster membership listing, one line per cluster id.
pub fn render_clusters(assignment: &ClusterAssignment) -> String {
    let mut out = String::new();
    for cluster in 0..assignment.k {
        let members = assignment.members(cluster);
        let _ = writeln!(out, "Cluster {}: {}", cluster, members.join(", "));
    }
    out
}

/// Sparkline per rolling series over its defined range; undefined entries
/// render as spaces so the timeline stays aligned.
pub fn render_rolling(series_list: &[RollingSeries]) -> String {
    let mut out = String::new();
    for series in series_list {
        let line: String = series
            .values
            .iter()
            .map(|value| match value {
                // Correlations live in [-1, 1]; fixed scale keeps series
                // comparable across pairs.
                Some(r) => {
                    let normalized = (r + 1.0) / 2.0;
                    let idx = (normalized * (SPARKS.len() - 1) as f64) as usize;
                    SPARKS[idx.min(SPARKS.len() - 1)]
                }
                None => ' ',
            })
            .collect();
        let _ = writeln!(
            out,
            "{} - {} [{}] ({} of {} defined)",
            series.first,
            series.second,
            line,
            series.defined_count(),
            series.values.len()
        );
    }
    out
}

/// Aligned statistics table.
pub fn render_summary(stats: &StatsSummary) -> String {
    let fmt_opt = |value: Option<f64>| match value {
        Some(v) => format!("{v:.3}"),
        None => "undefined".to_string(),
    };
    let mut out = String::new();
    let _ = writeln!(out, "Count:    {}", stats.count);
    let _ = writeln!(out, "Mean:     {:.3}", stats.mean);
    let _ = writeln!(out, "Median:   {:.3}", stats.median);
    let _ = writeln!(out, "Std Dev:  {:.3}", stats.std_dev);
    let _ = writeln!(out, "Min:      {:.3}", stats.min);
    let _ = writeln!(out, "Max:      {:.3}", stats.max);
    let _ = writeln!(out, "Skewness: {}", fmt_opt(stats.skewness));
    let _ = writeln!(out, "Kurtosis: {}", fmt_opt(stats.kurtosis));
    out
}
