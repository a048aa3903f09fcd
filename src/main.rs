use correlation_toolkit::analysis::cluster::ClusterEngine;
use correlation_toolkit::analysis::correlation::CorrelationEngine;
use correlation_toolkit::analysis::rolling::RollingCorrelationTracker;
use correlation_toolkit::analysis::summary;
use correlation_toolkit::config::Config;
use correlation_toolkit::data::loader::DataLoader;
use correlation_toolkit::report;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default("config/analysis.yaml")?;

    // Data file path from the command line, falling back to the config.
    let data_path = env::args().nth(1).unwrap_or_else(|| config.data_path.clone());

    println!("Loading data from: {}", data_path);
    let prices = DataLoader::load_prices(&data_path)?;
    let table = if config.use_returns {
        prices.pct_change()?
    } else {
        prices
    };

    println!(
        "\nData shape: {} time periods × {} instruments",
        table.len(),
        table.n_instruments()
    );

    let engine = CorrelationEngine::new(&table)?;
    let matrix = engine.matrix();

    println!("\n=== Static Correlation Analysis ===");
    let pairs = engine.scan(config.analysis.correlation_threshold)?;
    println!(
        "\n{} pairs above |correlation| > {}",
        pairs.len(),
        config.analysis.correlation_threshold
    );
    println!("\nTop {} highly correlated pairs:", config.analysis.top_pairs);
    let top = &pairs[..pairs.len().min(config.analysis.top_pairs)];
    print!("{}", report::render_pairs(top));

    println!("\n=== Correlation Heatmap ===\n");
    print!("{}", report::render_heatmap(&matrix));

    println!(
        "\n=== Rolling Correlation Analysis (Window: {}) ===\n",
        config.analysis.rolling_window
    );
    let tracker = RollingCorrelationTracker::new(&table, config.analysis.rolling_window)?;
    let rolling = tracker.track_pairs(top)?;
    print!("{}", report::render_rolling(&rolling));

    println!("\n=== Hierarchical Clustering (Ward) ===\n");
    match ClusterEngine::ward_linkage(&matrix) {
        Ok(linkage) => print!("{}", report::render_linkage(&linkage)),
        Err(err) => println!("Skipping linkage: {err}"),
    }

    println!(
        "\n=== Cluster Analysis (K-means, {} clusters) ===\n",
        config.analysis.cluster_count
    );
    let assignment = ClusterEngine::partition(
        &table,
        config.analysis.cluster_count,
        config.analysis.kmeans_seed,
    )?;
    print!("{}", report::render_clusters(&assignment));

    println!("\n=== Correlation Statistics ===\n");
    let stats = summary::summarize(&matrix)?;
    print!("{}", report::render_summary(&stats));

    Ok(())
}
