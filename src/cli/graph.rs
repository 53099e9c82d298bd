//! Graph command - manifest statistics and project-wide cycles

use crate::graph::ProjectGraph;
use anyhow::Result;
use console::style;

/// Clusters listed in text output before truncating
const MAX_LISTED: usize = 50;

/// Run the graph command
pub fn run(graph: &ProjectGraph, format: &str) -> Result<()> {
    let stats = graph.stats();
    let clusters = graph.cyclic_clusters();

    if format == "json" {
        let json = serde_json::json!({
            "stats": stats,
            "cyclic_clusters": clusters,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("\n{} Project Graph\n", style("📊").bold());
    println!("  Nodes:       {}", style(stats.nodes).cyan());
    println!("  Units:       {}", style(stats.units).cyan());
    println!("  References:  {}", style(stats.edges).cyan());
    if stats.unavailable > 0 {
        println!("  Unavailable: {}", style(stats.unavailable).yellow());
    }
    if stats.dangling > 0 {
        println!("  Dangling:    {}", style(stats.dangling).yellow());
    }

    if clusters.is_empty() {
        println!("\n{} No circular references", style("✓").green());
        return Ok(());
    }

    println!(
        "\n{} Cyclic clusters ({})\n",
        style("⚠").red(),
        clusters.len()
    );
    for (i, cluster) in clusters.iter().take(MAX_LISTED).enumerate() {
        let names: Vec<&str> = cluster.iter().map(|n| n.as_str()).collect();
        println!("  {:>3}. {}", i + 1, style(names.join(", ")).cyan());
    }
    if clusters.len() > MAX_LISTED {
        println!("  ... and {} more", clusters.len() - MAX_LISTED);
    }
    Ok(())
}
