//! Statistics reporting.

use std::path::Path;

use console::style;

use crate::download::DownloadSummary;

/// Print the end-of-run statistics.
pub fn print_summary(summary: &DownloadSummary, output_dir: &Path) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Download Statistics:").bold());
    println!("  Illustrations: {}", summary.items);
    println!("  Downloaded:    {}", style(summary.success).green());
    println!("  Skipped:       {} (already on disk)", style(summary.skipped).yellow());
    if summary.failed > 0 {
        println!("  Failed:        {}", style(summary.failed).red());
    }
    println!("  Total files:   {}", summary.total());
    println!("  Saved to:      {}", output_dir.display());
    println!("{}", style("═".repeat(50)).dim());
}
