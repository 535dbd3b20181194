//! Console output utilities.

use console::style;

use crate::config::Config;
use crate::resolver::QueryDescriptor;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════╗
║     pixiv-downloader                      ║
║     search and ranking illustration fetch ║
╚═══════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print what is about to run and with which limits.
pub fn print_run_summary(query: &QueryDescriptor, config: &Config) {
    println!();
    println!("{}", style("Run:").bold());
    println!("  Query:     {}", query);
    println!("  Directory: {}", config.download.output_dir.display());
    println!(
        "  Requests:  {:.1}s apart, {} attempt(s), {}s timeout",
        config.download.delay, config.download.retry_times, config.download.timeout
    );
    if config.proxy.enabled {
        println!("  Proxy:     enabled");
    }
    println!();
}
