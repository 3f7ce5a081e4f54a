//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!();
        println!("{} {}", style("✓").green().bold(), message);
    } else {
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display warning outro
pub fn outro_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        println!();
        println!("{} {}", style("!").yellow().bold(), message);
    } else {
        println!("{} {}", style("[WARN]").yellow(), message);
    }
}
