//! Output helper functions for consistent styled messages.
//!
//! Diagnostics go to stderr so stdout carries only permission listings.

use super::colors::SemanticStyle;

/// Prints an error message with an X mark.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".error(), msg);
}

/// Prints a warning message with the `[Warning]` tag.
pub fn print_warn(msg: &str) {
    eprintln!("{} {}", "[Warning]".warning(), msg);
}

/// Prints the heading that opens one namespace's listing.
pub fn print_namespace_header(namespace: &str) {
    println!(
        "\n{} {}",
        "Rules for Namespace:".header(),
        format!("'{namespace}'").namespace()
    );
}
