//! Terminal rendering of session snapshots.

use calcula_core::parsing::format_brl;
use calcula_core::price::PriceItem;
use calcula_core::session::SessionSnapshot;
use colored::Colorize;

const PENDING_PLACEHOLDER: &str = "reading label...";

/// One line per price, without colours.
pub fn price_line(price: &PriceItem) -> String {
    if price.is_pending() {
        return format!("{:<10} {}", price.id, PENDING_PLACEHOLDER);
    }
    if price.status.is_error() {
        let name = match price.display_name() {
            "" => "could not read this price",
            name => name,
        };
        return format!("{:<10} ! {}", price.id, name);
    }
    format!(
        "{:<10} {:<24} {:>3} x {:>14}",
        price.id,
        price.display_name(),
        price.quantity,
        format_brl(price.display_value())
    )
}

pub fn total_line(snapshot: &SessionSnapshot) -> String {
    format!("Total: {}", format_brl(Some(snapshot.total)))
}

pub fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("{}", format!("Session {}", snapshot.id).bold());
    if snapshot.is_empty() {
        println!("{}", "  No prices yet.".bright_black());
    }
    for price in &snapshot.prices {
        let line = format!("  {}", price_line(price));
        if price.is_pending() {
            println!("{}", line.bright_black());
        } else if price.status.is_error() {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
    println!("{}", total_line(snapshot).green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}
