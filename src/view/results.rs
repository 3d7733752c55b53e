//! Result list rendering

use crate::api::Product;
use crate::engine::EngineStatus;
use colored::Colorize;
use std::fmt::Write;

/// Shown in place of the list when a finished query matched nothing
pub const EMPTY_MESSAGE: &str = "No products match these filters.";

/// Format an integer price with thousands separators
///
/// ```
/// use catalogr::view::format_price;
/// assert_eq!(format_price(1_000_000), "1,000,000");
/// assert_eq!(format_price(999), "999");
/// ```
#[must_use]
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A page of results in server order
#[derive(Debug, Clone, Copy)]
pub struct ResultsView<'a> {
    items: &'a [Product],
    status: &'a EngineStatus,
    quiet: bool,
}

impl<'a> ResultsView<'a> {
    #[must_use]
    pub const fn new(items: &'a [Product], status: &'a EngineStatus) -> Self {
        Self {
            items,
            status,
            quiet: false,
        }
    }

    /// Print only product ids, one per line
    #[must_use]
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Whether the empty-state message applies
    #[must_use]
    pub const fn is_empty_state(&self) -> bool {
        self.items.is_empty() && self.status.is_ready()
    }

    #[must_use]
    pub fn render(&self) -> String {
        if let EngineStatus::Failed(err) = self.status {
            return format!("{}", err.user_message().red());
        }

        if self.quiet {
            return self
                .items
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join("\n");
        }

        if self.is_empty_state() {
            return EMPTY_MESSAGE.yellow().to_string();
        }

        let mut out = String::new();
        if self.status.is_loading() {
            let _ = writeln!(out, "{}", "Loading...".dimmed());
        }

        let width = self.items.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
        for product in self.items {
            let _ = write!(
                out,
                "  {:<width$}  {:>12}",
                product.name.bold(),
                format_price(product.price).green()
            );
            if !product.tags.is_empty() {
                let _ = write!(out, "  [{}]", product.tags.join(", ").cyan());
            }
            let _ = writeln!(out, "  {}", product.id.dimmed());
        }
        out.truncate(out.trim_end().len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CatalogError;
    use crate::testing::product;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "0");
        assert_eq!(format_price(1_000), "1,000");
        assert_eq!(format_price(12_345_678), "12,345,678");
    }

    #[test]
    fn test_empty_state_only_when_ready() {
        let ready = EngineStatus::Ready;
        let loading = EngineStatus::Loading;

        assert!(ResultsView::new(&[], &ready).is_empty_state());
        assert!(ResultsView::new(&[], &ready).render().contains(EMPTY_MESSAGE));
        assert!(!ResultsView::new(&[], &loading).is_empty_state());
        assert!(!ResultsView::new(&[], &loading).render().contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_items_render_in_server_order() {
        let items = vec![product("b", "Zebra", 10), product("a", "Aardvark", 20)];
        let status = EngineStatus::Ready;

        let rendered = ResultsView::new(&items, &status).render();
        let zebra = rendered.find("Zebra").unwrap();
        let aardvark = rendered.find("Aardvark").unwrap();
        assert!(zebra < aardvark);
    }

    #[test]
    fn test_quiet_prints_ids() {
        let items = vec![product("p1", "One", 1), product("p2", "Two", 2)];
        let status = EngineStatus::Ready;
        assert_eq!(ResultsView::new(&items, &status).quiet(true).render(), "p1\np2");
    }

    #[test]
    fn test_failure_shows_message_not_items() {
        let status = EngineStatus::Failed(CatalogError::Network("down".into()));
        let rendered = ResultsView::new(&[], &status).render();
        assert!(rendered.contains("unreachable"));
        assert!(!rendered.contains(EMPTY_MESSAGE));
    }
}
