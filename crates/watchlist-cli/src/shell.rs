//! Line-oriented session shell.
//!
//! Every command goes through a mounted surface (page, search panel or a
//! per-symbol button) so the shell exercises the same binding contract a
//! graphical front end would.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use watchlist_store::{NewStock, WatchedStock, WatchlistStore};
use watchlist_views::{
    SearchPanel, SearchResult, StaticSymbolSearch, SymbolSearch, WatchlistButton, WatchlistPage,
};

use crate::config::WatchlistConfig;

pub const HELP: &str = "\
Commands:
  add <SYMBOL> [NAME...]     Add or refresh a symbol
  remove <SYMBOL>            Remove a symbol
  toggle <SYMBOL> [NAME...]  Add if absent, remove if present
  get <SYMBOL>               Show one entry
  list                       Show the watchlist, newest first
  count                      Number of watched symbols
  clear                      Remove everything
  search [QUERY]             Search symbols (blank shows popular stocks)
  star <SYMBOL>              Toggle a symbol from the last search
  export [DIR]               Write watchlist-<date>.json
  import <PATH>              Load a watchlist backup
  help                       Show this help
  quit                       End the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { symbol: String, name: String },
    Remove(String),
    Toggle { symbol: String, name: String },
    Get(String),
    List,
    Count,
    Clear,
    Search(String),
    Star(String),
    Export(Option<PathBuf>),
    Import(PathBuf),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let symbol = |usage: &str| -> Result<String> {
            match rest.first() {
                Some(s) => Ok(s.to_string()),
                None => bail!("usage: {}", usage),
            }
        };
        let name = || rest.iter().skip(1).copied().collect::<Vec<_>>().join(" ");

        let command = match verb.to_lowercase().as_str() {
            "add" => Command::Add {
                symbol: symbol("add <SYMBOL> [NAME...]")?,
                name: name(),
            },
            "remove" | "rm" => Command::Remove(symbol("remove <SYMBOL>")?),
            "toggle" => Command::Toggle {
                symbol: symbol("toggle <SYMBOL> [NAME...]")?,
                name: name(),
            },
            "get" => Command::Get(symbol("get <SYMBOL>")?),
            "list" | "ls" => Command::List,
            "count" => Command::Count,
            "clear" => Command::Clear,
            "search" => Command::Search(rest.join(" ")),
            "star" => Command::Star(symbol("star <SYMBOL>")?),
            "export" => Command::Export(rest.first().map(|p| PathBuf::from(*p))),
            "import" => Command::Import(PathBuf::from(symbol("import <PATH>")?)),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(Some(command))
    }
}

pub struct Shell {
    store: Arc<WatchlistStore>,
    config: WatchlistConfig,
    page: WatchlistPage,
    panel: SearchPanel,
}

impl Shell {
    pub fn new(store: Arc<WatchlistStore>, config: WatchlistConfig) -> Self {
        let search = StaticSymbolSearch::new();
        let popular = search.popular().to_vec();
        Self::with_search(store, Arc::new(search), popular, config)
    }

    pub fn with_search(
        store: Arc<WatchlistStore>,
        search: Arc<dyn SymbolSearch>,
        popular: Vec<SearchResult>,
        config: WatchlistConfig,
    ) -> Self {
        let page = WatchlistPage::mount(Arc::clone(&store));
        let panel = SearchPanel::mount(Arc::clone(&store), search, popular)
            .with_popular_limit(config.popular_limit);

        Self {
            store,
            config,
            page,
            panel,
        }
    }

    fn new_stock(&self, symbol: &str, name: &str) -> NewStock {
        NewStock::new(symbol, name)
            .with_exchange(self.config.default_exchange.clone())
            .with_instrument_type(self.config.default_instrument_type.clone())
    }

    /// Run one command and return the text to print
    pub async fn execute(&self, command: Command) -> Result<String> {
        let output = match command {
            Command::Add { symbol, name } => {
                self.store.add(self.new_stock(&symbol, &name));
                format!("Added {} to watchlist ({} total)", symbol, self.page.len())
            }
            Command::Remove(symbol) => {
                if self.page.remove(&symbol) {
                    format!("Removed {} from watchlist", symbol)
                } else {
                    format!("{} is not in your watchlist", symbol)
                }
            }
            Command::Toggle { symbol, name } => {
                let button = WatchlistButton::mount(Arc::clone(&self.store), self.new_stock(&symbol, &name));
                if button.click() {
                    format!("Added {} to watchlist", symbol)
                } else {
                    format!("Removed {} from watchlist", symbol)
                }
            }
            Command::Get(symbol) => match self.store.get(&symbol) {
                Some(stock) => render_entry(&stock),
                None => format!("{} is not in your watchlist", symbol),
            },
            Command::List => self.render_page(),
            Command::Count => self.store.count().to_string(),
            Command::Clear => {
                if !self.page.can_clear() {
                    "Your watchlist is already empty".to_string()
                } else {
                    self.page.clear_all();
                    "Cleared watchlist".to_string()
                }
            }
            Command::Search(query) => {
                self.panel.search(&query).await;
                self.render_panel()
            }
            Command::Star(symbol) => match self.panel.toggle_star(&symbol) {
                Some(true) => format!("★ {} added to watchlist", symbol),
                Some(false) => format!("☆ {} removed from watchlist", symbol),
                None => bail!("{} is not in the current search results", symbol),
            },
            Command::Export(dir) => {
                if !self.page.can_export() {
                    bail!("Nothing to export: your watchlist is empty");
                }
                let dir = dir.unwrap_or_else(|| self.config.export_dir.clone());
                let path = self
                    .page
                    .export_to_dir(&dir)
                    .with_context(|| format!("Failed to export watchlist to {}", dir.display()))?;
                format!("Exported {} stocks to {}", self.page.len(), path.display())
            }
            Command::Import(path) => {
                let applied = self.import(&path)?;
                format!("Watchlist imported successfully! ({} records)", applied)
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        };
        Ok(output)
    }

    pub fn import(&self, path: &Path) -> Result<usize> {
        self.page
            .import_file(path)
            .context("Failed to import watchlist. Please check the file format.")
    }

    fn render_page(&self) -> String {
        if self.page.is_empty() {
            return "Your watchlist is empty. Search for stocks and star them to add them.".to_string();
        }

        let mut lines = vec![self.page.summary()];
        lines.extend(self.page.entries().iter().map(render_entry));
        lines.join("\n")
    }

    fn render_panel(&self) -> String {
        if let Some(message) = self.panel.empty_message() {
            return message.to_string();
        }

        let mut lines = vec![self.panel.header()];
        for result in self.panel.displayed() {
            let star = if self.panel.is_watched(&result.symbol) { "★" } else { "☆" };
            lines.push(format!("{} {:<6} {}  ({})", star, result.symbol, result.name, result.caption()));
        }
        lines.join("\n")
    }
}

fn render_entry(stock: &WatchedStock) -> String {
    format!(
        "{:<6} {}  [{} • {}]  added {}",
        stock.symbol,
        stock.name,
        stock.exchange,
        stock.instrument_type,
        stock.added_on()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_shell() -> (Arc<WatchlistStore>, Shell) {
        let store = Arc::new(WatchlistStore::new());
        let shell = Shell::new(Arc::clone(&store), WatchlistConfig::default());
        (store, shell)
    }

    async fn run(shell: &Shell, line: &str) -> Result<String> {
        let command = Command::parse(line)?.context("blank line")?;
        shell.execute(command).await
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("add AAPL Apple Inc.").unwrap(),
            Some(Command::Add {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string()
            })
        );
        assert_eq!(Command::parse("LIST").unwrap(), Some(Command::List));
        assert_eq!(Command::parse("export").unwrap(), Some(Command::Export(None)));
        assert_eq!(Command::parse("search").unwrap(), Some(Command::Search(String::new())));
        assert!(Command::parse("remove").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let (store, shell) = new_shell();

        run(&shell, "add AAPL Apple Inc.").await.unwrap();
        run(&shell, "add MSFT Microsoft").await.unwrap();
        assert_eq!(run(&shell, "count").await.unwrap(), "2");

        let listing = run(&shell, "list").await.unwrap();
        assert!(listing.starts_with("Track your favorite stocks (2 stocks)"));
        assert!(listing.contains("NASDAQ • Common Stock"));

        assert_eq!(run(&shell, "remove AAPL").await.unwrap(), "Removed AAPL from watchlist");
        assert_eq!(run(&shell, "remove AAPL").await.unwrap(), "AAPL is not in your watchlist");
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_toggle_command() {
        let (store, shell) = new_shell();

        assert_eq!(run(&shell, "toggle TSLA Tesla").await.unwrap(), "Added TSLA to watchlist");
        assert_eq!(run(&shell, "toggle TSLA Tesla").await.unwrap(), "Removed TSLA from watchlist");
        assert!(!store.contains("TSLA"));
        // only the page and the search panel remain subscribed
        assert_eq!(store.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_search_and_star() {
        let (store, shell) = new_shell();

        let output = run(&shell, "search apple").await.unwrap();
        assert!(output.contains("☆ AAPL"));

        run(&shell, "star AAPL").await.unwrap();
        assert!(store.contains("AAPL"));
        assert!(run(&shell, "search apple").await.unwrap().contains("★ AAPL"));

        assert!(run(&shell, "star MSFT").await.is_err());
        assert!(run(&shell, "search").await.unwrap().starts_with("Popular stocks (10)"));
    }

    #[tokio::test]
    async fn test_config_defaults_apply() {
        let store = Arc::new(WatchlistStore::new());
        let config = WatchlistConfig {
            default_exchange: "NYSE".to_string(),
            ..WatchlistConfig::default()
        };
        let shell = Shell::new(Arc::clone(&store), config);

        run(&shell, "add KO Coca-Cola").await.unwrap();
        assert_eq!(store.get("KO").unwrap().exchange, "NYSE");
    }

    #[tokio::test]
    async fn test_export_then_import_in_new_session() {
        let dir = tempfile::tempdir().unwrap();
        let (store, shell) = new_shell();

        assert!(run(&shell, "export").await.is_err());
        run(&shell, "add AAPL Apple Inc.").await.unwrap();
        let line = format!("export {}", dir.path().display());
        assert!(run(&shell, &line).await.unwrap().starts_with("Exported 1 stocks"));

        let path = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();

        let (other, next) = new_shell();
        let line = format!("import {}", path.display());
        assert!(run(&next, &line).await.unwrap().starts_with("Watchlist imported successfully!"));
        assert_eq!(other.list(), store.list());
    }

    #[tokio::test]
    async fn test_bad_import_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json").unwrap();
        let (store, shell) = new_shell();

        let err = run(&shell, &format!("import {}", path.display())).await.unwrap_err();
        assert!(err.to_string().contains("Failed to import watchlist"));
        assert_eq!(store.count(), 0);
    }
}
