//! Provider selection and custom server entry.

use crate::dns::{Provider, ProviderCatalog};
use crate::tui::view;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use ratatui::Frame;

/// Shown when enter is pressed on an empty buffer.
pub const EMPTY_INPUT_ERROR: &str = "Please enter at least one DNS server";

/// Shown when the buffer holds no server tokens or a token is not an IP address.
pub const FORMAT_ERROR: &str = "Invalid DNS format. Use: 8.8.8.8,1.1.1.1";

/// Split user input on commas and whitespace, dropping empty tokens.
///
/// ```ignore
/// assert_eq!(parse_custom_dns("8.8.8.8, 1.1.1.1"), ["8.8.8.8", "1.1.1.1"]);
/// ```
#[must_use]
pub fn parse_custom_dns(input: &str) -> Vec<String> {
    input
        .replace(',', " ")
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Where the selector is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorMode {
    /// Moving through the provider list.
    Browsing { cursor: usize },
    /// Typing custom servers. `cursor` is restored on cancel.
    CustomEntry {
        cursor: usize,
        buffer: String,
        error: Option<String>,
    },
}

/// How a selector session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorExit {
    /// Index of the chosen provider in the catalog.
    Selected(usize),
    /// The user left without choosing.
    Quit,
}

pub(crate) fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Interactive provider picker over a borrowed catalog.
pub struct Selector<'a> {
    catalog: &'a mut ProviderCatalog,
    mode: SelectorMode,
    table_state: TableState,
    banner: Option<String>,
}

impl<'a> Selector<'a> {
    /// Start browsing at the top of `catalog`.
    pub fn new(catalog: &'a mut ProviderCatalog) -> Self {
        Self {
            catalog,
            mode: SelectorMode::Browsing { cursor: 0 },
            table_state: TableState::default(),
            banner: None,
        }
    }

    /// Message shown under the title while browsing, e.g. the last apply error.
    #[must_use]
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> &SelectorMode {
        &self.mode
    }

    /// Highlighted row.
    #[must_use]
    pub fn cursor(&self) -> usize {
        match self.mode {
            SelectorMode::Browsing { cursor } | SelectorMode::CustomEntry { cursor, .. } => cursor,
        }
    }

    /// The catalog being browsed.
    #[must_use]
    pub fn catalog(&self) -> &ProviderCatalog {
        self.catalog
    }

    /// Feed one key press. Returns `Some` when the session is over.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SelectorExit> {
        if is_ctrl_c(&key) {
            return Some(SelectorExit::Quit);
        }

        match self.mode {
            SelectorMode::Browsing { cursor } => self.browse_key(cursor, key),
            SelectorMode::CustomEntry { .. } => self.entry_key(key),
        }
    }

    fn browse_key(&mut self, cursor: usize, key: KeyEvent) -> Option<SelectorExit> {
        let last = self.catalog.len().saturating_sub(1);

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(SelectorExit::Quit),

            KeyCode::Up | KeyCode::Char('k') => {
                self.mode = SelectorMode::Browsing {
                    cursor: cursor.saturating_sub(1),
                };
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.mode = SelectorMode::Browsing {
                    cursor: (cursor + 1).min(last),
                };
                None
            }

            KeyCode::Enter | KeyCode::Char(' ') => match self.catalog.get(cursor) {
                Some(provider) if provider.is_add_custom() => {
                    self.mode = SelectorMode::CustomEntry {
                        cursor,
                        buffer: String::new(),
                        error: None,
                    };
                    None
                }
                Some(_) => Some(SelectorExit::Selected(cursor)),
                None => None,
            },

            _ => None,
        }
    }

    fn entry_key(&mut self, key: KeyEvent) -> Option<SelectorExit> {
        let SelectorMode::CustomEntry {
            cursor,
            buffer,
            error,
        } = &mut self.mode
        else {
            return None;
        };

        match key.code {
            KeyCode::Esc => {
                let cursor = *cursor;
                self.mode = SelectorMode::Browsing { cursor };
                None
            }

            KeyCode::Enter => {
                if buffer.is_empty() {
                    *error = Some(EMPTY_INPUT_ERROR.to_string());
                    return None;
                }

                let candidate = Provider::custom(parse_custom_dns(buffer));
                if candidate.servers.is_empty() || candidate.ip_addrs().is_err() {
                    *error = Some(FORMAT_ERROR.to_string());
                    return None;
                }

                let index = self.catalog.append_custom(candidate.servers);
                tracing::debug!("Custom provider added at {index}");
                self.mode = SelectorMode::Browsing { cursor: index };
                Some(SelectorExit::Selected(index))
            }

            KeyCode::Backspace => {
                buffer.pop();
                *error = None;
                None
            }

            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                buffer.push(c);
                *error = None;
                None
            }

            _ => None,
        }
    }

    /// Render the current mode.
    pub fn draw(&mut self, f: &mut Frame) {
        self.table_state.select(Some(self.cursor()));
        match &self.mode {
            SelectorMode::Browsing { .. } => {
                view::draw_provider_list(
                    f,
                    self.catalog,
                    &mut self.table_state,
                    self.banner.as_deref(),
                );
            }
            SelectorMode::CustomEntry { buffer, error, .. } => {
                view::draw_custom_entry(f, buffer, error.as_deref());
            }
        }
    }
}
