//! Application shell: one inspected document, one session, one status line,
//! and a synchronous event loop. All model mutation and rendering happen on
//! this thread; an event is fully handled before the next one is read.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout};
use ratatui::{DefaultTerminal, Frame};

use crate::config::Config;
use crate::provider::JsonProvider;
use crate::session::Session;
use crate::tree::{ExpandPhase, ViewOptions};
use crate::ui::{InspectorLayout, InspectorRenderer, StatusBar, Theme};

pub struct App {
    session: Session,
    provider: Rc<JsonProvider>,
    source: PathBuf,
    config: Config,
    theme: Theme,
    layout: InspectorLayout,
    status_message: String,
    title: String,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, source: PathBuf) -> Result<Self> {
        let document = load_document(&source)?;
        let provider = Rc::new(
            JsonProvider::new(document)
                .with_value_width(config.view.value_width)
                .with_embedded_parsing(config.view.parse_embedded),
        );

        let options = ViewOptions {
            interactive: config.view.interactive,
            indent_unit: config.view.indent_unit,
        };
        let mut session = Session::new(provider.clone(), options);
        session.set_expand_hook(Box::new(|phase, node| match phase {
            ExpandPhase::Began => tracing::debug!(name = %node.name, "expanding"),
            ExpandPhase::Finished => tracing::debug!(name = %node.name, "expand finished"),
        }));
        session.initialize(provider.root_handle())?;

        let title = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let theme = Theme::from(&config.colors);

        Ok(Self {
            session,
            provider,
            source,
            config,
            theme,
            layout: InspectorLayout::default(),
            status_message: String::new(),
            title,
            should_quit: false,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    self.handle_key(key);
                }
                Event::Mouse(mouse) if self.config.view.mouse => {
                    let rows_area = self.layout.rows_area;
                    let (view, tree) = self.session.view_and_tree_mut();
                    if let Err(e) = view.handle_mouse(mouse, rows_area, tree) {
                        self.set_status_message(format!("Expand failed: {e}"));
                    }
                }
                _ => {}
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

        let (view, tree) = self.session.view_and_tree_mut();
        self.layout = InspectorRenderer::render(
            frame, main_area, tree, view, &self.theme, &self.title, true,
        );

        let left = if self.status_message.is_empty() {
            self.selected_path()
        } else {
            self.status_message.clone()
        };
        let right = match self.session.view().selected() {
            Some(index) => format!("{}/{}", index + 1, self.session.row_count()),
            None => format!("0/{}", self.session.row_count()),
        };
        StatusBar::render(frame, status_area, &left, &right, &self.theme);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('r') if key.modifiers.is_empty() => {
                self.refresh_from_disk();
            }
            KeyCode::F(5) => {
                self.refresh_from_disk();
            }
            _ => {
                let (view, tree) = self.session.view_and_tree_mut();
                match view.handle_key(key, tree) {
                    Ok(true) => self.status_message.clear(),
                    Ok(false) => {}
                    Err(e) => self.set_status_message(format!("Expand failed: {e}")),
                }
            }
        }
    }

    /// Re-read the document and rebuild the tree, keeping the viewport,
    /// selection and expanded rows anchored by key.
    fn refresh_from_disk(&mut self) {
        match load_document(&self.source) {
            Ok(document) => self.provider.replace_document(document),
            Err(e) => {
                tracing::warn!("refresh aborted, document not reloaded: {e:#}");
                self.set_status_message(format!("Refresh failed: {e:#}"));
                return;
            }
        }
        match self.session.refresh() {
            Ok(()) => {
                self.set_status_message(format!(
                    "Refreshed, {} rows",
                    self.session.row_count()
                ));
            }
            Err(e) => self.set_status_message(format!("Refresh failed: {e}")),
        }
    }

    /// Slash-joined names from the root to the selected row, driven by the
    /// model's backward parent scan.
    fn selected_path(&self) -> String {
        let tree = self.session.tree();
        let Some(mut index) = self.session.view().selected() else {
            return String::new();
        };
        let mut parts = vec![tree.node(index).name.clone()];
        while let Some(parent) = tree.parent_index(index) {
            parts.push(tree.node(parent).name.clone());
            index = parent;
        }
        parts.reverse();
        parts.join("/")
    }

    fn set_status_message(&mut self, message: String) {
        tracing::debug!(message = %message, "status");
        self.status_message = message;
    }
}

fn load_document(path: &std::path::Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
