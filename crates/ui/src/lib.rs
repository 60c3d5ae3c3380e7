//! ratatui-based host for exercising dialog button controllers.

use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context as _;
use buttonctl_application::{ButtonController, Invocation};
use buttonctl_core::{Action, DialogEntry, PolicyKind, Settings, Theme};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};

mod button_view;
mod form_dialog;

pub use button_view::TerminalButtonView;
pub use form_dialog::{FIELD_LABEL, FIELD_WIDTH, FIELDS, FormDialog, FormParams};

#[derive(Debug, Clone)]
pub struct UiOutcome {
    pub settings: Settings,
}

pub struct Ui {
    settings: Settings,
    selected: usize,
    open: Option<OpenDialog>,
    params_by_dialog: HashMap<String, FormParams>,
    status: Option<String>,
}

struct OpenDialog {
    name: String,
    dialog: FormDialog,
    controller: ButtonController<TerminalButtonView>,
    focus: usize,
}

impl OpenDialog {
    fn new(entry: &DialogEntry, params: FormParams, read_only: bool) -> Self {
        let dialog = FormDialog::new(params);
        let mut controller = ButtonController::new(entry.policy, TerminalButtonView::new());
        for field in FIELDS {
            controller.add_read_only_input(field);
        }
        controller.show(read_only, &dialog);
        Self {
            name: entry.name.clone(),
            dialog,
            controller,
            focus: 0,
        }
    }

    fn focus_count(&self) -> usize {
        FIELDS.len() + self.controller.view().actions().len()
    }

    fn focused_field(&self) -> Option<&'static str> {
        FIELDS.get(self.focus).copied()
    }

    fn focused_action(&self) -> Option<Action> {
        self.focus
            .checked_sub(FIELDS.len())
            .and_then(|idx| self.controller.view().actions().get(idx).copied())
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.focus_count();
    }

    fn focus_prev(&mut self) {
        let count = self.focus_count();
        self.focus = (self.focus + count - 1) % count;
    }

    /// Apply an edit to the focused field; returns false when the field is
    /// locked by a read-only document.
    fn edit(&mut self, f: impl FnOnce(&mut String)) -> bool {
        let Some(field) = self.focused_field() else {
            return false;
        };
        if !self.controller.view().is_input_enabled(field) {
            return false;
        }
        f(self.dialog.field_mut(field));
        self.controller.input_changed(&self.dialog);
        true
    }

    fn invoke(&mut self, action: Action) -> Invocation {
        self.controller.invoke(action, &mut self.dialog)
    }
}

impl Ui {
    pub fn new(mut settings: Settings) -> Self {
        settings.normalize();
        Self {
            settings,
            selected: 0,
            open: None,
            params_by_dialog: HashMap::new(),
            status: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&mut self) -> anyhow::Result<UiOutcome> {
        let mut terminal = setup_terminal()?;
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(())), Ok(())) => Ok(UiOutcome {
                settings: self.settings.clone(),
            }),
            (Ok(Err(err)), _) => Err(err),
            (Ok(Ok(())), Err(err)) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn accent_color(&self) -> Color {
        match self.settings.theme {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::Yellow,
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame.area(), frame))?;
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    needs_redraw = true;
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Returns true when the host should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && let KeyCode::Char('r') = key.code
        {
            self.toggle_document_read_only();
            return false;
        }

        if self.open.is_some() {
            self.handle_dialog_key(key);
            false
        } else {
            self.handle_main_key(key)
        }
    }

    fn toggle_document_read_only(&mut self) {
        self.settings.toggle_document_read_only();
        let read_only = self.settings.document_read_only;
        if let Some(open) = self.open.as_mut() {
            open.controller.read_only_changed(read_only);
        }
        self.status = Some(if read_only {
            "Document is now read-only".to_string()
        } else {
            "Document is now editable".to_string()
        });
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                false
            }
            KeyCode::Down => {
                self.selected =
                    (self.selected + 1).min(self.settings.dialogs.len().saturating_sub(1));
                false
            }
            KeyCode::Enter => {
                self.open_selected();
                false
            }
            KeyCode::Char('p') => {
                if let Some(name) = self.selected_entry().map(|e| e.name.clone())
                    && let Some(policy) = self.settings.cycle_policy(&name)
                {
                    self.status = Some(format!("{name} now uses {policy}"));
                }
                false
            }
            KeyCode::Char('t') => {
                self.settings.cycle_theme();
                false
            }
            _ => false,
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(open) = self.open.as_mut() else {
            return;
        };

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && let KeyCode::Char('u') = key.code
        {
            open.edit(|value| value.clear());
            return;
        }

        let invoked = match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Tab => {
                open.focus_next();
                None
            }
            KeyCode::BackTab => {
                open.focus_prev();
                None
            }
            KeyCode::Enter => Some(open.focused_action().unwrap_or(Action::Ok)),
            KeyCode::Backspace => {
                open.edit(|value| {
                    value.pop();
                });
                None
            }
            KeyCode::Char(ch)
                if !ch.is_control() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                open.edit(|value| value.push(ch));
                None
            }
            _ => None,
        };

        if let Some(action) = invoked {
            self.invoke_open(action);
        }
    }

    fn invoke_open(&mut self, action: Action) {
        let Some(open) = self.open.as_mut() else {
            return;
        };

        match open.invoke(action) {
            Invocation::Rejected => {
                self.status = Some(format!(
                    "{} is not available right now",
                    open.controller.view().label(action)
                ));
            }
            Invocation::Dispatched => {
                if action == Action::Apply {
                    self.status = Some(format!("{}: applied", open.name));
                }
                if action == Action::Restore {
                    self.status = Some(format!("{}: restored", open.name));
                }
            }
        }

        if open.dialog.is_closed() {
            let applied = open.dialog.applied_count();
            self.params_by_dialog
                .insert(open.name.clone(), open.dialog.committed().clone());
            self.status = Some(format!("{} closed ({applied} apply)", open.name));
            self.open = None;
        }
    }

    fn selected_entry(&self) -> Option<&DialogEntry> {
        self.settings.dialogs.get(self.selected)
    }

    fn open_selected(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        let params = self
            .params_by_dialog
            .get(&entry.name)
            .cloned()
            .unwrap_or_default();
        self.open = Some(OpenDialog::new(
            &entry,
            params,
            self.settings.document_read_only,
        ));
        self.status = None;
    }

    fn draw(&self, area: Rect, frame: &mut ratatui::Frame) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(self.header_line()), sections[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(sections[1]);
        self.draw_dialog_list(frame, body[0]);
        frame.render_widget(self.draw_details(), body[1]);

        frame.render_widget(
            Paragraph::new(Text::from(self.footer_lines())).wrap(Wrap { trim: true }),
            sections[2],
        );

        if let Some(open) = &self.open {
            self.draw_open_dialog(open, area, frame);
        }
    }

    fn header_line(&self) -> Line<'static> {
        let (doc_label, doc_style) = if self.settings.document_read_only {
            (
                "read-only",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                "editable",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        };
        Line::from(vec![
            Span::styled(
                "buttonctl",
                Style::default()
                    .fg(self.accent_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  document: "),
            Span::styled(doc_label, doc_style),
        ])
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let keys = if self.open.is_some() {
            vec![
                Span::styled("Tab", bold),
                Span::raw(" focus  "),
                Span::styled("Enter", bold),
                Span::raw(" press  "),
                Span::styled("Ctrl+u", bold),
                Span::raw(" clear  "),
                Span::styled("Ctrl+r", bold),
                Span::raw(" read-only  "),
                Span::styled("Esc", bold),
                Span::raw(" cancel"),
            ]
        } else {
            vec![
                Span::styled("↑/↓", bold),
                Span::raw(" select  "),
                Span::styled("Enter", bold),
                Span::raw(" open  "),
                Span::styled("p", bold),
                Span::raw(" policy  "),
                Span::styled("t", bold),
                Span::raw(" theme  "),
                Span::styled("Ctrl+r", bold),
                Span::raw(" read-only  "),
                Span::styled("q", bold),
                Span::raw(" quit"),
            ]
        };

        let mut lines = vec![Line::from(keys)];
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Gray),
            )));
        }
        lines
    }

    fn draw_dialog_list(&self, frame: &mut ratatui::Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .settings
            .dialogs
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        entry.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        entry.policy.to_string(),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();

        let highlight_style = Style::default()
            .fg(Color::Black)
            .bg(self.accent_color())
            .add_modifier(Modifier::BOLD);
        let list = List::new(items)
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always)
            .block(Block::default().borders(Borders::ALL).title("Dialogs"));

        let mut state = ListState::default();
        if !self.settings.dialogs.is_empty() {
            state.select(Some(self.selected.min(self.settings.dialogs.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_details(&self) -> Paragraph<'static> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();
        if let Some(entry) = self.selected_entry() {
            let policy = entry.policy;
            lines.push(Line::from(vec![
                Span::styled("Policy: ", bold),
                Span::raw(policy.to_string()),
            ]));
            let buttons: Vec<&str> = policy.actions().iter().map(|a| a.as_str()).collect();
            lines.push(Line::from(vec![
                Span::styled("Buttons: ", bold),
                Span::raw(buttons.join(", ")),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Read-only aware: ", bold),
                Span::raw(if policy.is_read_only_aware() { "yes" } else { "no" }),
            ]));
            if let Some(params) = self.params_by_dialog.get(&entry.name) {
                lines.push(Line::raw(""));
                lines.push(Line::from(vec![
                    Span::styled("Last applied: ", bold),
                    Span::raw(format!("{} / {}", params.label, params.width)),
                ]));
            }
            lines.push(Line::raw(""));
            lines.extend(policy_preview_lines(policy));
        }
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Details"))
    }

    fn draw_open_dialog(&self, open: &OpenDialog, area: Rect, frame: &mut ratatui::Frame) {
        let view = open.controller.view();
        // Borders take one column on each side.
        let min_width = u16::try_from(view.row_width() + 2).unwrap_or(u16::MAX);
        let popup_area = widen_to(centered_rect(60, 45, area), min_width, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            format!("{} [{}]", open.name, open.controller.policy()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let mut lines = Vec::new();
        for (idx, field) in FIELDS.iter().enumerate() {
            let mut style = Style::default();
            if !view.is_input_enabled(field) {
                style = style.fg(Color::DarkGray);
            } else if view.is_invalid(field) {
                style = style.fg(Color::Red).add_modifier(Modifier::BOLD);
            }
            if open.focus == idx {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{field:>6}: "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{} ", open.dialog.field(field)), style),
            ]));
        }

        let state = open.controller.state();
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!(
                "valid={} read_only={} changed={}",
                state.valid, state.read_only, state.changed
            ),
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
            sections[0],
        );

        let row = view.button_row(open.focused_action(), self.accent_color());
        frame.render_widget(
            Paragraph::new(row).alignment(Alignment::Center),
            sections[1],
        );
    }
}

fn policy_preview_lines(policy: PolicyKind) -> Vec<Line<'static>> {
    use buttonctl_core::DialogState;

    let mut lines = vec![Line::from(Span::styled(
        "valid ro  chg  ok apply restore",
        Style::default().add_modifier(Modifier::UNDERLINED),
    ))];
    for state in DialogState::all().filter(|s| !s.applied) {
        let a = policy.availability(state);
        lines.push(Line::raw(format!(
            "{:5} {:3} {:4} {:3} {:5} {:7}",
            flag(state.valid),
            flag(state.read_only),
            flag(state.changed),
            flag(a.ok),
            flag(a.apply),
            flag(a.restore),
        )));
    }
    lines
}

fn flag(value: bool) -> &'static str {
    if value { "x" } else { "-" }
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Grow `rect` around its center to at least `min_width`, clamped to `bounds`.
fn widen_to(rect: Rect, min_width: u16, bounds: Rect) -> Rect {
    if rect.width >= min_width {
        return rect;
    }
    let width = min_width.min(bounds.width);
    let x = bounds.x + (bounds.width - width) / 2;
    Rect { x, width, ..rect }
}
