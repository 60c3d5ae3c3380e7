//! ratatui rendition of a dialog's button row.

use std::collections::HashSet;

use buttonctl_application::ButtonView;
use buttonctl_core::{Action, ActionAvailability};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const BUTTON_GAP: &str = "  ";

/// Buttons stay empty until the owning controller announces its policy.
#[derive(Debug, Clone, Default)]
pub struct TerminalButtonView {
    actions: &'static [Action],
    availability: ActionAvailability,
    disabled_inputs: HashSet<String>,
    invalid_fields: Vec<String>,
}

impl TerminalButtonView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &'static [Action] {
        self.actions
    }

    pub fn availability(&self) -> ActionAvailability {
        self.availability
    }

    pub fn is_input_enabled(&self, id: &str) -> bool {
        !self.disabled_inputs.contains(id)
    }

    pub fn is_invalid(&self, field: &str) -> bool {
        self.invalid_fields.iter().any(|f| f == field)
    }

    pub fn label(&self, action: Action) -> &'static str {
        match action {
            Action::Ok => "OK",
            Action::Apply => "Apply",
            Action::Restore => "Restore",
            Action::Cancel => self.availability.cancel_label.as_str(),
        }
    }

    pub fn row_width(&self) -> usize {
        let buttons: usize = self
            .actions
            .iter()
            .map(|action| button_text(self.label(*action)).width())
            .sum();
        buttons + BUTTON_GAP.width() * self.actions.len().saturating_sub(1)
    }

    pub fn button_row(&self, focused: Option<Action>, accent: Color) -> Line<'static> {
        let mut spans = Vec::with_capacity(self.actions.len() * 2);
        for (idx, action) in self.actions.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw(BUTTON_GAP));
            }
            let enabled = self.availability.is_enabled(*action);
            let style = if !enabled {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if focused == Some(*action) {
                Style::default()
                    .fg(Color::Black)
                    .bg(accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            spans.push(Span::styled(button_text(self.label(*action)), style));
        }
        Line::from(spans)
    }
}

impl ButtonView for TerminalButtonView {
    fn set_actions(&mut self, actions: &'static [Action]) {
        self.actions = actions;
    }

    fn set_enabled(&mut self, availability: &ActionAvailability) {
        self.availability = *availability;
    }

    fn set_input_enabled(&mut self, id: &str, enabled: bool) {
        if enabled {
            self.disabled_inputs.remove(id);
        } else {
            self.disabled_inputs.insert(id.to_string());
        }
    }

    fn mark_invalid(&mut self, fields: &[String]) {
        self.invalid_fields = fields.to_vec();
    }
}

fn button_text(label: &str) -> String {
    format!("[ {label} ]")
}
