//! Test helpers and fixtures.

use std::cell::Cell;

use buttonctl_application::{ButtonController, ButtonView, DialogActions, Validator};
use buttonctl_core::{ActionAvailability, PolicyKind};

/// Remembers every availability pushed by a controller.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub pushes: Vec<ActionAvailability>,
    pub disabled_inputs: Vec<String>,
    pub invalid: Vec<String>,
}

impl RecordingView {
    pub fn last(&self) -> Option<ActionAvailability> {
        self.pushes.last().copied()
    }
}

impl ButtonView for RecordingView {
    fn set_enabled(&mut self, availability: &ActionAvailability) {
        self.pushes.push(*availability);
    }

    fn set_input_enabled(&mut self, id: &str, enabled: bool) {
        self.disabled_inputs.retain(|existing| existing != id);
        if !enabled {
            self.disabled_inputs.push(id.to_string());
        }
    }

    fn mark_invalid(&mut self, fields: &[String]) {
        self.invalid = fields.to_vec();
    }
}

/// Dialog whose validity is set by the test; counts dispatched callbacks.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    pub valid: bool,
    pub failing: bool,
    pub applied: usize,
    pub restored: usize,
    pub closed: usize,
    validations: Cell<usize>,
}

impl ScriptedDialog {
    pub fn valid() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn validations(&self) -> usize {
        self.validations.get()
    }
}

impl Validator for ScriptedDialog {
    fn is_valid(&self) -> anyhow::Result<bool> {
        self.validations.set(self.validations.get() + 1);
        if self.failing {
            anyhow::bail!("scripted validator failure");
        }
        Ok(self.valid)
    }
}

impl DialogActions for ScriptedDialog {
    fn apply(&mut self) {
        self.applied += 1;
    }

    fn restore(&mut self) {
        self.restored += 1;
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

pub fn shown_controller(
    policy: PolicyKind,
    read_only: bool,
    dialog: &ScriptedDialog,
) -> ButtonController<RecordingView> {
    let mut controller = ButtonController::new(policy, RecordingView::default());
    controller.show(read_only, dialog);
    controller
}

#[cfg(test)]
mod tests {
    use super::*;
    use buttonctl_application::Invocation;
    use buttonctl_core::{Action, CancelLabel, DialogState, Settings};
    use buttonctl_storage::Storage;
    use buttonctl_ui::{FormDialog, FormParams, TerminalButtonView};

    #[test]
    fn read_only_scenario() {
        let mut dialog = ScriptedDialog::valid();
        let mut controller = shown_controller(PolicyKind::OkApplyCancelReadOnly, false, &dialog);
        assert_eq!(controller.state(), DialogState::new(true, false, false));
        let a = controller.view().last().unwrap();
        assert!(a.ok && !a.apply && a.cancel);

        controller.input_changed(&dialog);
        let a = controller.view().last().unwrap();
        assert!(a.ok && a.apply && a.cancel);

        controller.read_only_changed(true);
        let a = controller.view().last().unwrap();
        assert!(!a.ok && !a.apply && a.cancel);

        let before = controller.state();
        assert_eq!(controller.invoke(Action::Ok, &mut dialog), Invocation::Rejected);
        assert_eq!(controller.state(), before);
        assert_eq!(dialog.applied, 0);
        assert_eq!(dialog.closed, 0);
    }

    #[test]
    fn every_policy_keeps_cancel_reachable_through_a_session() {
        for policy in PolicyKind::ALL {
            let mut dialog = ScriptedDialog::valid();
            let mut controller = shown_controller(policy, false, &dialog);
            controller.input_changed(&dialog);
            dialog.valid = false;
            controller.input_changed(&dialog);
            controller.read_only_changed(true);
            controller.refresh();
            assert!(
                controller.view().pushes.iter().all(|a| a.cancel),
                "{policy}"
            );
            assert_eq!(
                controller.invoke(Action::Cancel, &mut dialog),
                Invocation::Dispatched
            );
            assert_eq!(dialog.closed, 1);
        }
    }

    #[test]
    fn refresh_twice_pushes_identical_availability() {
        let dialog = ScriptedDialog::valid();
        let mut controller = shown_controller(PolicyKind::Preferences, true, &dialog);
        controller.refresh();
        controller.refresh();
        let pushes = &controller.view().pushes;
        assert_eq!(pushes[pushes.len() - 1], pushes[pushes.len() - 2]);
    }

    #[test]
    fn every_edit_queries_the_validator() {
        let dialog = ScriptedDialog::valid();
        let mut controller = shown_controller(PolicyKind::OkCancel, false, &dialog);
        controller.input_changed(&dialog);
        controller.input_changed(&dialog);
        assert_eq!(dialog.validations(), 3);
        controller.read_only_changed(true);
        controller.refresh();
        assert_eq!(dialog.validations(), 3);
    }

    #[test]
    fn failing_validator_keeps_ok_disabled() {
        let mut dialog = ScriptedDialog {
            failing: true,
            ..ScriptedDialog::valid()
        };
        let mut controller = shown_controller(PolicyKind::OkApplyCancel, false, &dialog);
        controller.input_changed(&dialog);
        let a = controller.view().last().unwrap();
        assert!(!a.ok && !a.apply);
        assert_eq!(controller.invoke(Action::Apply, &mut dialog), Invocation::Rejected);
    }

    #[test]
    fn cancel_reads_close_after_apply() {
        let mut dialog = ScriptedDialog::valid();
        let mut controller = shown_controller(PolicyKind::OkApplyCancel, false, &dialog);
        controller.input_changed(&dialog);
        assert_eq!(
            controller.view().last().unwrap().cancel_label,
            CancelLabel::Cancel
        );
        controller.invoke(Action::Apply, &mut dialog);
        assert_eq!(
            controller.view().last().unwrap().cancel_label,
            CancelLabel::Close
        );
    }

    #[test]
    fn read_only_inputs_disabled_under_every_policy() {
        for policy in PolicyKind::ALL {
            let dialog = ScriptedDialog::valid();
            let mut controller = ButtonController::new(policy, RecordingView::default());
            controller.add_read_only_input("title");
            controller.show(false, &dialog);
            assert!(controller.view().disabled_inputs.is_empty());
            controller.read_only_changed(true);
            assert_eq!(controller.view().disabled_inputs, vec!["title".to_string()]);
        }
    }

    #[test]
    fn terminal_view_tracks_form_dialog() {
        let mut dialog = FormDialog::new(FormParams::default());
        let policy = PolicyKind::NoRepeatedApply;
        let mut controller = ButtonController::new(policy, TerminalButtonView::new());
        controller.show(false, &dialog);
        dialog.field_mut(buttonctl_ui::FIELD_LABEL).push('2');
        controller.input_changed(&dialog);
        assert!(controller.view().availability().apply);
        controller.invoke(Action::Apply, &mut dialog);
        assert!(!controller.view().availability().apply);
        assert_eq!(dialog.committed().label, "figure2");
    }

    #[test]
    fn terminal_view_shows_buttons_of_replaced_policy() {
        let mut dialog = FormDialog::new(FormParams::default());
        let mut controller = ButtonController::new(PolicyKind::OkCancel, TerminalButtonView::new());
        controller.set_policy(PolicyKind::Preferences).unwrap();
        controller.show(false, &dialog);
        dialog.field_mut(buttonctl_ui::FIELD_WIDTH).push('0');
        controller.input_changed(&dialog);

        let view = controller.view();
        assert_eq!(view.actions(), PolicyKind::Preferences.actions());
        assert!(view.actions().contains(&Action::Restore));
        assert!(view.availability().restore);
        assert_eq!(
            controller.invoke(Action::Restore, &mut dialog),
            Invocation::Dispatched
        );
        assert_eq!(dialog.edited().width, "80");
    }

    #[test]
    fn stored_policy_builds_controller() -> anyhow::Result<()> {
        let storage = Storage::open_in_memory()?;
        let mut settings = Settings::default();
        settings.cycle_policy("Print");
        storage.save_settings(&settings)?;

        let loaded = storage.load_settings()?;
        let policy = loaded.policy_for("Print").unwrap();
        assert_eq!(policy, PolicyKind::OkCancel.next());
        let controller = ButtonController::new(policy, RecordingView::default());
        assert_eq!(controller.policy(), PolicyKind::OkCancelReadOnly);
        Ok(())
    }
}
