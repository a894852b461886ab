//! Keyboard shortcuts
//!
//! Space toggles play/pause unless a text field has focus.

use crate::types::DeviceKind;

/// Key code that toggles playback
const PLAY_PAUSE_KEY: &str = "Space";

/// Action a key press maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    TogglePlayPause,
}

/// Focus-aware shortcut filter
#[derive(Debug, Clone)]
pub struct ShortcutGate {
    enabled: bool,
    input_focused: bool,
}

impl ShortcutGate {
    /// Shortcuts are only active on desktop devices
    pub fn new(device: DeviceKind) -> Self {
        Self {
            enabled: !device.is_mobile(),
            input_focused: false,
        }
    }

    /// An element gained focus
    pub fn focus_in(&mut self, tag_name: &str) {
        if is_text_input(tag_name) {
            self.input_focused = true;
        }
    }

    /// An element lost focus
    pub fn focus_out(&mut self, tag_name: &str) {
        if is_text_input(tag_name) {
            self.input_focused = false;
        }
    }

    /// Map a key code to an action
    ///
    /// When this returns an action the host should suppress the browser
    /// default (page scroll for Space).
    pub fn on_key(&self, code: &str) -> Option<ShortcutAction> {
        if self.enabled && !self.input_focused && code == PLAY_PAUSE_KEY {
            Some(ShortcutAction::TogglePlayPause)
        } else {
            None
        }
    }

    /// Whether a text field currently has focus
    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }
}

fn is_text_input(tag_name: &str) -> bool {
    tag_name.eq_ignore_ascii_case("INPUT") || tag_name.eq_ignore_ascii_case("TEXTAREA")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_toggles_on_desktop() {
        let gate = ShortcutGate::new(DeviceKind::Desktop);
        assert_eq!(gate.on_key("Space"), Some(ShortcutAction::TogglePlayPause));
        assert_eq!(gate.on_key("KeyK"), None);
    }

    #[test]
    fn focused_input_swallows_space() {
        let mut gate = ShortcutGate::new(DeviceKind::Desktop);
        gate.focus_in("INPUT");
        assert_eq!(gate.on_key("Space"), None);

        // Focus moving to a button doesn't clear the input flag
        gate.focus_in("BUTTON");
        assert!(gate.is_input_focused());

        gate.focus_out("INPUT");
        assert_eq!(gate.on_key("Space"), Some(ShortcutAction::TogglePlayPause));
    }

    #[test]
    fn textarea_counts_as_input() {
        let mut gate = ShortcutGate::new(DeviceKind::Desktop);
        gate.focus_in("textarea");
        assert!(gate.is_input_focused());
    }

    #[test]
    fn disabled_on_mobile() {
        let gate = ShortcutGate::new(DeviceKind::Mobile);
        assert_eq!(gate.on_key("Space"), None);
    }
}
