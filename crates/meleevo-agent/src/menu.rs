use meleevo_dolphin::{Button, Controller, ControllerError};
use meleevo_state::GameState;

/// Navigates the menus between episodes.
///
/// Menu inputs are intentionally crude: alternate press and release on the
/// frame parity so the game registers repeated taps. Character select taps A
/// on the default cursor position; every other menu taps START until the game
/// moves on.
#[derive(Debug, Default)]
pub struct MenuManager {}

impl MenuManager {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Confirms the default character on the character select screen.
    pub fn pick_character(
        &mut self,
        state: &GameState,
        controller: &mut dyn Controller,
    ) -> Result<(), ControllerError> {
        tap(Button::A, state.frame(), controller)
    }

    /// Advances stage select and post-game screens with repeated START taps.
    pub fn advance_menu(
        &mut self,
        state: &GameState,
        controller: &mut dyn Controller,
    ) -> Result<(), ControllerError> {
        tap(Button::Start, state.frame(), controller)
    }
}

fn tap(button: Button, frame: u32, controller: &mut dyn Controller) -> Result<(), ControllerError> {
    if frame % 2 == 0 {
        controller.press(button)
    } else {
        controller.release(button)
    }
}
