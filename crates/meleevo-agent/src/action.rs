use meleevo_dolphin::{Button, Controller, ControllerError, Stick};

/// Discrete controller actions an agent can take, one per network output.
///
/// The active action is re-applied every frame; switching actions releases
/// the previous button before the new command so the emulator never sees two
/// conflicting holds from one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Neutral,
    WalkLeft,
    WalkRight,
    Crouch,
    Jump,
    JumpLeft,
    JumpRight,
    Attack,
    Special,
    SpecialLeft,
    SpecialRight,
    SpecialDown,
    Shield,
    Grab,
}

impl ControlAction {
    pub const ALL: [ControlAction; 14] = [
        ControlAction::Neutral,
        ControlAction::WalkLeft,
        ControlAction::WalkRight,
        ControlAction::Crouch,
        ControlAction::Jump,
        ControlAction::JumpLeft,
        ControlAction::JumpRight,
        ControlAction::Attack,
        ControlAction::Special,
        ControlAction::SpecialLeft,
        ControlAction::SpecialRight,
        ControlAction::SpecialDown,
        ControlAction::Shield,
        ControlAction::Grab,
    ];

    /// Picks the action whose network output is largest. Ties resolve to the
    /// earlier action, which makes the mapping deterministic.
    #[must_use]
    pub fn from_outputs(outputs: &[f32]) -> ControlAction {
        assert_eq!(outputs.len(), Self::ALL.len());
        let mut best = 0;
        for (i, value) in outputs.iter().enumerate() {
            if *value > outputs[best] {
                best = i;
            }
        }
        Self::ALL[best]
    }

    /// Main-stick position for this action, `(0.5, 0.5)` being neutral.
    #[must_use]
    pub fn stick(self) -> (f32, f32) {
        match self {
            ControlAction::WalkLeft | ControlAction::JumpLeft | ControlAction::SpecialLeft => {
                (0.0, 0.5)
            }
            ControlAction::WalkRight | ControlAction::JumpRight | ControlAction::SpecialRight => {
                (1.0, 0.5)
            }
            ControlAction::Crouch | ControlAction::SpecialDown => (0.5, 0.0),
            _ => (0.5, 0.5),
        }
    }

    /// Button held during this action, if any.
    #[must_use]
    pub fn button(self) -> Option<Button> {
        match self {
            ControlAction::Jump | ControlAction::JumpLeft | ControlAction::JumpRight => {
                Some(Button::X)
            }
            ControlAction::Attack => Some(Button::A),
            ControlAction::Special
            | ControlAction::SpecialLeft
            | ControlAction::SpecialRight
            | ControlAction::SpecialDown => Some(Button::B),
            ControlAction::Shield => Some(Button::L),
            ControlAction::Grab => Some(Button::Z),
            _ => None,
        }
    }

    /// Issues this action, releasing the previous action's button first.
    pub fn apply(
        self,
        previous: Option<ControlAction>,
        controller: &mut dyn Controller,
    ) -> Result<(), ControllerError> {
        if let Some(prev_button) = previous.and_then(ControlAction::button)
            && Some(prev_button) != self.button()
        {
            controller.release(prev_button)?;
        }
        let (x, y) = self.stick();
        controller.set_stick(Stick::Main, x, y)?;
        if let Some(button) = self.button() {
            controller.press(button)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_the_strongest_output() {
        let mut outputs = vec![0.1; 14];
        outputs[7] = 0.9;
        assert_eq!(ControlAction::from_outputs(&outputs), ControlAction::Attack);
    }

    #[test]
    fn argmax_ties_resolve_to_the_earlier_action() {
        let outputs = vec![0.5; 14];
        assert_eq!(ControlAction::from_outputs(&outputs), ControlAction::Neutral);
    }

    #[test]
    fn every_action_has_a_stick_position_in_pad_range() {
        for action in ControlAction::ALL {
            let (x, y) = action.stick();
            assert!((0.0..=1.0).contains(&x));
            assert!((0.0..=1.0).contains(&y));
        }
    }
}
