use meleevo_dolphin::{Controller, ControllerError};
use meleevo_state::GameState;

use crate::{action::ControlAction, network::Network};

/// Rough horizontal half-extent of the stage, used to normalize positions.
const STAGE_HALF_WIDTH: f32 = 85.5657;
/// Damage percent treated as "very high" for input normalization.
const PERCENT_SCALE: f32 = 200.0;
const STOCK_SCALE: f32 = 4.0;
const ACTION_STATE_SCALE: f32 = 400.0;

/// Builds the network input vector from the observable state.
///
/// Seven normalized features per player (own slot first), then relative
/// position, distance, a frame-phase feature and a constant bias-like input.
/// Length matches [`NetworkShape::MELEE.inputs`].
///
/// [`NetworkShape::MELEE.inputs`]: crate::NetworkShape::MELEE
#[must_use]
pub fn encode_inputs(state: &GameState, own_slot: usize, opponent_slot: usize) -> Vec<f32> {
    let mut inputs = Vec::with_capacity(19);
    for slot in [own_slot, opponent_slot] {
        let player = state.player(slot);
        inputs.push(player.pos_x / STAGE_HALF_WIDTH);
        inputs.push(player.pos_y / STAGE_HALF_WIDTH);
        inputs.push(player.percent / PERCENT_SCALE);
        #[expect(clippy::cast_precision_loss)]
        inputs.push(player.stock as f32 / STOCK_SCALE);
        inputs.push(player.facing);
        #[expect(clippy::cast_precision_loss)]
        inputs.push(player.action_state as f32 / ACTION_STATE_SCALE);
        #[expect(clippy::cast_precision_loss)]
        inputs.push(player.character as f32 / 32.0);
    }
    let own = state.player(own_slot);
    let other = state.player(opponent_slot);
    let dx = (other.pos_x - own.pos_x) / STAGE_HALF_WIDTH;
    let dy = (other.pos_y - own.pos_y) / STAGE_HALF_WIDTH;
    inputs.push(dx);
    inputs.push(dy);
    inputs.push(dx.hypot(dy));
    #[expect(clippy::cast_precision_loss)]
    inputs.push((state.frame() % 60) as f32 / 60.0);
    inputs.push(1.0);
    inputs
}

/// One genome's live controller for a single episode.
///
/// The agent reads the shared game state, emits one [`ControlAction`] per
/// frame while it holds the controller, and accumulates the two episode
/// objectives: damage suffered on its own slot and damage inflicted on the
/// opponent slot. Agents are created fresh each generation and discarded
/// after their episode.
#[derive(Debug, Clone)]
pub struct Agent {
    net: Network,
    own_slot: usize,
    opponent_slot: usize,
    self_damage: f32,
    damage_dealt: f32,
    last_percents: Option<(f32, f32)>,
    last_action: Option<ControlAction>,
}

impl Agent {
    #[must_use]
    pub fn new(net: Network, own_slot: usize, opponent_slot: usize) -> Self {
        Self {
            net,
            own_slot,
            opponent_slot,
            self_damage: 0.0,
            damage_dealt: 0.0,
            last_percents: None,
            last_action: None,
        }
    }

    /// Folds this frame's damage deltas into the running objectives.
    ///
    /// Percent drops (a lost stock resets percent to zero) are not counted as
    /// negative damage; only increases score.
    pub fn observe(&mut self, state: &GameState) {
        let own = state.player(self.own_slot).percent;
        let other = state.player(self.opponent_slot).percent;
        if let Some((last_own, last_other)) = self.last_percents {
            self.self_damage += (own - last_own).max(0.0);
            self.damage_dealt += (other - last_other).max(0.0);
        }
        self.last_percents = Some((own, other));
    }

    /// Chooses and issues this frame's action.
    pub fn act(
        &mut self,
        state: &GameState,
        controller: &mut dyn Controller,
    ) -> Result<(), ControllerError> {
        let inputs = encode_inputs(state, self.own_slot, self.opponent_slot);
        let outputs = self.net.forward(&inputs);
        let action = ControlAction::from_outputs(&outputs);
        action.apply(self.last_action, controller)?;
        self.last_action = Some(action);
        Ok(())
    }

    /// Episode objectives accumulated so far: `(self damage, damage dealt)`.
    #[must_use]
    pub fn outcome(&self) -> (f32, f32) {
        (self.self_damage, self.damage_dealt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkShape;
    use meleevo_state::{RawEvent, StateManager};

    fn test_agent() -> Agent {
        let genome = vec![0.5; NetworkShape::MELEE.weight_count()];
        let net = Network::from_genome(NetworkShape::MELEE, &genome).unwrap();
        Agent::new(net, 0, 1)
    }

    fn state_with_percents(own: f32, other: f32) -> GameState {
        let manager = StateManager::new();
        let mut state = GameState::new();
        let own_addr = format!("{:08X}", 0x0045_3080u32 + 0x60);
        let other_addr = format!("{:08X}", 0x0045_3080u32 + 0xE90 + 0x60);
        manager
            .apply(
                &mut state,
                &RawEvent::new(own_addr, format!("{:08X}", own.to_bits())),
            )
            .unwrap();
        manager
            .apply(
                &mut state,
                &RawEvent::new(other_addr, format!("{:08X}", other.to_bits())),
            )
            .unwrap();
        state
    }

    #[test]
    fn input_vector_matches_the_network_shape() {
        let state = GameState::new();
        assert_eq!(encode_inputs(&state, 0, 1).len(), NetworkShape::MELEE.inputs);
    }

    #[test]
    fn damage_deltas_accumulate_per_objective() {
        let mut agent = test_agent();
        agent.observe(&state_with_percents(0.0, 0.0));
        agent.observe(&state_with_percents(12.0, 0.0));
        agent.observe(&state_with_percents(12.0, 20.0));
        assert_eq!(agent.outcome(), (12.0, 20.0));
    }

    #[test]
    fn percent_reset_after_lost_stock_does_not_score_negative() {
        let mut agent = test_agent();
        agent.observe(&state_with_percents(80.0, 50.0));
        // Own stock lost: percent back to zero.
        agent.observe(&state_with_percents(0.0, 50.0));
        agent.observe(&state_with_percents(5.0, 50.0));
        assert_eq!(agent.outcome(), (5.0, 0.0));
    }

    #[test]
    fn first_observation_only_snapshots() {
        let mut agent = test_agent();
        agent.observe(&state_with_percents(60.0, 90.0));
        assert_eq!(agent.outcome(), (0.0, 0.0));
    }
}
