use meleevo_dolphin::{Controller, ControllerError};
use meleevo_state::GameState;

use crate::agent::Agent;

/// The agent rotation for one episode.
///
/// Each agent holds the controller for a fixed window of frames; when its
/// window closes the next agent takes over. [`advance`] is called once per
/// advanced frame during the `Game` phase and returns how many agents have
/// finished — the episode is over when that count reaches [`len`].
///
/// [`advance`]: Squad::advance
/// [`len`]: Squad::len
#[derive(Debug)]
pub struct Squad {
    agents: Vec<Agent>,
    active: usize,
    frames_per_agent: u32,
    frames_in_window: u32,
}

impl Squad {
    /// # Panics
    ///
    /// Panics if `frames_per_agent` is zero.
    #[must_use]
    pub fn new(agents: Vec<Agent>, frames_per_agent: u32) -> Self {
        assert!(frames_per_agent > 0);
        Self {
            agents,
            active: 0,
            frames_per_agent,
            frames_in_window: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents whose control window has completed.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.active
    }

    /// Runs one frame for the active agent and returns the finished count.
    pub fn advance(
        &mut self,
        state: &GameState,
        controller: &mut dyn Controller,
    ) -> Result<usize, ControllerError> {
        let Some(agent) = self.agents.get_mut(self.active) else {
            return Ok(self.active);
        };
        agent.observe(state);
        agent.act(state, controller)?;
        self.frames_in_window += 1;
        if self.frames_in_window >= self.frames_per_agent {
            self.active += 1;
            self.frames_in_window = 0;
        }
        Ok(self.active)
    }

    /// Per-agent `(self damage, damage dealt)` outcomes, in agent order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<(f32, f32)> {
        self.agents.iter().map(Agent::outcome).collect()
    }
}
