use std::{
    thread,
    time::{Duration, Instant},
};

use meleevo_agent::{MenuManager, Squad};
use meleevo_dolphin::{Controller, ControllerError, EventSource, EventStreamError};
use meleevo_state::{GameState, Menu, StateManager};

/// How long an empty poll tick yields before polling again.
const IDLE_SLEEP: Duration = Duration::from_micros(500);

/// The episode could not run to completion.
///
/// Any of these means the generation's fitness data is unusable, so the
/// orchestrator aborts the run rather than score a partial cohort.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub(crate) enum EpisodeError {
    #[display("event stream failed after {processed} of {expected} agents: {source}")]
    Stream {
        processed: usize,
        expected: usize,
        source: EventStreamError,
    },
    #[display("no game-state events for {}s", timeout.as_secs())]
    Stalled { timeout: Duration },
    #[display("stuck outside active play for {}s", timeout.as_secs())]
    MenuTimeout { timeout: Duration },
    #[display("controller channel failed: {_0}")]
    Controller(ControllerError),
}

impl From<ControllerError> for EpisodeError {
    fn from(err: ControllerError) -> Self {
        EpisodeError::Controller(err)
    }
}

/// Drives one live episode to completion.
///
/// Each tick drains the event source (all pending events are applied to the
/// game state in arrival order before anything else happens), then — only if
/// the frame counter advanced — dispatches the current phase exactly once:
/// menus go to the [`MenuManager`], active play goes to the [`Squad`]. The
/// episode succeeds when the squad's finished-agent count reaches the squad
/// size.
///
/// The runner never blocks on the stream; an empty tick sleeps briefly and
/// issues no action. Two watchdogs turn a wedged external process into a
/// typed failure: a stall timeout on the event stream and a timeout on time
/// spent outside the `Game` phase.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EpisodeRunner {
    menu_timeout: Duration,
    stall_timeout: Duration,
}

impl EpisodeRunner {
    pub(crate) fn new(menu_timeout: Duration, stall_timeout: Duration) -> Self {
        Self {
            menu_timeout,
            stall_timeout,
        }
    }

    pub(crate) fn run<E>(
        &self,
        state: &mut GameState,
        manager: &StateManager,
        events: &mut E,
        controller: &mut dyn Controller,
        squad: &mut Squad,
        menus: &mut MenuManager,
    ) -> Result<(), EpisodeError>
    where
        E: EventSource,
    {
        let expected = squad.len();
        let mut last_event_at = Instant::now();
        let mut last_in_game_at = Instant::now();

        loop {
            let last_frame = state.frame();
            let mut received = false;
            loop {
                match events.poll() {
                    Ok(Some(event)) => {
                        received = true;
                        if let Err(err) = manager.apply(state, &event) {
                            log::warn!("skipping malformed event: {err}");
                        }
                    }
                    Ok(None) => break,
                    Err(source) => {
                        return Err(EpisodeError::Stream {
                            processed: squad.finished(),
                            expected,
                            source,
                        });
                    }
                }
            }

            let now = Instant::now();
            if received {
                last_event_at = now;
            } else if now.duration_since(last_event_at) > self.stall_timeout {
                return Err(EpisodeError::Stalled {
                    timeout: self.stall_timeout,
                });
            }
            if state.menu() == Menu::Game {
                last_in_game_at = now;
            } else if now.duration_since(last_in_game_at) > self.menu_timeout {
                return Err(EpisodeError::MenuTimeout {
                    timeout: self.menu_timeout,
                });
            }

            // Duplicate-frame suppression: dispatch only when the live
            // process produced a new frame.
            if state.frame() > last_frame {
                match state.menu() {
                    Menu::Game => {
                        let finished = squad.advance(state, controller)?;
                        if finished == expected {
                            controller.reset()?;
                            return Ok(());
                        }
                    }
                    Menu::CharacterSelect => menus.pick_character(state, controller)?,
                    Menu::StageSelect | Menu::PostGame => menus.advance_menu(state, controller)?,
                }
            }

            if !received {
                thread::sleep(IDLE_SLEEP);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use meleevo_agent::{Agent, Network, NetworkShape};
    use meleevo_dolphin::{Button, Stick};
    use meleevo_state::RawEvent;

    const FRAME_ADDRESS: &str = "00479D60";
    const MENU_ADDRESS: &str = "00479D30";

    fn event(address: &str, value: u32) -> RawEvent {
        RawEvent::new(address, format!("{value:08X}"))
    }

    /// Replays scripted ticks: each inner vec is the batch of events that
    /// arrives in one poll cycle, `Ok(None)` separates the ticks. Once the
    /// script runs out the stream either closes or idles forever.
    struct ScriptedSource {
        ticks: VecDeque<Vec<RawEvent>>,
        current: std::vec::IntoIter<RawEvent>,
        close_when_done: bool,
        closing: bool,
    }

    impl ScriptedSource {
        fn new(ticks: Vec<Vec<RawEvent>>, close_when_done: bool) -> Self {
            Self {
                ticks: ticks.into(),
                current: Vec::new().into_iter(),
                close_when_done,
                closing: false,
            }
        }
    }

    impl EventSource for ScriptedSource {
        fn poll(&mut self) -> Result<Option<RawEvent>, EventStreamError> {
            if let Some(event) = self.current.next() {
                return Ok(Some(event));
            }
            match self.ticks.pop_front() {
                Some(batch) => {
                    self.current = batch.into_iter();
                    Ok(None)
                }
                // One idle tick before closing so the final batch still gets
                // its phase dispatch.
                None if self.close_when_done && !self.closing => {
                    self.closing = true;
                    Ok(None)
                }
                None if self.close_when_done => Err(EventStreamError::Closed),
                None => Ok(None),
            }
        }
    }

    #[derive(Debug, Default)]
    struct RecordingController {
        commands: Vec<String>,
    }

    impl Controller for RecordingController {
        fn press(&mut self, button: Button) -> Result<(), ControllerError> {
            self.commands.push(format!("PRESS {}", button.as_str()));
            Ok(())
        }

        fn release(&mut self, button: Button) -> Result<(), ControllerError> {
            self.commands.push(format!("RELEASE {}", button.as_str()));
            Ok(())
        }

        fn set_stick(&mut self, stick: Stick, x: f32, y: f32) -> Result<(), ControllerError> {
            self.commands
                .push(format!("SET {} {x} {y}", stick.as_str()));
            Ok(())
        }
    }

    fn squad_of(count: usize, frames_per_agent: u32) -> Squad {
        let shape = NetworkShape {
            inputs: 19,
            hidden: 2,
            outputs: 14,
        };
        let agents = (0..count)
            .map(|_| {
                let genome = vec![0.5; shape.weight_count()];
                Agent::new(Network::from_genome(shape, &genome).unwrap(), 0, 1)
            })
            .collect();
        Squad::new(agents, frames_per_agent)
    }

    fn runner() -> EpisodeRunner {
        EpisodeRunner::new(Duration::from_secs(60), Duration::from_secs(60))
    }

    fn run_episode(
        runner: EpisodeRunner,
        source: &mut ScriptedSource,
        squad: &mut Squad,
    ) -> (Result<(), EpisodeError>, RecordingController, GameState) {
        let manager = StateManager::new();
        let mut state = GameState::new();
        let mut controller = RecordingController::default();
        let mut menus = MenuManager::new();
        let result = runner.run(
            &mut state,
            &manager,
            source,
            &mut controller,
            squad,
            &mut menus,
        );
        (result, controller, state)
    }

    #[test]
    fn episode_ends_after_exactly_the_configured_agent_count() {
        // 5 agents, one frame each: the 5th frame must end the episode, with
        // the stream closing right after (reaching the closed stream would
        // fail the test).
        let mut ticks = vec![vec![event(MENU_ADDRESS, 2)]];
        for frame in 1..=5 {
            ticks.push(vec![event(FRAME_ADDRESS, frame)]);
        }
        let mut source = ScriptedSource::new(ticks, true);
        let mut squad = squad_of(5, 1);
        let (result, controller, _) = run_episode(runner(), &mut source, &mut squad);
        result.unwrap();
        assert_eq!(squad.finished(), 5);
        // The terminal reset releases every button.
        assert!(controller.commands.iter().any(|c| c == "RELEASE START"));
    }

    #[test]
    fn no_events_means_no_state_change_and_no_action() {
        // Only a menu event arrives; the frame never advances, so no phase
        // dispatch happens before the stream closes.
        let ticks = vec![vec![event(MENU_ADDRESS, 2)]];
        let mut source = ScriptedSource::new(ticks, true);
        let mut squad = squad_of(1, 1);
        let (result, controller, state) = run_episode(runner(), &mut source, &mut squad);
        assert!(matches!(
            result,
            Err(EpisodeError::Stream {
                processed: 0,
                expected: 1,
                source: EventStreamError::Closed,
            })
        ));
        assert!(controller.commands.is_empty());
        assert_eq!(state.frame(), 0);
    }

    #[test]
    fn multiple_events_in_one_tick_dispatch_once() {
        // Two frame increments arrive in the same tick: the agent must act
        // exactly once, not twice.
        let ticks = vec![
            vec![event(MENU_ADDRESS, 2)],
            vec![event(FRAME_ADDRESS, 1), event(FRAME_ADDRESS, 2)],
        ];
        let mut source = ScriptedSource::new(ticks, true);
        let mut squad = squad_of(1, 10);
        let (result, controller, state) = run_episode(runner(), &mut source, &mut squad);
        assert!(matches!(result, Err(EpisodeError::Stream { .. })));
        assert_eq!(state.frame(), 2);
        let actions = controller
            .commands
            .iter()
            .filter(|c| c.starts_with("SET MAIN"))
            .count();
        assert_eq!(actions, 1);
    }

    #[test]
    fn malformed_events_are_skipped_without_ending_the_episode() {
        let ticks = vec![
            vec![event(MENU_ADDRESS, 2)],
            vec![RawEvent::new("garbage", "alsogarbage")],
            vec![event(FRAME_ADDRESS, 1)],
        ];
        let mut source = ScriptedSource::new(ticks, true);
        let mut squad = squad_of(1, 1);
        let (result, _, state) = run_episode(runner(), &mut source, &mut squad);
        result.unwrap();
        assert_eq!(state.frame(), 1);
    }

    #[test]
    fn menu_navigation_runs_outside_active_play() {
        let ticks = vec![
            vec![event(FRAME_ADDRESS, 1)], // character select, odd frame: release A
            vec![event(FRAME_ADDRESS, 2)], // even frame: press A
            vec![event(MENU_ADDRESS, 1)],
            vec![event(FRAME_ADDRESS, 3)], // stage select, odd frame: release START
            vec![event(FRAME_ADDRESS, 4)], // even frame: press START
        ];
        let mut source = ScriptedSource::new(ticks, true);
        let mut squad = squad_of(1, 1);
        let (result, controller, _) = run_episode(runner(), &mut source, &mut squad);
        assert!(matches!(result, Err(EpisodeError::Stream { .. })));
        assert!(controller.commands.contains(&"PRESS A".to_owned()));
        assert!(controller.commands.contains(&"PRESS START".to_owned()));
    }

    #[test]
    fn game_phase_persists_across_episodes_without_new_menu_events() {
        // Episodes end on the agent counter, mid-match. The watcher streams
        // only changes, so a later episode sees frame events but no menu
        // event; the shared state must still treat them as active play
        // instead of falling back to character select.
        let manager = StateManager::new();
        let mut state = GameState::new();
        let mut menus = MenuManager::new();

        let first = vec![
            vec![event(MENU_ADDRESS, 2)],
            vec![event(FRAME_ADDRESS, 1)],
        ];
        let mut source = ScriptedSource::new(first, true);
        let mut squad = squad_of(1, 1);
        let mut controller = RecordingController::default();
        runner()
            .run(
                &mut state,
                &manager,
                &mut source,
                &mut controller,
                &mut squad,
                &mut menus,
            )
            .unwrap();

        // Second episode: frame counter keeps climbing, menu address silent.
        let second: Vec<Vec<RawEvent>> =
            (2..=3).map(|frame| vec![event(FRAME_ADDRESS, frame)]).collect();
        let mut source = ScriptedSource::new(second, true);
        let mut squad = squad_of(2, 1);
        let mut controller = RecordingController::default();
        runner()
            .run(
                &mut state,
                &manager,
                &mut source,
                &mut controller,
                &mut squad,
                &mut menus,
            )
            .unwrap();
        assert_eq!(squad.finished(), 2);
        // Frame 2 is even: a state stuck in character select would tap A.
        assert!(!controller.commands.contains(&"PRESS A".to_owned()));
    }

    #[test]
    fn silent_stream_times_out_as_stalled() {
        let runner = EpisodeRunner::new(Duration::from_secs(60), Duration::ZERO);
        let mut source = ScriptedSource::new(vec![], false);
        let mut squad = squad_of(1, 1);
        let (result, _, _) = run_episode(runner, &mut source, &mut squad);
        assert!(matches!(result, Err(EpisodeError::Stalled { .. })));
    }

    #[test]
    fn never_reaching_game_phase_times_out() {
        let runner = EpisodeRunner::new(Duration::ZERO, Duration::from_secs(60));
        // Frames keep flowing but the menu never leaves character select.
        let ticks: Vec<Vec<RawEvent>> = (1..=200)
            .map(|frame| vec![event(FRAME_ADDRESS, frame)])
            .collect();
        let mut source = ScriptedSource::new(ticks, false);
        let mut squad = squad_of(1, 1);
        let (result, _, _) = run_episode(runner, &mut source, &mut squad);
        assert!(matches!(result, Err(EpisodeError::MenuTimeout { .. })));
    }
}
