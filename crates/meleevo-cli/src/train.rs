use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use meleevo_agent::{Agent, MenuManager, Network, NetworkShape, Squad};
use meleevo_dolphin::{MemoryWatcher, Pad, find_dolphin_dir, pad_pipe_path, watcher_socket_path, write_locations};
use meleevo_state::{GameState, StateManager};
use meleevo_training::{Evolver, Fitness, Individual, ObjectiveSummary, random_genome, select_nsga2};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    command::CommandArgs,
    episode::EpisodeRunner,
    schema::{ChampionEntry, ChampionModel},
    util::Output,
};

/// Controller port the evolving agents play on; the opponent sits on the
/// other port.
const OWN_SLOT: usize = 0;
const OPPONENT_SLOT: usize = 1;

pub(crate) fn run(args: &CommandArgs) -> anyhow::Result<()> {
    let Some(dolphin_dir) = args.dolphin_dir.clone().or_else(find_dolphin_dir) else {
        eprintln!("No Dolphin user directory found; run the emulator once or pass --dolphin-dir");
        return Ok(());
    };
    eprintln!("Dolphin user directory: {}", dolphin_dir.display());

    let manager = StateManager::new();
    write_locations(&dolphin_dir, &manager.locations())
        .with_context(|| format!("Failed to write Locations.txt under {}", dolphin_dir.display()))?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    let mut rng = match args.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let genome_len = NetworkShape::MELEE.weight_count();
    #[expect(clippy::cast_precision_loss)]
    let evolver = Evolver {
        crossover_prob: args.cxpb,
        crossover_eta: args.eta,
        mutation_eta: args.eta,
        mutation_gene_prob: 1.0 / genome_len as f32,
    };
    let runner = EpisodeRunner::new(
        Duration::from_secs(args.menu_timeout_secs),
        Duration::from_secs(args.stall_timeout_secs),
    );

    let mut population: Vec<Individual> = (0..args.population)
        .map(|_| Individual::new(random_genome(&mut rng, genome_len)))
        .collect();

    // One state for the whole run. The watcher only streams changes, so a
    // later episode must keep the menu and percents observed by the earlier
    // ones; episodes end mid-match and no menu event arrives to re-teach a
    // fresh state that the process is still in active play.
    let mut state = GameState::new();

    // Generation zero is a real episode too: the random population must be
    // scored before the first survivor selection.
    let evaluated = evaluate_cohort(
        &runner,
        &manager,
        &dolphin_dir,
        &mut state,
        &mut population,
        args,
    )?;
    let mut population = select_nsga2(population, args.population);
    log_generation(0, evaluated, &population);

    let mut completed = 0;
    for generation in 1..=args.generations {
        if stop.load(Ordering::SeqCst) {
            eprintln!("Interrupted; stopping after generation #{completed}");
            break;
        }
        let offspring = evolver.vary(&population, args.population, &mut rng);
        let mut pool = population;
        pool.extend(offspring);
        let evaluated =
            evaluate_cohort(&runner, &manager, &dolphin_dir, &mut state, &mut pool, args)?;
        population = select_nsga2(pool, args.population);
        completed = generation;
        log_generation(generation, evaluated, &population);
    }

    let champions: Vec<ChampionEntry> = population
        .iter()
        .filter(|ind| ind.rank() == 0)
        .filter_map(|ind| {
            ind.fitness().map(|fitness| ChampionEntry {
                self_damage: fitness.self_damage,
                damage_dealt: fitness.damage_dealt,
                genome: ind.genome().to_vec(),
            })
        })
        .collect();
    let model = ChampionModel {
        name: "melee".to_owned(),
        trained_at: Utc::now(),
        generations: completed,
        champions,
    };
    Output::save_json(&model, args.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &args.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generations: {}", model.generations);
    eprintln!("  Champions: {}", model.champions.len());

    Ok(())
}

/// Scores every unscored individual in the cohort with one live episode.
///
/// The episode channels (watcher socket, controller pipe) are opened at the
/// start and dropped at the end, so a failed episode never leaks a stale
/// socket file into the next attempt. The game state is the caller's and
/// carries over between episodes. Returns the number of agents scored.
fn evaluate_cohort(
    runner: &EpisodeRunner,
    manager: &StateManager,
    dolphin_dir: &std::path::Path,
    state: &mut GameState,
    cohort: &mut [Individual],
    args: &CommandArgs,
) -> anyhow::Result<usize> {
    let pending: Vec<usize> = (0..cohort.len())
        .filter(|&i| !cohort[i].is_scored())
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let agents = pending
        .iter()
        .map(|&i| {
            let net = Network::from_genome(NetworkShape::MELEE, cohort[i].genome())?;
            Ok(Agent::new(net, OWN_SLOT, OPPONENT_SLOT))
        })
        .collect::<Result<Vec<Agent>, meleevo_agent::ShapeError>>()?;
    let mut squad = Squad::new(agents, args.frames_per_agent);

    let socket = watcher_socket_path(dolphin_dir);
    let mut events = MemoryWatcher::bind(&socket)
        .with_context(|| format!("Failed to bind watcher socket: {}", socket.display()))?;
    let pipe = pad_pipe_path(dolphin_dir);
    let mut pad = Pad::open(&pipe)
        .with_context(|| format!("Failed to open controller pipe: {}", pipe.display()))?;

    let mut menus = MenuManager::new();
    runner
        .run(state, manager, &mut events, &mut pad, &mut squad, &mut menus)
        .context("Episode aborted before every agent was scored")?;

    for (&i, (self_damage, damage_dealt)) in pending.iter().zip(squad.outcomes()) {
        cohort[i].set_fitness(Fitness {
            self_damage,
            damage_dealt,
        });
    }
    Ok(pending.len())
}

fn log_generation(generation: u32, evaluated: usize, population: &[Individual]) {
    eprintln!("Generation #{generation}: {evaluated} agents scored");
    if let Some(summary) = ObjectiveSummary::new(population.iter().filter_map(Individual::fitness))
    {
        eprintln!(
            "  Self damage:  {:.1} .. {:.1}",
            summary.min_self_damage, summary.max_self_damage
        );
        eprintln!(
            "  Damage dealt: {:.1} .. {:.1}",
            summary.min_damage_dealt, summary.max_damage_dealt
        );
    }
}
