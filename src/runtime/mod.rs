//! Game session runtime
//!
//! `GameRuntime` owns the live `GameState`, the seeded RNG, a virtual clock
//! and every pending timer. Hosts feed it player input and elapsed time;
//! it applies the simulation rules and reports what happened through a
//! `Feedback` implementation.
//!
//! All mutation goes through `&mut self`, so player actions, goblin ticks
//! and timer callbacks are serialized. Timers carry the generation they were
//! scheduled under and are dropped if the level has since been reset.

pub mod timers;

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TRAP_COUNTDOWN_TICKS;
use crate::feedback::{Cue, Feedback, Haptic, Volume};
use crate::settings::Settings;
use crate::sim::{
    BackstabOutcome, DeathCause, Direction, GameState, GameStatus, Input, MoveOutcome, Probe,
    advance, apply_backstab, apply_move, resolve_backstab, resolve_hear, resolve_move,
};
use timers::{TimerEvent, TimerId, TimerQueue};

/// In-memory tallies for the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub levels_cleared: u32,
    pub falls: u32,
    pub ambushes: u32,
    pub trap_deaths: u32,
    pub goblins_slain: u32,
}

impl SessionStats {
    pub fn deaths(&self) -> u32 {
        self.falls + self.ambushes + self.trap_deaths
    }

    fn record_death(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::Fall => self.falls += 1,
            DeathCause::Ambush => self.ambushes += 1,
            DeathCause::Trap => self.trap_deaths += 1,
        }
    }
}

/// Active trap countdown
#[derive(Debug, Clone, Copy)]
struct TrapCountdown {
    remaining: u32,
    timer: TimerId,
}

/// One game session
pub struct GameRuntime<F: Feedback> {
    state: GameState,
    settings: Settings,
    feedback: F,
    rng: Pcg32,
    seed: u64,
    /// Virtual clock (ms since session start)
    now_ms: u64,
    /// Bumped on every level reset; stale timers compare against it
    generation: u64,
    timers: TimerQueue,
    trap: Option<TrapCountdown>,
    /// Hear cue in flight
    hearing: bool,
    last_tap_ms: Option<u64>,
    next_goblin_tick_ms: u64,
    next_proximity_ms: u64,
    /// Goblins whose proximity cue is currently playing
    audible: BTreeSet<u32>,
    stats: SessionStats,
    shut_down: bool,
}

impl<F: Feedback> GameRuntime<F> {
    /// Start a session on a freshly generated first level
    pub fn new(seed: u64, settings: Settings, feedback: F) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = GameState::generate(1, settings.trap_count, &mut rng);
        Self::from_parts(state, rng, seed, settings, feedback)
    }

    /// Start a session on a prepared level
    pub fn with_state(state: GameState, seed: u64, settings: Settings, feedback: F) -> Self {
        Self::from_parts(state, Pcg32::seed_from_u64(seed), seed, settings, feedback)
    }

    fn from_parts(
        state: GameState,
        rng: Pcg32,
        seed: u64,
        settings: Settings,
        feedback: F,
    ) -> Self {
        log::info!("Session started with seed {}", seed);
        let mut runtime = Self {
            state,
            settings,
            feedback,
            rng,
            seed,
            now_ms: 0,
            generation: 0,
            timers: TimerQueue::new(),
            trap: None,
            hearing: false,
            last_tap_ms: None,
            next_goblin_tick_ms: 0,
            next_proximity_ms: 0,
            audible: BTreeSet::new(),
            stats: SessionStats::default(),
            shut_down: false,
        };
        runtime.begin_level();
        runtime
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_hearing(&self) -> bool {
        self.hearing
    }

    /// Seconds left on the trap countdown, if one is running
    pub fn trap_remaining(&self) -> Option<u32> {
        self.trap.map(|t| t.remaining)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Swap in new settings. Timers already scheduled keep their due times;
    /// later ones use the new timing.
    pub fn update_settings(&mut self, settings: Settings) {
        log::info!("Settings updated");
        self.settings = settings;
    }

    // === Input ===

    pub fn handle(&mut self, input: Input) {
        match input {
            Input::Hear(dir) => self.hear(dir),
            Input::Move(dir) => self.move_player(dir),
            Input::Backstab => self.tap(),
        }
    }

    /// Probe the neighbouring cell. Never changes the game state.
    pub fn hear(&mut self, dir: Direction) {
        if self.shut_down || !self.state.is_playing() {
            return;
        }
        if self.hearing {
            log::debug!("Hear {} ignored, previous probe still playing", dir.as_str());
            return;
        }

        self.hearing = true;
        let due = self.now_ms + self.settings.timing.hear_cue_ms;
        self.timers
            .schedule(due, self.generation, TimerEvent::HearFinished);

        let probe = resolve_hear(&self.state, dir);
        log::debug!("Hear {} from {:?}: {:?}", dir.as_str(), self.state.player, probe);
        self.cue(Cue::HearAmbient);
        match probe {
            Probe::Path => {
                self.cue(Cue::Cave);
                self.haptic(Haptic::LightImpact);
            }
            Probe::Wall | Probe::OutOfBounds => self.cue(Cue::Wind),
        }
    }

    pub fn move_player(&mut self, dir: Direction) {
        if self.shut_down {
            return;
        }

        let outcome = resolve_move(&self.state, dir);
        apply_move(&mut self.state, outcome);

        match outcome {
            MoveOutcome::Ignored => log::debug!("Move {:?} ignored ({:?})", dir, self.state.status),
            MoveOutcome::Died(cause) => self.on_death(cause),
            MoveOutcome::Moved {
                to,
                left_trap,
                entered_trap,
                reached_end,
            } => {
                log::debug!("Moved {} to {:?}", dir.as_str(), to);
                if left_trap {
                    self.cancel_trap_countdown();
                }
                self.cue(Cue::Step);
                self.haptic(Haptic::LightImpact);
                if reached_end {
                    self.on_win();
                } else if entered_trap {
                    self.start_trap_countdown();
                }
            }
        }
    }

    /// A single tap. The second tap inside the double-tap window attacks.
    pub fn tap(&mut self) {
        if self.shut_down || !self.state.is_playing() {
            return;
        }

        let now = self.now_ms;
        let window = self.settings.timing.double_tap_window_ms;
        let is_double =
            matches!(self.last_tap_ms, Some(prev) if now > prev && now - prev <= window);
        if !is_double {
            self.last_tap_ms = Some(now);
            return;
        }

        let outcome = resolve_backstab(&self.state);
        apply_backstab(&mut self.state, outcome);
        // A double tap that hits nothing still counts as the latest tap
        self.last_tap_ms = match outcome {
            BackstabOutcome::Missed => Some(now),
            _ => None,
        };

        match outcome {
            BackstabOutcome::Ignored => {}
            BackstabOutcome::Missed => log::debug!("Backstab hit nothing"),
            BackstabOutcome::Died(cause) => self.on_death(cause),
            BackstabOutcome::Killed { goblin_id } => {
                log::info!("Goblin {} slain", goblin_id);
                self.stats.goblins_slain += 1;
                if self.audible.remove(&goblin_id) {
                    self.stop_goblin(goblin_id);
                }
                self.cue(Cue::Attack);
                self.haptic(Haptic::Success);
            }
        }
    }

    // === Time ===

    /// Advance the virtual clock, firing timers and periodic tasks in order
    pub fn update(&mut self, dt_ms: u64) {
        if self.shut_down {
            return;
        }
        let target = self.now_ms.saturating_add(dt_ms);

        loop {
            let timer_due = self.timers.next_due();
            let next = [
                timer_due,
                Some(self.next_goblin_tick_ms),
                Some(self.next_proximity_ms),
            ]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(u64::MAX);

            if next > target {
                break;
            }
            self.now_ms = self.now_ms.max(next);

            if timer_due == Some(next) {
                self.fire_due_timer();
            } else if self.next_goblin_tick_ms == next {
                self.next_goblin_tick_ms += self.settings.timing.goblin_tick_ms.max(1);
                self.goblin_tick();
            } else {
                self.next_proximity_ms += self.settings.timing.proximity_sample_ms.max(1);
                self.sample_proximity();
            }
        }

        self.now_ms = target;
    }

    fn fire_due_timer(&mut self) {
        let Some(timer) = self.timers.pop_due(self.now_ms) else {
            return;
        };
        if timer.generation != self.generation {
            log::debug!("Dropping stale {:?} from generation {}", timer.event, timer.generation);
            return;
        }

        match timer.event {
            TimerEvent::RestartLevel => self.restart_level(),
            TimerEvent::NextLevel => {
                self.continue_to_next_level();
            }
            TimerEvent::HearFinished => self.hearing = false,
            TimerEvent::TrapTick => self.trap_tick(),
        }
    }

    /// Move every goblin one step (only while playing)
    fn goblin_tick(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        for goblin in self.state.goblins.iter_mut() {
            let moved = advance(goblin, &self.state.grid, &mut self.rng);
            if moved.pos != goblin.pos {
                log::debug!("Goblin {} {:?} -> {:?}", goblin.id, goblin.pos, moved.pos);
            }
            *goblin = moved;
        }
    }

    /// Drive goblin cue volumes from distance. Reads the state only.
    fn sample_proximity(&mut self) {
        if !self.state.is_playing() {
            return;
        }

        let player = self.state.player;
        let levels: Vec<(u32, Volume)> = self
            .state
            .goblins
            .iter()
            .map(|g| (g.id, Volume::from_distance(g.distance_to(player))))
            .collect();

        let gone: Vec<u32> = self
            .audible
            .iter()
            .copied()
            .filter(|id| !levels.iter().any(|(live, _)| live == id))
            .collect();
        for id in gone {
            self.audible.remove(&id);
            self.stop_goblin(id);
        }

        for (id, volume) in levels {
            if volume.is_silent() {
                if self.audible.remove(&id) {
                    self.stop_goblin(id);
                }
            } else {
                self.audible.insert(id);
                if let Err(e) = self.feedback.set_goblin_volume(id, volume) {
                    log::warn!("Goblin {} volume failed: {}", id, e);
                }
            }
        }
    }

    // === Transitions ===

    /// Replay the current level from its start cell
    pub fn restart_level(&mut self) {
        if self.shut_down {
            return;
        }
        log::info!("Restarting level {}", self.state.level);
        self.reset_transient();
        self.state.restart();
        self.begin_level();
    }

    /// Replace the level after a win. Returns false unless the level was won.
    pub fn continue_to_next_level(&mut self) -> bool {
        if self.shut_down || self.state.status != GameStatus::Won {
            return false;
        }
        let level = self.state.level + 1;
        self.reset_transient();
        self.state = GameState::generate(level, self.settings.trap_count, &mut self.rng);
        self.begin_level();
        true
    }

    /// Stop all timers and sounds; further input and updates are ignored
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.reset_transient();
        self.shut_down = true;
        log::info!(
            "Session ended: {} levels cleared, {} deaths",
            self.stats.levels_cleared,
            self.stats.deaths()
        );
    }

    /// Invalidate everything scheduled against the current level
    fn reset_transient(&mut self) {
        self.generation += 1;
        self.cancel_trap_countdown();
        self.timers.clear();
        self.silence_goblins();
        self.hearing = false;
        self.last_tap_ms = None;
    }

    fn begin_level(&mut self) {
        self.next_goblin_tick_ms = self.now_ms + self.settings.timing.goblin_tick_ms;
        self.next_proximity_ms = self.now_ms + self.settings.timing.proximity_sample_ms;
        self.cue(Cue::LevelStart);
    }

    fn on_death(&mut self, cause: DeathCause) {
        log::info!(
            "Player died ({:?}) at {:?} on level {}",
            cause,
            self.state.player,
            self.state.level
        );
        self.cancel_trap_countdown();
        self.silence_goblins();
        self.last_tap_ms = None;
        self.stats.record_death(cause);
        self.cue(Cue::Death);
        self.haptic(Haptic::Error);

        let due = self.now_ms + self.settings.timing.death_restart_ms;
        self.timers
            .schedule(due, self.generation, TimerEvent::RestartLevel);
    }

    fn on_win(&mut self) {
        log::info!("Level {} cleared", self.state.level);
        self.cancel_trap_countdown();
        self.silence_goblins();
        self.stats.levels_cleared += 1;
        self.cue(Cue::Win);
        self.haptic(Haptic::Success);

        if self.settings.auto_advance {
            let due = self.now_ms + self.settings.timing.win_continue_ms;
            self.timers.schedule(due, self.generation, TimerEvent::NextLevel);
        }
    }

    // === Trap countdown ===

    fn start_trap_countdown(&mut self) {
        self.cancel_trap_countdown();
        let due = self.now_ms + self.settings.timing.trap_tick_ms;
        let timer = self.timers.schedule(due, self.generation, TimerEvent::TrapTick);
        self.trap = Some(TrapCountdown {
            remaining: TRAP_COUNTDOWN_TICKS,
            timer,
        });
        log::debug!("Trap at {:?}, {} seconds", self.state.player, TRAP_COUNTDOWN_TICKS);
        self.cue(Cue::TrapLoopStart);
        self.haptic(Haptic::Error);
    }

    fn trap_tick(&mut self) {
        let Some(mut trap) = self.trap else {
            return;
        };
        trap.remaining = trap.remaining.saturating_sub(1);

        if trap.remaining == 0 {
            self.state.status = GameStatus::Dead;
            self.on_death(DeathCause::Trap);
            return;
        }

        self.cue(Cue::Countdown {
            remaining: trap.remaining,
        });
        let due = self.now_ms + self.settings.timing.trap_tick_ms;
        trap.timer = self.timers.schedule(due, self.generation, TimerEvent::TrapTick);
        self.trap = Some(trap);
    }

    fn cancel_trap_countdown(&mut self) {
        if let Some(trap) = self.trap.take() {
            self.timers.cancel(trap.timer);
            self.cue(Cue::TrapLoopStop);
        }
    }

    // === Feedback (best-effort) ===

    fn cue(&mut self, cue: Cue) {
        if let Err(e) = self.feedback.play_cue(cue) {
            log::warn!("Cue {:?} failed: {}", cue, e);
        }
    }

    fn haptic(&mut self, kind: Haptic) {
        if !self.settings.haptics {
            return;
        }
        if let Err(e) = self.feedback.haptic(kind) {
            log::warn!("Haptic {:?} failed: {}", kind, e);
        }
    }

    fn stop_goblin(&mut self, id: u32) {
        if let Err(e) = self.feedback.stop_goblin_cue(id) {
            log::warn!("Stopping goblin {} cue failed: {}", id, e);
        }
    }

    fn silence_goblins(&mut self) {
        for id in std::mem::take(&mut self.audible) {
            self.stop_goblin(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedbackError;
    use crate::sim::{Grid, Position};

    #[derive(Debug, Default)]
    struct Recorder {
        cues: Vec<Cue>,
        haptics: Vec<Haptic>,
        volumes: Vec<(u32, Volume)>,
        stopped: Vec<u32>,
    }

    impl Recorder {
        fn count(&self, cue: Cue) -> usize {
            self.cues.iter().filter(|c| **c == cue).count()
        }
    }

    impl Feedback for Recorder {
        fn play_cue(&mut self, cue: Cue) -> Result<(), FeedbackError> {
            self.cues.push(cue);
            Ok(())
        }

        fn set_goblin_volume(
            &mut self,
            goblin_id: u32,
            volume: Volume,
        ) -> Result<(), FeedbackError> {
            self.volumes.push((goblin_id, volume));
            Ok(())
        }

        fn stop_goblin_cue(&mut self, goblin_id: u32) -> Result<(), FeedbackError> {
            self.stopped.push(goblin_id);
            Ok(())
        }

        fn haptic(&mut self, kind: Haptic) -> Result<(), FeedbackError> {
            self.haptics.push(kind);
            Ok(())
        }
    }

    /// Every call fails
    struct Broken;

    impl Feedback for Broken {
        fn play_cue(&mut self, _cue: Cue) -> Result<(), FeedbackError> {
            Err(FeedbackError::Unavailable)
        }

        fn set_goblin_volume(&mut self, _id: u32, _volume: Volume) -> Result<(), FeedbackError> {
            Err(FeedbackError::Unavailable)
        }

        fn stop_goblin_cue(&mut self, _id: u32) -> Result<(), FeedbackError> {
            Err(FeedbackError::Playback("device lost".into()))
        }

        fn haptic(&mut self, _kind: Haptic) -> Result<(), FeedbackError> {
            Err(FeedbackError::Unavailable)
        }
    }

    /// Top-row corridor (0,0) -> (5,0), everything else wall
    fn corridor() -> GameState {
        GameState::with_layout(
            Grid::from_rows(&["......"]),
            Position::new(0, 0),
            Position::new(5, 0),
        )
    }

    fn runtime(state: GameState) -> GameRuntime<Recorder> {
        GameRuntime::with_state(state, 7, Settings::default(), Recorder::default())
    }

    #[test]
    fn test_new_session_starts_playing() {
        let rt = GameRuntime::new(1234, Settings::default(), Recorder::default());
        assert_eq!(rt.state().level, 1);
        assert!(rt.state().is_playing());
        assert_eq!(rt.feedback().cues, vec![Cue::LevelStart]);
    }

    #[test]
    fn test_move_off_edge_dies_then_restarts() {
        let mut state = corridor();
        state.player = Position::new(1, 0);
        let mut rt = runtime(state);

        rt.handle(Input::Move(Direction::Up));
        assert_eq!(rt.state().status, GameStatus::Dead);
        assert_eq!(rt.stats().falls, 1);
        assert_eq!(rt.feedback().haptics.last(), Some(&Haptic::Error));

        // Input is ignored while the death cue plays
        rt.handle(Input::Move(Direction::Right));
        assert_eq!(rt.state().player, Position::new(1, 0));

        rt.update(rt.settings().timing.death_restart_ms);
        assert!(rt.state().is_playing());
        assert_eq!(rt.state().player, Position::new(0, 0));
        assert_eq!(rt.feedback().count(Cue::LevelStart), 2);
    }

    #[test]
    fn test_move_into_wall_dies() {
        let mut rt = runtime(corridor());
        rt.move_player(Direction::Down);
        assert_eq!(rt.state().status, GameStatus::Dead);
    }

    #[test]
    fn test_trap_countdown_kills() {
        let mut state = corridor();
        state.traps.push(Position::new(1, 0));
        let mut rt = runtime(state);

        rt.move_player(Direction::Right);
        assert_eq!(rt.trap_remaining(), Some(5));
        assert_eq!(rt.feedback().count(Cue::TrapLoopStart), 1);

        rt.update(4_000);
        assert!(rt.state().is_playing());
        assert_eq!(rt.trap_remaining(), Some(1));
        let ticks: Vec<u32> = rt
            .feedback()
            .cues
            .iter()
            .filter_map(|c| match c {
                Cue::Countdown { remaining } => Some(*remaining),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![4, 3, 2, 1]);

        rt.update(1_000);
        assert_eq!(rt.state().status, GameStatus::Dead);
        assert_eq!(rt.stats().trap_deaths, 1);
        assert_eq!(rt.trap_remaining(), None);
    }

    #[test]
    fn test_leaving_trap_cancels_countdown() {
        let mut state = corridor();
        state.traps.push(Position::new(1, 0));
        let mut rt = runtime(state);

        rt.move_player(Direction::Right);
        rt.update(3_000);
        rt.move_player(Direction::Right);
        assert_eq!(rt.trap_remaining(), None);
        assert_eq!(rt.feedback().count(Cue::TrapLoopStop), 1);

        rt.update(10_000);
        assert!(rt.state().is_playing());
        assert_eq!(rt.stats().deaths(), 0);
    }

    #[test]
    fn test_restart_supersedes_trap_timer() {
        let mut state = corridor();
        state.traps.push(Position::new(1, 0));
        let mut rt = runtime(state);

        rt.move_player(Direction::Right);
        let generation = rt.generation();
        rt.restart_level();
        assert!(rt.generation() > generation);
        rt.update(10_000);
        assert!(rt.state().is_playing());
        assert_eq!(rt.state().player, Position::new(0, 0));
        assert_eq!(rt.stats().trap_deaths, 0);
    }

    #[test]
    fn test_approaching_goblin_ambushes_move() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        state.spawn_goblin(Position::new(3, 0), Direction::Left);
        let mut rt = runtime(state);

        rt.move_player(Direction::Left);
        assert_eq!(rt.state().status, GameStatus::Dead);
        assert_eq!(rt.stats().ambushes, 1);
    }

    #[test]
    fn test_double_tap_backstabs_retreating_goblin() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        let id = state.spawn_goblin(Position::new(3, 0), Direction::Right);
        let mut rt = runtime(state);

        rt.tap();
        assert_eq!(rt.state().goblins.len(), 1);
        rt.update(150);
        rt.tap();

        assert!(rt.state().goblins.iter().all(|g| g.id != id));
        assert!(rt.state().is_playing());
        assert_eq!(rt.stats().goblins_slain, 1);
        assert_eq!(rt.feedback().count(Cue::Attack), 1);
        // It was audible at distance 1, so its cue is stopped
        assert!(rt.feedback().stopped.contains(&id));
    }

    #[test]
    fn test_slow_taps_do_not_attack() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        state.spawn_goblin(Position::new(3, 0), Direction::Right);
        let mut rt = runtime(state);

        rt.tap();
        rt.update(400);
        rt.tap();
        assert_eq!(rt.state().goblins.len(), 1);

        // Same instant does not count as a second tap either
        let mut state = corridor();
        state.player = Position::new(2, 0);
        state.spawn_goblin(Position::new(3, 0), Direction::Right);
        let mut rt = runtime(state);
        rt.tap();
        rt.tap();
        assert_eq!(rt.state().goblins.len(), 1);
    }

    #[test]
    fn test_missed_double_tap_still_counts_as_last_tap() {
        let mut state = GameState::with_layout(
            Grid::from_rows(&["......", "......"]),
            Position::new(1, 0),
            Position::new(5, 0),
        );
        let id = state.spawn_goblin(Position::new(0, 1), Direction::Right);
        let mut rt = runtime(state);

        rt.update(1_900);
        rt.tap();
        rt.update(50);
        // Goblin still at (0,1), two cells away: nothing to hit
        rt.tap();
        assert_eq!(rt.state().goblins.len(), 1);

        // Tick at 2000 moves it to (1,1), adjacent and heading away
        rt.update(100);
        assert_eq!(rt.state().goblins[0].pos, Position::new(1, 1));
        rt.tap();
        assert!(rt.state().goblins.iter().all(|g| g.id != id));
        assert_eq!(rt.stats().goblins_slain, 1);
        assert!(rt.state().is_playing());
    }

    #[test]
    fn test_updated_settings_take_effect() {
        let mut rt = runtime(corridor());
        let settings = Settings {
            haptics: false,
            muted: true,
            ..Default::default()
        };
        rt.update_settings(settings);
        assert!(rt.settings().muted);

        rt.move_player(Direction::Right);
        assert_eq!(rt.state().player, Position::new(1, 0));
        assert!(rt.feedback().haptics.is_empty());
    }

    #[test]
    fn test_backstab_into_ambush_dies() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        state.spawn_goblin(Position::new(1, 0), Direction::Right);
        let mut rt = runtime(state);

        rt.tap();
        rt.update(100);
        rt.tap();
        assert_eq!(rt.state().status, GameStatus::Dead);
        assert_eq!(rt.state().goblins.len(), 1);
    }

    #[test]
    fn test_reaching_end_wins_and_advances() {
        let mut state = corridor();
        state.player = Position::new(4, 0);
        let mut rt = runtime(state);

        rt.move_player(Direction::Right);
        assert_eq!(rt.state().status, GameStatus::Won);
        assert_eq!(rt.stats().levels_cleared, 1);
        assert_eq!(rt.feedback().haptics.last(), Some(&Haptic::Success));

        rt.update(rt.settings().timing.win_continue_ms);
        assert_eq!(rt.state().level, 2);
        assert!(rt.state().is_playing());
        assert_eq!(rt.state().player, rt.state().start);
    }

    #[test]
    fn test_manual_continue_without_auto_advance() {
        let mut state = corridor();
        state.player = Position::new(4, 0);
        let settings = Settings {
            auto_advance: false,
            ..Default::default()
        };
        let mut rt = GameRuntime::with_state(state, 3, settings, Recorder::default());

        assert!(!rt.continue_to_next_level());
        rt.move_player(Direction::Right);
        rt.update(60_000);
        assert_eq!(rt.state().status, GameStatus::Won);
        assert!(rt.continue_to_next_level());
        assert_eq!(rt.state().level, 2);
    }

    #[test]
    fn test_hear_guard() {
        let mut rt = runtime(corridor());
        let before = serde_json::to_string(rt.state()).unwrap();

        rt.hear(Direction::Right);
        rt.hear(Direction::Up);
        rt.hear(Direction::Down);
        assert!(rt.is_hearing());
        assert_eq!(rt.feedback().count(Cue::HearAmbient), 1);
        assert_eq!(rt.feedback().count(Cue::Cave), 1);
        assert_eq!(serde_json::to_string(rt.state()).unwrap(), before);

        rt.update(rt.settings().timing.hear_cue_ms);
        assert!(!rt.is_hearing());
        rt.hear(Direction::Up);
        assert_eq!(rt.feedback().count(Cue::Wind), 1);
    }

    #[test]
    fn test_goblins_move_on_tick_only_while_playing() {
        let mut state = corridor();
        state.player = Position::new(0, 0);
        state.spawn_goblin(Position::new(3, 0), Direction::Right);
        let mut settings = Settings::default();
        settings.timing.death_restart_ms = 10_000;
        let mut rt = GameRuntime::with_state(state, 7, settings, Recorder::default());

        rt.update(1_999);
        assert_eq!(rt.state().goblins[0].pos, Position::new(3, 0));
        rt.update(1);
        assert_eq!(rt.state().goblins[0].pos, Position::new(4, 0));

        // Dead until t=12000; the tick at t=4000 must not move it
        rt.move_player(Direction::Up);
        assert_eq!(rt.state().status, GameStatus::Dead);
        rt.update(2_000);
        assert_eq!(rt.state().goblins[0].pos, Position::new(4, 0));
    }

    #[test]
    fn test_proximity_volume_follows_distance() {
        let mut state = corridor();
        state.player = Position::new(2, 0);
        let id = state.spawn_goblin(Position::new(3, 0), Direction::Right);
        let mut rt = runtime(state);

        rt.update(100);
        let (got_id, volume) = *rt.feedback().volumes.last().unwrap();
        assert_eq!(got_id, id);
        assert!((volume.get() - 2.0 / 3.0).abs() < 1e-6);

        // Goblin walks to (4,0) then (5,0): distance 3 is silent
        rt.update(1_900);
        let (_, volume) = *rt.feedback().volumes.last().unwrap();
        assert!((volume.get() - 1.0 / 3.0).abs() < 1e-6);
        rt.update(2_000);
        assert!(rt.feedback().stopped.contains(&id));
    }

    #[test]
    fn test_broken_feedback_does_not_change_outcome() {
        let mut state = corridor();
        state.player = Position::new(4, 0);
        state.spawn_goblin(Position::new(3, 0), Direction::Left);
        let mut rt = GameRuntime::with_state(state, 1, Settings::default(), Broken);

        rt.update(100);
        rt.hear(Direction::Left);
        rt.move_player(Direction::Right);
        assert_eq!(rt.state().status, GameStatus::Won);
    }

    #[test]
    fn test_shutdown_ignores_everything() {
        let mut state = corridor();
        state.traps.push(Position::new(1, 0));
        let mut rt = runtime(state);
        rt.move_player(Direction::Right);
        rt.shutdown();
        assert!(rt.is_shut_down());
        assert_eq!(rt.feedback().count(Cue::TrapLoopStop), 1);

        let at = rt.now_ms();
        rt.update(10_000);
        rt.move_player(Direction::Right);
        assert_eq!(rt.now_ms(), at);
        assert_eq!(rt.state().player, Position::new(1, 0));
        assert!(rt.state().is_playing());
    }
}
