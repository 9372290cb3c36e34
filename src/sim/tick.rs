//! Fixed timestep simulation tick
//!
//! One call per camera frame: apply inputs, advance the phase machine, run
//! the active game, check for game over, then step particles.

use super::gesture::is_thumb_up;
use super::landmarks::{LandmarkFrame, TrackerKind};
use super::phase::{GamePhase, PhaseChange};
use super::scoring::GameOverReason;
use super::state::{GameEvent, GameState};

/// Discrete inputs for a single tick (from the menu shell or keyboard)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player count picked on the menu (1 or 2)
    pub select_players: Option<u8>,
    /// Play again from the results screen
    pub restart: bool,
    /// Back to the menu from the results screen
    pub menu: bool,
    /// Leave the game
    pub quit: bool,
}

/// Advance the game state by one fixed timestep
///
/// `frame` is this tick's landmark poll (None when the sensor produced
/// nothing). Returns every event raised during the tick, in order.
pub fn tick(state: &mut GameState, input: &TickInput, frame: Option<&LandmarkFrame>, dt: f32) -> Vec<GameEvent> {
    state.time_ticks += 1;

    if input.quit {
        request_quit(state);
    }

    if let Some(count) = input.select_players {
        if state.phase.phase == GamePhase::Menu {
            state.reset_round(usize::from(count));
            let change = state.phase.select_players();
            report_phase(state, change);
        }
    }
    if input.restart && state.phase.phase == GamePhase::GameOver {
        state.reset_round(state.player_count());
        let change = state.phase.restart();
        report_phase(state, change);
    }
    if input.menu {
        let change = state.phase.to_menu();
        report_phase(state, change);
    }

    match state.phase.phase {
        GamePhase::Menu => {}
        GamePhase::Calibrating => {
            let change = state.phase.tick_calibration(dt);
            report_phase(state, change);
        }
        GamePhase::Playing => play(state, frame, dt),
        GamePhase::GameOver => {
            // Second stage of the exit gesture: leave the results screen
            if exit_gesture(state, frame) {
                request_quit(state);
            }
        }
    }

    state.session.effects.update();
    std::mem::take(&mut state.session.events)
}

fn play(state: &mut GameState, frame: Option<&LandmarkFrame>, dt: f32) {
    state.session.elapsed += dt;
    state.mode.update(&mut state.session, frame);

    if exit_gesture(state, frame) {
        finish(state, GameOverReason::ExitGesture);
        return;
    }

    let session = &state.session;
    let last_standing = state.mode.ends_when_all_eliminated();
    if let Some(reason) = session.scoring.terminal(session.elapsed, session.duration, last_standing) {
        finish(state, reason);
    }
}

/// Integrate this frame's thumb-up into the exit counter
fn exit_gesture(state: &mut GameState, frame: Option<&LandmarkFrame>) -> bool {
    let detected = frame.is_some_and(|f| f.tracker == TrackerKind::Hand && f.bodies.iter().any(is_thumb_up));
    state.exit.update(detected)
}

fn finish(state: &mut GameState, reason: GameOverReason) {
    let Some(change) = state.phase.finish(reason) else {
        return;
    };
    report_phase(state, Some(change));

    let outcome = state.session.scoring.outcome();
    log::info!(
        "Game over ({:?}) after {:.1}s: {:?}",
        reason,
        state.session.elapsed,
        outcome
    );
    state.session.emit(GameEvent::GameOver { reason, outcome });

    let confetti = state.mode.confetti_count();
    if confetti > 0 {
        state.session.effects.confetti(confetti);
    }
    state.exit.reset();
}

fn request_quit(state: &mut GameState) {
    if !state.quit_requested {
        log::info!("Quit requested");
        state.quit_requested = true;
        state.session.emit(GameEvent::QuitRequested);
    }
}

fn report_phase(state: &mut GameState, change: Option<PhaseChange>) {
    if let Some(change) = change {
        state.session.emit(GameEvent::PhaseChanged {
            from: change.from,
            to: change.to,
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::landmarks::{CoordSpace, TrackedBody, hand, pose};
    use crate::sim::modes::{GameKind, GameMode};
    use crate::sim::scoring::{DifficultyTier, Outcome};
    use crate::sim::zone::PlayerId;

    fn quick_settings() -> Settings {
        Settings {
            calibration_secs: 0.0,
            ..Default::default()
        }
    }

    /// Menu -> Calibrating -> Playing with the given player count
    fn start(game: GameKind, settings: Settings, players: u8) -> GameState {
        let mut state = GameState::new(game, settings, 12345).unwrap();
        let select = TickInput {
            select_players: Some(players),
            ..Default::default()
        };
        tick(&mut state, &select, None, SIM_DT);
        assert_eq!(state.phase.phase, GamePhase::Playing);
        state
    }

    fn hand_frame(bodies: Vec<TrackedBody>) -> LandmarkFrame {
        LandmarkFrame {
            tracker: TrackerKind::Hand,
            space: CoordSpace::Pixels,
            bodies,
        }
    }

    fn palm_at(p: Vec2) -> TrackedBody {
        let mut points = vec![Vec2::ZERO; hand::POINT_COUNT];
        points[hand::MIDDLE_MCP] = p;
        TrackedBody::new(0, points)
    }

    fn thumb_up() -> TrackedBody {
        let mut points = vec![Vec2::new(900.0, 600.0); hand::POINT_COUNT];
        points[hand::THUMB_MCP] = Vec2::new(900.0, 580.0);
        points[hand::THUMB_IP] = Vec2::new(900.0, 550.0);
        points[hand::THUMB_TIP] = Vec2::new(900.0, 520.0);
        for (tip, pip) in hand::FINGER_TIPS_AND_PIPS {
            points[pip] = Vec2::new(920.0, 600.0);
            points[tip] = Vec2::new(920.0, 620.0);
        }
        TrackedBody::new(1, points)
    }

    #[test]
    fn test_menu_calibration_playing() {
        let mut state = GameState::new(GameKind::Dodge, Settings::default(), 1).unwrap();
        assert_eq!(state.phase.phase, GamePhase::Menu);

        // Nothing happens on the menu
        let events = tick(&mut state, &TickInput::default(), None, SIM_DT);
        assert!(events.is_empty());

        let events = tick(
            &mut state,
            &TickInput {
                select_players: Some(2),
                ..Default::default()
            },
            None,
            SIM_DT,
        );
        assert_eq!(
            events,
            vec![GameEvent::PhaseChanged {
                from: GamePhase::Menu,
                to: GamePhase::Calibrating
            }]
        );
        assert_eq!(state.player_count(), 2);

        // 4 s warm-up, nothing spawns meanwhile
        for _ in 0..230 {
            tick(&mut state, &TickInput::default(), None, SIM_DT);
        }
        assert_eq!(state.phase.phase, GamePhase::Calibrating);
        assert!(state.session.objects.is_empty());
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), None, SIM_DT);
        }
        assert_eq!(state.phase.phase, GamePhase::Playing);
    }

    #[test]
    fn test_basketball_three_makes() {
        let mut state = start(GameKind::Basketball, quick_settings(), 1);
        let rim = match &state.mode {
            GameMode::Basketball(m) => m.hoops[0].rim_center(m.tuning.rim_offset),
            _ => unreachable!(),
        };

        let mut scored = Vec::new();
        let mut tier_raised_at = None;
        for make in 0..3 {
            for (i, dy) in [-25.0, -5.0, 10.0].into_iter().enumerate() {
                let frame = hand_frame(vec![palm_at(rim + Vec2::new(0.0, dy))]);
                for event in tick(&mut state, &TickInput::default(), Some(&frame), SIM_DT) {
                    match event {
                        GameEvent::Scored { points, combo, .. } => scored.push((points, combo)),
                        GameEvent::TierRaised { to, .. } => tier_raised_at = Some((make, i, to)),
                        _ => {}
                    }
                }
            }
            // Hand away from the hoop while the cooldown runs
            for _ in 0..100 {
                tick(&mut state, &TickInput::default(), Some(&hand_frame(vec![])), SIM_DT);
            }
        }

        assert_eq!(scored, vec![(2, 1), (3, 2), (4, 3)]);
        assert_eq!(state.session.scoring.player(PlayerId::ONE).unwrap().score, 9);
        assert_eq!(tier_raised_at, Some((2, 2, DifficultyTier::Hard)));
        assert_eq!(state.session.scoring.tier, DifficultyTier::Hard);
    }

    #[test]
    fn test_exit_gesture_two_stage() {
        let mut state = start(GameKind::Basketball, quick_settings(), 2);
        let frame = hand_frame(vec![thumb_up()]);

        let mut reasons = Vec::new();
        for _ in 0..30 {
            for event in tick(&mut state, &TickInput::default(), Some(&frame), SIM_DT) {
                if let GameEvent::GameOver { reason, outcome } = event {
                    reasons.push(reason);
                    assert_eq!(outcome, Outcome::Draw);
                }
            }
        }
        assert_eq!(reasons, vec![GameOverReason::ExitGesture]);
        assert_eq!(state.phase.phase, GamePhase::GameOver);
        assert!(!state.quit_requested);
        assert!(!state.session.effects.confetti.is_empty());

        // Holding on the results screen quits
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), Some(&frame), SIM_DT);
        }
        assert!(state.quit_requested);
    }

    #[test]
    fn test_time_up_then_restart() {
        let mut settings = quick_settings();
        settings.tuning.tower.duration_secs = 1.0;
        let mut state = start(GameKind::Tower, settings, 2);

        let mut over = None;
        for _ in 0..70 {
            for event in tick(&mut state, &TickInput::default(), None, SIM_DT) {
                if let GameEvent::GameOver { reason, .. } = event {
                    over = Some(reason);
                }
            }
        }
        assert_eq!(over, Some(GameOverReason::TimeUp));
        assert_eq!(state.phase.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, None, SIM_DT);
        assert_eq!(state.phase.phase, GamePhase::Playing);
        assert_eq!(state.player_count(), 2);
        assert!(state.session.elapsed < 0.1);

        // Restart is ignored while playing; menu only from the results screen
        tick(&mut state, &TickInput { menu: true, ..Default::default() }, None, SIM_DT);
        assert_eq!(state.phase.phase, GamePhase::Playing);
    }

    #[test]
    fn test_all_eliminated_ends_tower() {
        let mut state = start(GameKind::Tower, quick_settings(), 1);
        state.session.scoring.eliminate(PlayerId::ONE, 0.5);
        let events = tick(&mut state, &TickInput::default(), None, SIM_DT);
        assert!(events.contains(&GameEvent::GameOver {
            reason: GameOverReason::AllEliminated,
            outcome: Outcome::Winner(PlayerId::ONE),
        }));
    }

    #[test]
    fn test_wrong_tracker_is_no_input() {
        let mut state = start(GameKind::Tower, quick_settings(), 1);
        // A hand frame in a pose game: jumps never register
        for y in [500.0, 300.0] {
            let frame = hand_frame(vec![TrackedBody::new(0, vec![Vec2::new(300.0, y); pose::POINT_COUNT])]);
            let events = tick(&mut state, &TickInput::default(), Some(&frame), SIM_DT);
            assert!(events.is_empty());
        }
    }

    #[test]
    fn test_quit_input() {
        let mut state = GameState::new(GameKind::Fruit, Settings::default(), 3).unwrap();
        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        let events = tick(&mut state, &quit, None, SIM_DT);
        assert_eq!(events, vec![GameEvent::QuitRequested]);
        // Reported once
        assert!(tick(&mut state, &quit, None, SIM_DT).is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = start(GameKind::Dodge, quick_settings(), 2);
        let mut b = start(GameKind::Dodge, quick_settings(), 2);
        for _ in 0..600 {
            tick(&mut a, &TickInput::default(), None, SIM_DT);
            tick(&mut b, &TickInput::default(), None, SIM_DT);
        }
        assert!(!a.session.objects.is_empty() || a.session.scoring.max_score() > 0);
        let boxes_a: Vec<_> = a.session.objects.iter().map(|o| (o.id, o.kind, o.bounds)).collect();
        let boxes_b: Vec<_> = b.session.objects.iter().map(|o| (o.id, o.kind, o.bounds)).collect();
        assert_eq!(boxes_a, boxes_b);
        assert_eq!(a.session.scoring.max_score(), b.session.scoring.max_score());
    }
}
