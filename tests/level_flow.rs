//! Level lifecycle scenarios against the rapier backend

use kinetic_puzzle::level::{EntityKind, EntityOptions, EntitySpec, LevelSpec, MovementSpec};
use kinetic_puzzle::physics::RigidBodyBackend;
use kinetic_puzzle::sim::{AssetCatalog, LevelController, LevelEvent, LevelPhase};
use kinetic_puzzle::{ConfigurationError, Settings, SimError, TickInput};

const DT: f32 = 1.0 / 60.0;

fn controller() -> LevelController {
    LevelController::with_builtin_levels(Settings::default(), AssetCatalog::new()).unwrap()
}

/// Player at (100, 500), goal at (700, 500). The goal is tall enough to reach
/// a ball rolling along the floor.
fn corridor() -> LevelSpec {
    LevelSpec::new(vec![
        EntitySpec::new(EntityKind::Player, 100.0, 500.0),
        EntitySpec::new(EntityKind::Goal, 700.0, 500.0).with_options(EntityOptions {
            height: Some(150.0),
            ..EntityOptions::default()
        }),
    ])
}

#[test]
fn test_rolling_right_reaches_goal_and_advances() {
    let mut level = controller();
    level.load_level(1, corridor()).unwrap();
    assert_eq!(level.progress().levels_completed(), 0);
    assert_eq!(level.progress().current_level(), 1);

    let mut max_x = f32::MIN;
    let mut goal_reached = false;
    let mut completed = false;
    for _ in 0..1200 {
        let events = level.tick(DT, &TickInput::right()).unwrap();
        goal_reached |= events.contains(&LevelEvent::GoalReached(1));
        if events.contains(&LevelEvent::Completed(1)) {
            completed = true;
            break;
        }
        if let Some(pos) = level.player_position() {
            max_x = max_x.max(pos.x);
        }
    }

    assert!(goal_reached, "no player/goal contact observed");
    assert!(completed, "level never completed");
    assert!(max_x >= 700.0, "player only reached x = {max_x}");
    assert_eq!(level.progress().levels_completed(), 1);
    assert_eq!(level.progress().current_level(), 2);
    assert_eq!(level.level_number(), 2);
    assert_eq!(level.phase(), LevelPhase::Active);
}

#[test]
fn test_two_players_is_rejected_with_nothing_built() {
    let mut level = controller();
    level.start_level(1).unwrap();

    let mut spec = corridor();
    spec.objects
        .push(EntitySpec::new(EntityKind::Player, 300.0, 500.0));
    let err = level.load_level(3, spec).unwrap_err();

    assert!(matches!(
        err,
        SimError::Configuration(ConfigurationError::DuplicatePlayer(2))
    ));
    assert_eq!(level.level_number(), 1);
    assert_eq!(level.progress().current_level(), 1);
    assert_eq!(level.entity_count(), 0);
    assert_eq!(level.backend().body_count(), 0);
    assert_eq!(level.phase(), LevelPhase::Loading);
    // Nothing to simulate until a valid level is loaded
    level.tick(DT, &TickInput::right()).unwrap();
    assert_eq!(level.phase(), LevelPhase::Loading);
    assert!(level.player_position().is_none());
}

#[test]
fn test_reset_rebuilds_instead_of_doubling() {
    let mut level = controller();
    level.start_level(10).unwrap();
    let fresh = level.entity_count();
    let bodies = level.backend().body_count();
    assert_eq!(fresh, bodies);

    for _ in 0..90 {
        level.tick(DT, &TickInput::right()).unwrap();
    }
    level.reset_level().unwrap();

    assert_eq!(level.entity_count(), fresh);
    assert_eq!(level.backend().body_count(), bodies);
    assert_eq!(level.elapsed(), 0.0);
    assert_eq!(level.level_number(), 10);
}

#[test]
fn test_final_level_ends_the_run() {
    let mut level = controller();
    level.start_level(10).unwrap();
    level.complete_level().unwrap();

    assert_eq!(level.phase(), LevelPhase::RunComplete);
    assert_eq!(level.progress().levels_completed(), 10);
    assert_eq!(level.entity_count(), 0);
    assert_eq!(level.backend().body_count(), 0);
    // Nothing left to simulate
    let events = level.tick(DT, &TickInput::default()).unwrap();
    assert!(events.contains(&LevelEvent::RunComplete));
    assert!(level.tick(DT, &TickInput::default()).unwrap().is_empty());
}

#[test]
fn test_reset_cancels_pending_completion() {
    let mut level = controller();
    level.load_level(1, corridor()).unwrap();
    let player = level.player_body().unwrap();
    let goal = level.goal_body().unwrap();

    assert!(level.on_collision_begin(player, goal));
    assert_eq!(level.pending_timers(), 1);
    level.reset_level().unwrap();
    assert_eq!(level.pending_timers(), 0);

    for _ in 0..180 {
        let events = level.tick(DT, &TickInput::default()).unwrap();
        assert!(!events.iter().any(|e| matches!(e, LevelEvent::Completed(_))));
    }
    assert_eq!(level.progress().levels_completed(), 0);
    assert_eq!(level.level_number(), 1);
}

#[test]
fn test_celebration_delays_completion() {
    let mut assets = AssetCatalog::new();
    assets.insert("particle", glam::Vec2::splat(8.0));
    let mut level = LevelController::with_builtin_levels(Settings::default(), assets).unwrap();
    level.load_level(1, corridor()).unwrap();
    let (player, goal) = (level.player_body().unwrap(), level.goal_body().unwrap());
    level.on_collision_begin(player, goal);
    assert!(level.actor().unwrap().is_celebrating());

    // 1.5s at 60Hz
    let mut completed_at = None;
    for tick in 1..=120 {
        let events = level.tick(DT, &TickInput::default()).unwrap();
        if tick == 40 {
            assert!(!level.actor().unwrap().is_celebrating());
        }
        if events.contains(&LevelEvent::Completed(1)) {
            completed_at = Some(tick);
            break;
        }
    }
    let completed_at = completed_at.expect("completion never fired");
    assert!((89..=91).contains(&completed_at), "completed at tick {completed_at}");
}

#[test]
fn test_gravity_grows_with_level() {
    let mut level = controller();
    level.start_level(1).unwrap();
    let first = level.backend().gravity().y;
    level.start_level(5).unwrap();
    let fifth = level.backend().gravity().y;
    assert!(first > 0.0);
    assert!(fifth > first);
}

#[test]
fn test_falling_out_resets_the_level() {
    let mut level = controller();
    // No floor under the player: spawn it outside the walls
    let spec = LevelSpec::new(vec![
        EntitySpec::new(EntityKind::Player, 900.0, 100.0),
        EntitySpec::new(EntityKind::Goal, 700.0, 500.0),
    ]);
    level.load_level(1, spec).unwrap();

    let mut reset = false;
    for _ in 0..600 {
        let events = level.tick(DT, &TickInput::default()).unwrap();
        if events.contains(&LevelEvent::Reset(1)) {
            reset = true;
            break;
        }
    }
    assert!(reset, "player never fell out");
    let pos = level.player_position().unwrap();
    assert_eq!(pos, glam::Vec2::new(900.0, 100.0));
}

#[test]
fn test_vertical_platform_carries_the_player() {
    let mut level = controller();
    let platform = EntitySpec::new(EntityKind::MovingPlatform, 400.0, 300.0).with_options(
        EntityOptions {
            width: Some(200.0),
            height: Some(20.0),
            is_static: Some(true),
            movement: Some(MovementSpec::Vertical {
                distance: 200.0,
                speed: 2.0,
            }),
            ..EntityOptions::default()
        },
    );
    // Resting on the platform top, goal out of reach
    let spec = LevelSpec::new(vec![
        platform,
        EntitySpec::new(EntityKind::Player, 400.0, 265.0),
        EntitySpec::new(EntityKind::Goal, 700.0, 100.0),
    ]);
    level.load_level(1, spec).unwrap();
    let mover = level.scripts()[0].entity();

    let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
    for _ in 0..300 {
        let events = level.tick(DT, &TickInput::default()).unwrap();
        assert!(!events.contains(&LevelEvent::Reset(1)), "player fell out");
        let player = level.player_position().unwrap();
        let top = level.entity(mover).unwrap().pose(level.backend()).unwrap().position.y - 10.0;
        if (player.x - 400.0).abs() < 100.0 {
            assert!(player.y < top - 15.0, "player at {player} sank through the platform top {top}");
        }
        min_y = min_y.min(player.y);
        max_y = max_y.max(player.y);
    }

    assert!(max_y - min_y > 100.0, "player only moved between {min_y} and {max_y}");
    // Floor top is at 580
    assert!(max_y < 580.0 - 25.0 + 1.0, "player reached y = {max_y}");
}
