use std::time::Duration;

use tile_defence_core::{AgentId, BoardLayout, BoardSize, CellCoord, Command, Event, OccupantKind};
use tile_defence_system_movement::{Config, Movement};
use tile_defence_world::{self as world, query, World};

fn corridor() -> World {
    let layout = BoardLayout::new(
        BoardSize::new(4, 2),
        Vec::new(),
        vec![CellCoord::new(3, 0)],
        vec![CellCoord::new(0, 0)],
    );
    World::from_layout(&layout).expect("corridor is connected")
}

/// Applies a command and feeds every resulting event through movement until
/// no further commands are proposed. Returns every event produced.
fn pump(world: &mut World, movement: &mut Movement, command: Command) -> Vec<Event> {
    let mut log = Vec::new();
    let mut pending = vec![command];

    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        movement.handle(&events, query::flow_field(world), &mut pending);
        log.extend(events);
    }

    log
}

fn tick(millis: u64) -> Command {
    Command::Tick {
        dt: Duration::from_millis(millis),
    }
}

fn reclaimed(events: &[Event]) -> Vec<AgentId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::AgentReclaimed { agent } => Some(*agent),
            _ => None,
        })
        .collect()
}

#[test]
fn agent_walks_corridor_and_finishes_once() {
    let mut world = corridor();
    let mut movement = Movement::default();
    let spawn = pump(
        &mut world,
        &mut movement,
        Command::SpawnAgent {
            spawner: CellCoord::new(0, 0),
        },
    );
    let agent = AgentId::new(0);
    assert_eq!(
        spawn,
        vec![Event::AgentSpawned {
            agent,
            cell: CellCoord::new(0, 0)
        }]
    );

    let mut last_x = movement.agent_positions()[0].1.x;
    let mut finished_on = Vec::new();
    for tick_number in 1..=6 {
        let events = pump(&mut world, &mut movement, tick(500));
        if !reclaimed(&events).is_empty() {
            assert_eq!(reclaimed(&events), vec![agent]);
            finished_on.push(tick_number);
            continue;
        }

        let position = movement
            .motion(agent)
            .expect("agent still walking")
            .position();
        assert!(position.x > last_x, "tick {tick_number} did not advance");
        last_x = position.x;
    }

    assert_eq!(finished_on, vec![6]);
    assert_eq!(movement.active_agents(), 0);
    assert_eq!(query::live_agents(&world), 0);

    let idle = pump(&mut world, &mut movement, tick(500));
    assert!(reclaimed(&idle).is_empty());
}

#[test]
fn walking_agents_keep_their_spawn_route() {
    let mut world = corridor();
    let mut movement = Movement::default();
    let _ = pump(
        &mut world,
        &mut movement,
        Command::SpawnAgent {
            spawner: CellCoord::new(0, 0),
        },
    );
    let agent = AgentId::new(0);

    let edit = pump(
        &mut world,
        &mut movement,
        Command::ToggleWall {
            cell: CellCoord::new(2, 0),
        },
    );
    assert!(edit.contains(&Event::OccupantChanged {
        cell: CellCoord::new(2, 0),
        from: OccupantKind::Empty,
        to: OccupantKind::Wall,
    }));
    assert_eq!(
        query::flow_field(&world).next_hop(CellCoord::new(1, 0)),
        Some(CellCoord::new(1, 1))
    );

    let motion = movement.motion(agent).expect("agent walking");
    assert_eq!(
        motion.remaining_route(),
        vec![
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0)
        ]
    );

    let _ = pump(&mut world, &mut movement, tick(2_000));
    let motion = movement.motion(agent).expect("agent walking");
    assert_eq!(motion.from(), CellCoord::new(2, 0));
    assert_eq!(motion.to(), CellCoord::new(3, 0));
}

#[test]
fn agent_speed_scales_progress() {
    let mut world = corridor();
    let mut movement = Movement::new(Config::new(2.0));
    let _ = pump(
        &mut world,
        &mut movement,
        Command::SpawnAgent {
            spawner: CellCoord::new(0, 0),
        },
    );

    let first = pump(&mut world, &mut movement, tick(500));
    let second = pump(&mut world, &mut movement, tick(500));
    let third = pump(&mut world, &mut movement, tick(500));

    assert!(reclaimed(&first).is_empty());
    assert!(reclaimed(&second).is_empty());
    assert_eq!(reclaimed(&third), vec![AgentId::new(0)]);
}

#[test]
fn simultaneous_arrivals_are_reclaimed_in_identifier_order() {
    let world = corridor();
    let mut movement = Movement::default();
    let mut commands = Vec::new();

    movement.handle(
        &[
            Event::AgentSpawned {
                agent: AgentId::new(1),
                cell: CellCoord::new(0, 0),
            },
            Event::AgentSpawned {
                agent: AgentId::new(0),
                cell: CellCoord::new(0, 0),
            },
            Event::TimeAdvanced {
                dt: Duration::from_secs(3),
            },
        ],
        query::flow_field(&world),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::ReclaimAgent {
                agent: AgentId::new(0)
            },
            Command::ReclaimAgent {
                agent: AgentId::new(1)
            },
        ]
    );
}

#[test]
fn agents_from_farther_spawn_points_arrive_later() {
    let mut world = corridor();
    assert!(world.toggle_spawn_point(CellCoord::new(0, 1)).is_ok());
    let mut movement = Movement::default();

    for spawner in [CellCoord::new(0, 1), CellCoord::new(0, 0)] {
        let _ = pump(&mut world, &mut movement, Command::SpawnAgent { spawner });
    }
    assert_eq!(movement.active_agents(), 2);

    let first = pump(&mut world, &mut movement, tick(3_000));
    assert_eq!(reclaimed(&first), vec![AgentId::new(1)]);
    let second = pump(&mut world, &mut movement, tick(1_000));
    assert_eq!(reclaimed(&second), vec![AgentId::new(0)]);
}

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(reclaimed(&first).len(), 3);
}

fn replay() -> Vec<Event> {
    let mut world = World::new(BoardSize::new(6, 5));
    let mut movement = Movement::default();
    let mut log = Vec::new();

    let script = vec![
        Command::ToggleWall {
            cell: CellCoord::new(1, 1),
        },
        Command::ToggleSpawnPoint {
            cell: CellCoord::new(5, 4),
        },
        Command::SpawnAgent {
            spawner: CellCoord::new(0, 0),
        },
        tick(700),
        Command::SpawnAgent {
            spawner: CellCoord::new(5, 4),
        },
        Command::ToggleWall {
            cell: CellCoord::new(2, 2),
        },
        tick(1_300),
        Command::SpawnAgent {
            spawner: CellCoord::new(0, 0),
        },
        tick(2_500),
        tick(2_500),
        tick(2_500),
        tick(2_500),
    ];

    for command in script {
        log.extend(pump(&mut world, &mut movement, command));
    }
    log
}
