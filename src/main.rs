//! Cavern Raid headless runner
//!
//! Plays one level with a scripted pilot and logs what happens. Rendering and
//! audio frontends embed the library instead.
//!
//! Usage: `cavern-raid [--difficulty easy|medium|hard] [--seed N]
//! [--tuning FILE] [--seconds N] [--snapshot] [--print-tuning]`

use std::process::ExitCode;

use cavern_raid::consts::*;
use cavern_raid::sim::tick::terrain_blocks;
use cavern_raid::sim::{
    FrameTimer, GameEvent, HasHitbox, Key, KeyEvent, ManualClock, TickInput, World, map_key_event, tick,
};
use cavern_raid::{Difficulty, Tuning};
use glam::Vec2;

/// Simulated frame period (ms)
const FRAME_MS: u64 = 16;

#[derive(Debug)]
struct Options {
    difficulty: Difficulty,
    seed: u64,
    tuning: Option<String>,
    seconds: u64,
    snapshot: bool,
    print_tuning: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            seed: 0xCAFE,
            tuning: None,
            seconds: 120,
            snapshot: false,
            print_tuning: false,
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("missing value for {name}"));
        match arg.as_str() {
            "--difficulty" | "-d" => {
                let v = value("--difficulty")?;
                opts.difficulty = Difficulty::from_str(&v).ok_or_else(|| format!("unknown difficulty `{v}`"))?;
            }
            "--seed" | "-s" => {
                let v = value("--seed")?;
                opts.seed = v.parse().map_err(|_| format!("bad seed `{v}`"))?;
            }
            "--tuning" | "-t" => opts.tuning = Some(value("--tuning")?),
            "--seconds" => {
                let v = value("--seconds")?;
                opts.seconds = v.parse().map_err(|_| format!("bad duration `{v}`"))?;
            }
            "--snapshot" => opts.snapshot = true,
            "--print-tuning" => opts.print_tuning = true,
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    Ok(opts)
}

/// Keyboard-level autopilot: holds the lane that is clear of terrain and
/// keeps the nose gun firing
#[derive(Debug, Default)]
struct Pilot {
    up: bool,
    down: bool,
}

impl Pilot {
    fn keys(&mut self, world: &World) -> Vec<KeyEvent> {
        let hitbox = world.player.hitbox();
        let center_y = hitbox.center().y;

        let mut target_y = world
            .cave
            .as_ref()
            .and_then(|c| c.centerline_at(hitbox.center().x + world.camera_x, 400.0))
            .unwrap_or(SCREEN_HEIGHT / 2.0);
        let ahead = hitbox.translated(Vec2::new(200.0, 0.0));
        if terrain_blocks(world, &ahead) {
            let high = ahead.translated(Vec2::new(0.0, 150.0 - center_y));
            target_y = if terrain_blocks(world, &high) { 560.0 } else { 150.0 };
        }

        let want_up = center_y > target_y + 20.0;
        let want_down = center_y < target_y - 20.0;
        let mut events = Vec::new();
        for (held, want, key) in [(&mut self.up, want_up, Key::W), (&mut self.down, want_down, Key::S)] {
            if *held != want {
                *held = want;
                events.push(if want { KeyEvent::down(key) } else { KeyEvent::up(key) });
            }
        }
        if !world.player.front_gun.is_maxed() {
            events.push(KeyEvent::down(Key::Space));
        }
        events
    }
}

fn run(opts: Options) -> Result<u64, String> {
    let tuning = match &opts.tuning {
        Some(path) => Tuning::load(path).map_err(|e| e.to_string())?,
        None => Tuning::default(),
    };
    if opts.print_tuning {
        println!("{}", tuning.to_json());
    }
    let mut world = World::new(opts.seed, opts.difficulty, tuning);
    let mut timer = FrameTimer::new(ManualClock::default(), 100);
    let mut pilot = Pilot::default();
    let frames = opts.seconds * 1000 / FRAME_MS;

    for _ in 0..frames {
        timer.source_mut().advance(FRAME_MS);
        let dt = timer.delta_ms();
        let intents = pilot.keys(&world).iter().filter_map(map_key_event).collect();
        tick(&mut world, &TickInput::new(intents), dt);

        for event in world.drain_events() {
            match event {
                GameEvent::BulletFired { .. } | GameEvent::Ricochet | GameEvent::Explosion { .. } => {}
                other => log::debug!("{:?}", other),
            }
        }
        if world.is_over() {
            break;
        }
    }

    if opts.snapshot {
        let json = serde_json::to_string_pretty(&world.snapshot()).map_err(|e| e.to_string())?;
        println!("{json}");
    }
    Ok(world.score())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Cavern Raid (headless) starting...");

    let opts = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    log::info!("Difficulty {}, seed {}", opts.difficulty.as_str(), opts.seed);

    match run(opts) {
        Ok(score) => {
            println!("score: {score}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Frontends embed the library directly on the web
}
