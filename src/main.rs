//! Echo Maze entry point
//!
//! Native builds run a console driver: commands come in on stdin, cues go
//! out through the log. The web build is driven from `echo_maze::web`.

#[cfg(not(target_arch = "wasm32"))]
mod console {
    use std::io::BufRead;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use echo_maze::sim::{Direction, FingerCount, Gesture, Input};
    use echo_maze::{Feedback, GameRuntime, LogFeedback, NullFeedback, Settings};

    const HELP: &str = "commands: hear <dir> | move <dir> | tap | stab | restart | next\n\
                        other: dump | stats | save | quit\n\
                        directions: up down left right (or u d l r)";

    /// Frame period for advancing the runtime clock while idle
    const FRAME: Duration = Duration::from_millis(20);

    enum Command {
        Play(Input),
        /// Two taps in quick succession
        Stab,
        Restart,
        Next,
        Dump,
        Stats,
        Save,
        Quit,
    }

    fn parse(line: &str) -> Option<Command> {
        let mut words = line.split_whitespace();
        let verb = words.next()?.to_lowercase();
        let dir = words.next().and_then(Direction::from_str);

        let command = match (verb.as_str(), dir) {
            ("hear" | "h", Some(d)) => Command::Play(Gesture::Swipe {
                direction: d,
                fingers: FingerCount::One,
            }
            .into()),
            ("move" | "m", Some(d)) => Command::Play(Gesture::Swipe {
                direction: d,
                fingers: FingerCount::Two,
            }
            .into()),
            ("tap" | "t", _) => Command::Play(Gesture::Tap.into()),
            ("stab" | "b", _) => Command::Stab,
            ("restart", _) => Command::Restart,
            ("next", _) => Command::Next,
            ("dump", _) => Command::Dump,
            ("stats", _) => Command::Stats,
            ("save", _) => Command::Save,
            ("quit" | "q" | "exit", _) => Command::Quit,
            _ => return None,
        };
        Some(command)
    }

    struct Args {
        seed: u64,
        settings: Option<PathBuf>,
        /// Drop cues instead of logging them
        quiet: bool,
    }

    fn parse_args() -> Args {
        let mut seed = None;
        let mut settings = None;
        let mut quiet = false;
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            if arg == "--seed" {
                seed = args.next().and_then(|s| s.parse().ok());
            } else if arg == "--quiet" {
                quiet = true;
            } else {
                settings = Some(PathBuf::from(arg));
            }
        }
        let seed = seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
        Args {
            seed,
            settings,
            quiet,
        }
    }

    fn load_settings(path: Option<&PathBuf>) -> Settings {
        match path {
            Some(path) => match Settings::load_from(&path) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    Settings::default()
                }
            },
            None => Settings::load(),
        }
    }

    pub fn run() {
        let args = parse_args();
        let settings = load_settings(args.settings.as_ref());
        let feedback: Box<dyn Feedback> = if args.quiet {
            Box::new(NullFeedback)
        } else {
            Box::new(LogFeedback::new())
        };
        let mut runtime = GameRuntime::new(args.seed, settings, feedback);
        let settings_path = args
            .settings
            .unwrap_or_else(|| PathBuf::from(Settings::FILE_NAME));

        let (tx, rx) = mpsc::channel::<String>();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        println!("{HELP}");
        let mut last = Instant::now();

        loop {
            let received = rx.recv_timeout(FRAME);

            let now = Instant::now();
            runtime.update(now.duration_since(last).as_millis() as u64);
            last = now;

            let line = match received {
                Ok(line) => line,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse(&line) {
                Some(Command::Play(input)) => runtime.handle(input),
                Some(Command::Stab) => {
                    runtime.tap();
                    runtime.update(1);
                    runtime.tap();
                }
                Some(Command::Restart) => runtime.restart_level(),
                Some(Command::Next) => {
                    if !runtime.continue_to_next_level() {
                        println!("level not won yet");
                    }
                }
                Some(Command::Dump) => match serde_json::to_string_pretty(runtime.state()) {
                    Ok(json) => println!("{json}"),
                    Err(e) => log::error!("Dump failed: {}", e),
                },
                Some(Command::Stats) => {
                    let stats = runtime.stats();
                    println!(
                        "level {} | cleared {} | goblins slain {}",
                        runtime.state().level,
                        stats.levels_cleared,
                        stats.goblins_slain
                    );
                    println!(
                        "deaths {} (falls {}, ambushes {}, traps {})",
                        stats.deaths(),
                        stats.falls,
                        stats.ambushes,
                        stats.trap_deaths
                    );
                }
                Some(Command::Save) => match runtime.settings().save_to(&settings_path) {
                    Ok(()) => println!("settings saved to {}", settings_path.display()),
                    Err(e) => log::error!("Saving {} failed: {}", settings_path.display(), e),
                },
                Some(Command::Quit) => break,
                None => println!("{HELP}"),
            }
        }

        runtime.shutdown();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Echo Maze (console) starting...");
    console::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is echo_maze::web::wasm_main, this is just to satisfy the compiler
}
