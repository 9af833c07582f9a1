use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;
use cellrogue::{
    config::GameConfig,
    data::{Direction, GRID_HEIGHT},
    engine::{Command, Outcome, Session},
    hall_of_fame::HallOfFame,
    render::{draw_log, draw_status, draw_tiles, health_bar},
    scripted_input::ScriptedInput,
    storage::SaveSlot,
};

const MAP_ORIGIN: Point = Point { x: 2, y: 2 };
const STATUS_ROW: i32 = MAP_ORIGIN.y + GRID_HEIGHT + 2;
const LOG_PANEL_START: i32 = STATUS_ROW + 3;
const LOG_MAX_ENTRIES: usize = 8;

struct CellRogueState {
    session: Session,
    config: GameConfig,
    message_log: Vec<String>,
}

impl GameState for CellRogueState {
    fn tick(&mut self, ctx: &mut BTerm) {
        if let Some(command) = ctx.key.and_then(key_to_command) {
            let outcome = self.session.apply(command);
            self.flush_session_log();
            self.handle_outcome(outcome);
        }
        ctx.cls();
        self.draw_scene(ctx);
    }
}

impl CellRogueState {
    fn flush_session_log(&mut self) {
        for entry in self.session.drain_log() {
            self.push_log_entry(entry);
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Listing(lines) => {
                for line in lines {
                    tracing::info!("{line}");
                    self.push_log_entry(line);
                }
            }
            Outcome::Won => {
                self.push_log_entry(format!(
                    "Victory in {} turns with {} points.",
                    self.session.turns(),
                    self.session.score()
                ));
                for line in record_win(&self.config, self.session.score()) {
                    self.push_log_entry(line);
                }
            }
            _ => {}
        }
    }

    fn push_log_entry(&mut self, entry: String) {
        self.message_log.push(entry);
        if self.message_log.len() > LOG_MAX_ENTRIES {
            let overflow = self.message_log.len() - LOG_MAX_ENTRIES;
            self.message_log.drain(0..overflow);
        }
    }

    fn draw_scene(&mut self, ctx: &mut BTerm) {
        ctx.print_color_centered(
            0,
            RGB::named(YELLOW),
            RGB::named(BLACK),
            "cellrogue · arrows move · 1-3 drop · Q/W/E use · I/J list",
        );

        draw_tiles(ctx, &self.session.render_tiles(), MAP_ORIGIN);
        draw_tiles(ctx, &health_bar(self.session.hero_hp()), MAP_ORIGIN);
        draw_status(
            ctx,
            self.session.level().as_str(),
            self.session.turns(),
            self.session.score(),
            STATUS_ROW,
        );
        draw_log(ctx, &self.message_log, LOG_PANEL_START);
    }
}

/// Slot keys follow their position on screen: the leftmost key acts on the
/// rightmost slot.
fn key_to_command(key: VirtualKeyCode) -> Option<Command> {
    match key {
        VirtualKeyCode::Up => Some(Command::Move(Direction::Up)),
        VirtualKeyCode::Down => Some(Command::Move(Direction::Down)),
        VirtualKeyCode::Left => Some(Command::Move(Direction::Left)),
        VirtualKeyCode::Right => Some(Command::Move(Direction::Right)),
        VirtualKeyCode::Key1 => Some(Command::Drop(2)),
        VirtualKeyCode::Key2 => Some(Command::Drop(1)),
        VirtualKeyCode::Key3 => Some(Command::Drop(0)),
        VirtualKeyCode::Q => Some(Command::Use(2)),
        VirtualKeyCode::W => Some(Command::Use(1)),
        VirtualKeyCode::E => Some(Command::Use(0)),
        VirtualKeyCode::I => Some(Command::ListInventory),
        VirtualKeyCode::J => Some(Command::ListElements),
        _ => None,
    }
}

/// Enters the win in the hall of fame and returns the table for display.
fn record_win(config: &GameConfig, score: i32) -> Vec<String> {
    let mut hall = match HallOfFame::load(&config.records_path) {
        Ok(hall) => hall,
        Err(err) => {
            tracing::warn!(error = %err, "hall of fame unreadable, starting a new one");
            HallOfFame::default()
        }
    };
    match hall.submit(config.player.as_str(), score) {
        Some(rank) => tracing::info!(
            player = %config.player,
            score,
            rank = rank + 1,
            "new hall of fame entry"
        ),
        None => tracing::info!(score, "score did not make the hall of fame"),
    }
    if let Err(err) = hall.save(&config.records_path) {
        tracing::warn!(error = %err, "failed to save hall of fame");
    }

    hall.table()
}

fn start_session(config: &GameConfig) -> Result<Session, cellrogue::error::LoadError> {
    // Read the stored checkpoint before the new session overwrites it.
    let stored = match config.save_dir.as_ref().map(SaveSlot::new) {
        Some(slot) => slot.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable checkpoint");
            None
        }),
        None => None,
    };

    let mut session = Session::new(config)?;
    if let Some(checkpoint) = stored
        && let Err(err) = session.resume(checkpoint)
    {
        tracing::warn!(error = %err, "stored checkpoint does not fit the loaded levels");
    }
    Ok(session)
}

fn run_script(mut session: Session, config: &GameConfig, input: ScriptedInput) {
    tracing::info!(commands = input.len(), "running script");
    for command in input {
        let outcome = session.apply(command);
        for entry in session.drain_log() {
            tracing::debug!("{entry}");
        }
        match outcome {
            Outcome::Listing(lines) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Outcome::Won => {
                for line in record_win(config, session.score()) {
                    println!("{line}");
                }
                break;
            }
            _ => {}
        }
    }
    println!(
        "Turns: {} Score: {}{}",
        session.turns(),
        session.score(),
        if session.is_won() { " (won)" } else { "" }
    );
}

fn main() -> BError {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::from_env();
    let mut session = start_session(&config).inspect_err(|err| {
        tracing::error!(rooms = %config.rooms_dir.display(), error = %err, "no playable levels");
    })?;

    if let Some(script) = &config.script {
        let input = ScriptedInput::from_file(script)?;
        run_script(session, &config, input);
        return Ok(());
    }

    let message_log = session.drain_log();
    let context = BTermBuilder::simple80x50()
        .with_title("cellrogue")
        .build()?;
    let game_state = CellRogueState {
        session,
        config,
        message_log,
    };
    main_loop(context, game_state)
}
