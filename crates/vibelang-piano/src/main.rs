//! vibe-piano - Terminal piano keyboard for VibeLang
//!
//! Play with the mouse (click, or drag across keys for a glissando) or with
//! the computer keyboard shortcuts shown on the keys.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use vibelang_piano::{
    config::{Config, ShortcutPreset, Theme},
    note::note_name,
    output::{LogSink, NoteSink},
    piano::{KeyInput, Modifiers, NoteEvent, Piano, PointerEvent},
    session::TerminalSession,
    ui,
};

/// Notes played from the keyboard are released after this long without a
/// repeat, when the terminal cannot report key releases.
/// Must be longer than the OS key repeat delay (typically 300-500ms)
const KEY_RELEASE_TIMEOUT: Duration = Duration::from_millis(400);

#[derive(Parser)]
#[command(name = "vibe-piano")]
#[command(author, version, about = "Terminal piano keyboard for VibeLang", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/vibe-piano/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First note shown, e.g. c3
    #[arg(short, long)]
    start: Option<String>,

    /// Last note shown, e.g. f5
    #[arg(short, long)]
    end: Option<String>,

    /// Computer keyboard shortcut layout
    #[arg(long, value_enum)]
    shortcuts: Option<ShortcutPreset>,

    /// Show the keyboard but ignore all input
    #[arg(long)]
    disabled: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// Print the key layout and shortcut bindings
    Layout,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        _ => {}
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };

    // Apply CLI overrides
    if let Some(start) = cli.start {
        config.piano.start_note = start;
    }
    if let Some(end) = cli.end {
        config.piano.end_note = end;
    }
    if let Some(shortcuts) = cli.shortcuts {
        config.piano.shortcuts = shortcuts;
    }
    if cli.disabled {
        config.piano.disabled = true;
    }

    let piano = Piano::new(&config.to_piano_config()?)?;

    if let Some(Commands::Layout) = cli.command {
        print_layout(&piano);
        return Ok(());
    }

    run_tui(piano, &config.theme)
}

fn print_layout(piano: &Piano) {
    let layout = piano.layout();
    println!(
        "{} white keys, white key width {:.4}",
        layout.white_key_count(),
        layout.white_key_width()
    );
    println!("{:<6} {:>4} {:>8} {:>8} {:>8}  key", "note", "midi", "left", "width", "height");
    for midi in layout.keys() {
        let geometry = piano.geometry(midi);
        let shortcut = piano
            .shortcuts()
            .and_then(|s| s.shortcut_for_note(midi))
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:>4} {:>8.4} {:>8.4} {:>8.4}  {}",
            note_name(midi),
            midi,
            geometry.left,
            geometry.width,
            geometry.height,
            shortcut
        );
    }
}

fn run_tui(mut piano: Piano, theme: &Theme) -> Result<()> {
    let mut session = TerminalSession::start()?;
    let mut sink = LogSink::default();

    let result = run_event_loop(&mut session, &mut piano, &mut sink, theme);

    // Don't leave notes hanging, however the loop ended
    sink.send_all(&piano.release_all());

    result
}

fn run_event_loop(
    session: &mut TerminalSession,
    piano: &mut Piano,
    sink: &mut LogSink,
    theme: &Theme,
) -> Result<()> {
    let auto_release = !session.reports_key_release();
    let mut held_keys: HashMap<char, Instant> = HashMap::new();
    let mut keys_area = Rect::default();

    loop {
        // Draw
        let status = sink.last.as_ref().map(describe_event);
        session.terminal().draw(|frame| {
            let area = frame.area();

            // Clear the screen with a dark background
            frame.render_widget(Clear, area);
            let bg_block = Block::default().style(Style::default().bg(Color::Rgb(20, 20, 30)));
            frame.render_widget(bg_block, area);

            keys_area = ui::render_piano_standalone(frame, area, piano, theme, status.as_deref());
        })?;

        // Auto-release (for terminals without key-up detection)
        if auto_release {
            let expired: Vec<char> = held_keys
                .iter()
                .filter(|(_, pressed)| pressed.elapsed() > KEY_RELEASE_TIMEOUT)
                .map(|(&c, _)| c)
                .collect();
            for c in expired {
                held_keys.remove(&c);
                if let Some(event) = piano.key_released(KeyInput::new(c)) {
                    sink.send(&event);
                }
            }
        }

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        match event::read()? {
            Event::FocusLost => {
                // Release all notes when losing focus
                sink.send_all(&piano.release_all());
                held_keys.clear();
                piano.pointer_released();
            }
            Event::Key(key) => match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    let input = KeyInput::new(c).with_modifiers(modifiers(key.modifiers));
                    let event = match key.kind {
                        KeyEventKind::Press => {
                            if auto_release {
                                held_keys.insert(c.to_ascii_lowercase(), Instant::now());
                            }
                            piano.key_pressed(input)
                        }
                        KeyEventKind::Repeat => {
                            // Key repeat - extend the note
                            if auto_release {
                                held_keys.insert(c.to_ascii_lowercase(), Instant::now());
                            }
                            None
                        }
                        KeyEventKind::Release => {
                            held_keys.remove(&c.to_ascii_lowercase());
                            piano.key_released(input)
                        }
                    };
                    if let Some(event) = event {
                        sink.send(&event);
                    }
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                let target = ui::key_at(piano, keys_area, mouse.column, mouse.row);
                let pointer = match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(target)),
                    MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                        Some(PointerEvent::Move(target))
                    }
                    MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up(target)),
                    _ => None,
                };
                if let Some(pointer) = pointer {
                    sink.send_all(&piano.handle_pointer(pointer));
                }
            }
            _ => {}
        }
    }
}

fn modifiers(m: KeyModifiers) -> Modifiers {
    Modifiers {
        control: m.contains(KeyModifiers::CONTROL),
        meta: m.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        shift: m.contains(KeyModifiers::SHIFT),
    }
}

fn describe_event(event: &NoteEvent) -> String {
    let attrs = event.attributes();
    match event {
        NoteEvent::On(_) => format!("-> on {}", attrs.note),
        NoteEvent::Off(_) => format!("-> off {}", attrs.note),
    }
}
