//! vigo entrypoint.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use core_editor::Editor;
use core_events::{UI_EVENT_CHANNEL_CAP, UiEvent};
use core_terminal::{Terminal, spawn_input_thread};
use tokio::sync::mpsc;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "vigo", version, about = "vigo editor")]
struct Args {
    /// Files to open; with none, a single empty buffer named `unnamed`.
    pub files: Vec<std::path::PathBuf>,
    /// Configuration file path (overrides discovery of `vigo.toml`).
    #[arg(long = "config")]
    pub config: Option<std::path::PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // File logging: the terminal owns stdout, so tracing writes to
    // vigo.log through a non-blocking appender.
    let file_appender = tracing_appender::rolling::never(".", "vigo.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(writer)
        .init();
    info!(target: "runtime", "startup");

    // Log panics before the terminal guard restores the screen, then let
    // the default hook print to stderr as usual.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(target: "runtime.panic", ?info, "panic");
        default_panic(info);
    }));

    let args = Args::parse();
    let config = core_config::load_from(args.config.clone());

    let editor_result = {
        // The terminal handle restores cooked mode on drop, panics
        // included; everything that draws lives inside this scope.
        let mut term = Terminal::new();
        term.enter()?;

        let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(UI_EVENT_CHANNEL_CAP);
        let _input_handle = spawn_input_thread(ui_tx);

        let (mut editor, channels) = Editor::new(&args.files, &config);
        editor.run(ui_rx, channels, &mut term).await
        // dropping ui_rx lets the input thread wind down on its next event
    };

    match editor_result {
        Ok(()) => {
            info!(target: "runtime", "clean_exit");
            Ok(())
        }
        Err(err) => {
            error!(target: "runtime", error = %err, "fatal");
            Err(err)
        }
    }
}
