mod commands;
mod session;

use std::sync::Arc;
use std::time::Duration;
use std::{fs, path::Path};

use anyhow::Result;
use config::{AppConfig, ConfigStore, database_path, default_data_dir};
use core_types::{KvStore, NotesSnapshot};
use notes_state::{NotesStore, SharedNotesStore};
use persistence::SnapshotPersistence;
use shell::{EditorShell, ShellOptions};
use storage_kv::{MemoryKvStore, SqliteKvStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, CommandError};
use crate::session::{Outcome, Session};

fn main() {
    let data_dir = default_data_dir();
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }

    let config_result = ConfigStore::from_default_location().and_then(|store| store.load_or_init());
    let config = match &config_result {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    let _log_guard = init_local_logger(&data_dir.join("logs"), &config.log_filter);
    if let Err(err) = config_result {
        error!("failed to load config: {err:#}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to create tokio runtime: {err}");
            return;
        }
    };

    if let Err(err) = runtime.block_on(run(config, &data_dir)) {
        error!("marknote exited with error: {err:#}");
        eprintln!("error: {err:#}");
    }
}

async fn open_store(data_dir: &Path) -> Arc<dyn KvStore> {
    let sqlite_path = database_path(data_dir);
    match SqliteKvStore::connect(&sqlite_path).await {
        Ok(store) => {
            info!(path = %sqlite_path.display(), "storage ready");
            Arc::new(store)
        }
        Err(err) => {
            error!(path = %sqlite_path.display(), "storage init failed, notes will not be saved: {err:#}");
            eprintln!("warning: storage unavailable, changes will not be saved");
            Arc::new(MemoryKvStore::new())
        }
    }
}

async fn run(config: AppConfig, data_dir: &Path) -> Result<()> {
    let persistence = Arc::new(SnapshotPersistence::new(
        open_store(data_dir).await,
        config.storage_key.clone(),
    ));

    let snapshot = match persistence.load_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("failed to read stored notes, starting empty: {err:#}");
            Default::default()
        }
    };

    let mut notes = NotesStore::with_system_clock();
    notes.hydrate(snapshot);
    let writer = persistence.clone().spawn_write_through(notes.subscribe());
    let store = notes.into_shared();

    let mut shell = EditorShell::new(
        store.clone(),
        ShellOptions {
            debounce: Duration::from_millis(config.debounce_ms),
            view_mode: config.default_view_mode,
            split_percent: config.split_percent,
            theme: config.theme,
        },
    );
    shell.ensure_active();
    let mut session = Session::new(shell);

    println!("marknote: type `help` for commands");
    command_loop(&mut session, BufReader::new(tokio::io::stdin())).await;
    shutdown(session, store, writer, &persistence).await?;
    Ok(())
}

/// Runs commands from `input` until `quit` or the end of input. A read error
/// ends the loop the same way as end of input.
async fn command_loop<R>(session: &mut Session, input: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "failed to read input, shutting down");
                break;
            }
        };
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match session.execute(command) {
            Outcome::Output(text) => println!("{text}"),
            Outcome::Quit => break,
        }
    }
}

/// Applies the pending edit, stops the write-through task and saves the final
/// snapshot. Returns the snapshot that was saved.
async fn shutdown(
    mut session: Session,
    store: SharedNotesStore,
    writer: JoinHandle<()>,
    persistence: &SnapshotPersistence,
) -> Result<NotesSnapshot> {
    session.shell_mut().flush_pending_edit();
    let final_snapshot = store.lock().snapshot().clone();
    // Closing the publisher lets the write-through task drain and stop.
    drop(session);
    drop(store);
    if let Err(err) = writer.await {
        warn!("write-through task failed: {err}");
    }
    persistence.flush(&final_snapshot).await?;
    info!(notes = final_snapshot.notes.len(), "marknote closed");
    Ok(final_snapshot)
}

fn init_local_logger(
    log_dir: &Path,
    default_filter: &str,
) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "marknote.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> (Session, SharedNotesStore, JoinHandle<()>, Arc<SnapshotPersistence>) {
        let persistence = Arc::new(SnapshotPersistence::new(
            Arc::new(MemoryKvStore::new()),
            "notes-store-v1",
        ));
        let notes = NotesStore::with_system_clock();
        let writer = persistence.clone().spawn_write_through(notes.subscribe());
        let store = notes.into_shared();
        let mut shell = EditorShell::new(store.clone(), ShellOptions::default());
        shell.ensure_active();
        (Session::new(shell), store, writer, persistence)
    }

    #[tokio::test]
    async fn unreadable_input_still_saves_the_pending_edit() {
        let (mut session, store, writer, persistence) = started();

        let input: &[u8] = b"write hello\n\xff\xfe\nnew\n";
        command_loop(&mut session, input).await;
        assert!(session.shell().has_pending_edit());
        assert_eq!(store.lock().notes().len(), 1);

        let saved = shutdown(session, store, writer, &persistence)
            .await
            .expect("shutdown");
        assert_eq!(saved.notes[0].content, "hello");

        let loaded = persistence.load_snapshot().await.expect("load");
        assert_eq!(loaded.notes.len(), 1);
        assert_eq!(loaded.notes[0].content, "hello");
        assert_eq!(loaded.notes[0].title, "hello");
    }

    #[tokio::test]
    async fn quit_stops_reading_commands() {
        let (mut session, store, writer, persistence) = started();

        let input: &[u8] = b"\nbogus\nquit\nnew\n";
        command_loop(&mut session, input).await;
        assert_eq!(store.lock().notes().len(), 1);

        shutdown(session, store, writer, &persistence)
            .await
            .expect("shutdown");
    }
}
