use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use paneview::codec::SessionDocument;
use paneview::headless::{HeadlessSessions, HeadlessViews};
use paneview::{store, Config, ViewId, Workspace, WorkspaceEvent};

type HeadlessWorkspace = Workspace<HeadlessSessions, HeadlessViews>;

#[derive(Parser)]
#[command(name = "paneview", about = "Inspect and repair saved terminal window layouts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pane tree and every tab of a saved window
    Show {
        /// Session document (defaults to the configured or saved one)
        file: Option<PathBuf>,
        /// Treat the file as a single tab layout
        #[arg(short, long)]
        tab: bool,
    },
    /// Restore a saved window and verify the result is consistent
    Check {
        file: Option<PathBuf>,
    },
    /// Rewrite a session document in canonical form
    Normalize {
        file: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Show { file, tab: true } => {
            let path = file.unwrap_or_else(|| document_path(&config, None));
            let doc = store::load_layout_file(&path)?;
            let (mut ws, mut rx) = headless_workspace(config);
            if ws.load_layout(&doc).is_none() {
                bail!("{} holds no terminal", path.display());
            }
            log_events(&mut rx);
            print_workspace(&ws);
            Ok(())
        }
        Commands::Show { file, tab: false } => {
            let doc = read_document(&document_path(&config, file))?;
            let (ws, mut rx) = restore(config, &doc);
            log_events(&mut rx);
            print_workspace(&ws);
            Ok(())
        }
        Commands::Check { file } => {
            let path = document_path(&config, file);
            let doc = read_document(&path)?;
            if doc.is_empty() {
                bail!("{} has nothing to restore", path.display());
            }
            let (ws, mut rx) = restore(config, &doc);
            log_events(&mut rx);
            if !ws.is_well_formed() {
                bail!("restoring {} produced an inconsistent layout", path.display());
            }
            println!(
                "{}: {} pane(s), {} view(s), ok",
                path.display(),
                ws.panes().len(),
                ws.view_count()
            );
            Ok(())
        }
        Commands::Normalize { file, output } => {
            let doc = read_document(&document_path(&config, file))?;
            let (ws, mut rx) = restore(config, &doc);
            log_events(&mut rx);
            let canonical = ws.save_sessions();
            match output {
                Some(path) => store::save_to(&canonical, &path)?,
                None => println!("{}", canonical.to_json()?),
            }
            Ok(())
        }
    }
}

fn document_path(config: &Config, file: Option<PathBuf>) -> PathBuf {
    file.or_else(|| config.behavior.layout_file.clone())
        .unwrap_or_else(store::state_file_path)
}

fn read_document(path: &Path) -> anyhow::Result<SessionDocument> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SessionDocument::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn headless_workspace(config: Config) -> (HeadlessWorkspace, mpsc::UnboundedReceiver<WorkspaceEvent>) {
    let (event_tx, rx) = mpsc::unbounded_channel();
    let ws = Workspace::new(1, HeadlessSessions::new(), HeadlessViews::new(), config, event_tx);
    (ws, rx)
}

/// Rebuild the document with fresh headless sessions.
fn restore(config: Config, doc: &SessionDocument) -> (HeadlessWorkspace, mpsc::UnboundedReceiver<WorkspaceEvent>) {
    let (mut ws, rx) = headless_workspace(config);
    let restored = ws.restore_sessions(doc, false);
    log::info!("restored {restored} view(s)");
    (ws, rx)
}

fn log_events(rx: &mut mpsc::UnboundedReceiver<WorkspaceEvent>) {
    while let Ok(event) = rx.try_recv() {
        log::debug!("{event:?}");
    }
}

fn print_workspace(ws: &HeadlessWorkspace) {
    println!("panes: {}", ws.pane_tree().describe());
    for (number, pane) in ws.panes().iter().enumerate() {
        let Some(p) = ws.pane(*pane) else {
            continue;
        };
        let marker = if ws.active_pane() == Some(*pane) { "*" } else { " " };
        println!("{marker}pane {number}");
        for index in 0..p.tab_count() {
            let current = if p.current == index { "*" } else { " " };
            let root = ws.tab_root(*pane, index);
            let tree = root
                .map(|root| ws.splitters().describe(root, &|view: ViewId| view.to_string()))
                .unwrap_or_default();
            println!("  {current}tab {index}: {tree}");
        }
    }
}
