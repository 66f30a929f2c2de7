//! Teach and repeat.
//!
//! The control thread owns the arm and runs the fixed-rate loop. This thread runs the prompt,
//! parsing each line into a command, sending it to the control thread and printing the status
//! that comes back.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, RecvTimeoutError},
    Arc,
};
use std::time::Duration;
use structopt::StructOpt;

// Internal
use teleop_if::tc::{TeachRepeatCmd, TeachRepeatStatus};
use teleop_lib::{
    sim::SimArm,
    teach_repeat::{self, spawn_worker, TeachRepeatCtrl, TeachRepeatError},
};
use util::{
    logger::{logger_init, LevelFilter},
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "teach_repeat $ ";

/// How long to wait for the control thread to acknowledge a command.
const STATUS_TIMEOUT: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "teach_repeat", about = "Record arm waypoints by hand and play them back")]
struct Opt {
    /// Minimum level of log messages
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("teach_repeat", "sessions").wrap_err("Failed to create the session")?;

    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Teach and Repeat\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE CONTROL THREAD ----

    let tr_params: teach_repeat::Params =
        params::load("teach_repeat.toml").wrap_err("Could not load teach and repeat params")?;
    let arm = SimArm::from_param_file("sim_arm.toml").wrap_err("Failed to initialise the arm")?;

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (status_tx, status_rx) = mpsc::channel();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .wrap_err("Failed to set the Ctrl-C handler")?;
    }

    let handle = spawn_worker(
        TeachRepeatCtrl::new(tr_params, arm),
        cmd_rx,
        status_tx,
        running.clone(),
    );
    info!("Control thread started\n");

    // ---- PROMPT ----

    println!("Commands: add, add-toggle, clear, play, train, quit");

    let mut rl = DefaultEditor::new().wrap_err("Failed to start the prompt")?;

    while running.load(Ordering::SeqCst) {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                info!("Prompt closed, quitting");
                send_cmd(&cmd_tx, &status_rx, TeachRepeatCmd::Quit);
                break;
            }
            Err(e) => {
                error!("Prompt error: {}", e);
                send_cmd(&cmd_tx, &status_rx, TeachRepeatCmd::Quit);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Err(e) = rl.add_history_entry(line.as_str()) {
            warn!("Could not add to the prompt history: {}", e);
        }

        match TeachRepeatCmd::parse_line(&line) {
            Ok(cmd) => {
                if !send_cmd(&cmd_tx, &status_rx, cmd) || cmd == TeachRepeatCmd::Quit {
                    break;
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    // ---- SHUTDOWN ----

    let ctrl = match handle.join() {
        Ok(r) => r.wrap_err("Teach and repeat control failed")?,
        Err(_) => return Err(TeachRepeatError::WorkerPanic).wrap_err("Teach and repeat control failed"),
    };

    info!("End of execution, {} waypoints recorded", ctrl.waypoints().len());

    Ok(())
}

/// Send a command and print the status reply. Returns false if the control thread has stopped.
fn send_cmd(
    cmd_tx: &mpsc::Sender<TeachRepeatCmd>,
    status_rx: &mpsc::Receiver<TeachRepeatStatus>,
    cmd: TeachRepeatCmd,
) -> bool {
    if cmd_tx.send(cmd).is_err() {
        warn!("Control thread has stopped");
        return false;
    }

    match status_rx.recv_timeout(STATUS_TIMEOUT) {
        Ok(status) => {
            println!(
                "{:?}: {} waypoints, next {}{}",
                status.mode,
                status.num_waypoints,
                status.playback_index,
                if status.last_cmd_accepted { "" } else { " (command rejected)" }
            );
            true
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!("No reply from the control thread to {:?}", cmd);
            true
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!("Control thread has stopped");
            false
        }
    }
}
