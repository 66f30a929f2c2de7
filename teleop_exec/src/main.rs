//! Main arm teleoperation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the equipment (the simulated arm and a scripted mobile IO)
//!     - Main loop, once per cycle:
//!         - Read the mobile IO
//!         - Input sampling
//!         - Arm control state machine
//!         - Send the arm command
//!
//! The loop ends when the state machine exits, which happens on Ctrl-C or at the end of the
//! input script. If the arm reports an error the pending goal is cancelled before exiting.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use structopt::StructOpt;

// Internal
use teleop_lib::{
    arm_ctrl::ArmCtrl,
    cycle::CycleTimer,
    input::InputSampler,
    sim::{ScriptedMobileIo, SimArm},
    teleop::Teleop,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "teleop_exec", about = "Teleoperate an arm from a mobile IO device")]
struct Opt {
    /// Mobile IO script to replay as operator input
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum level of log messages
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,

    /// Target period of one control cycle, in seconds
    #[structopt(long, default_value = "0.01")]
    period_s: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("teleop_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Mobile IO Arm Teleoperation\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut sampler = InputSampler::default();
    sampler
        .init("input.toml")
        .wrap_err("Failed to initialise the InputSampler")?;
    info!("InputSampler init complete");

    let arm = SimArm::from_param_file("sim_arm.toml").wrap_err("Failed to initialise the arm")?;
    info!("SimArm init complete ({} joints)", arm.params().num_joints);

    let arm_ctrl =
        ArmCtrl::from_param_file("arm_ctrl.toml", arm).wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    let device = ScriptedMobileIo::new(&opt.script)
        .wrap_err_with(|| format!("Failed to load the mobile IO script {:?}", opt.script))?;

    let mut teleop =
        Teleop::new(device, sampler, arm_ctrl).wrap_err("Failed to initialise teleoperation")?;

    info!("Module initialisation complete\n");

    // ---- CTRL-C HANDLING ----

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .wrap_err("Failed to set the Ctrl-C handler")?;
    }

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut timer = CycleTimer::new(opt.period_s).wrap_err("Invalid cycle period")?;
    let mut exit_requested = false;

    loop {
        timer.start();

        if !exit_requested {
            if !running.load(Ordering::SeqCst) {
                info!("Ctrl-C received, exiting");
                teleop.request_exit();
                exit_requested = true;
            } else if teleop.device_mut().is_finished() {
                info!("End of input script, exiting");
                teleop.request_exit();
                exit_requested = true;
            }
        }

        match teleop.tick(session::get_elapsed_seconds()) {
            Ok(true) => (),
            Ok(false) => break,
            Err(e) => {
                error!("Teleoperation failed: {}", e);
                teleop.abort();
                return Err(e).wrap_err("Teleoperation failed");
            }
        }

        timer.end();
    }

    // ---- SHUTDOWN ----

    info!(
        "End of execution after {} cycles, final state {:?}, {} inverse kinematics failures",
        timer.num_cycles,
        teleop.state(),
        teleop.arm_ctrl().report().num_ik_failures
    );

    Ok(())
}
