//! Differential drive teleoperation.
//!
//! Drives a two-wheeled robot from a phone. Releasing the phone, or losing it, stops the wheels.
//! The abort button stops the wheels and ends the session.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::info;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use structopt::StructOpt;

// Internal
use teleop_if::eqpt::{InputDevice, WheelGroup};
use teleop_lib::{
    cycle::CycleTimer,
    loco_ctrl::{self, LocoCtrl},
    sim::{ScriptedMobileIo, SimWheels},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "diff_drive", about = "Drive a differential drive robot from a phone")]
struct Opt {
    /// Mobile IO script to replay as the phone
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum level of log messages
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Target period of one control cycle, in seconds
    #[structopt(long, default_value = "0.02")]
    period_s: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("diff_drive", "sessions").wrap_err("Failed to create the session")?;

    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Differential Drive Teleoperation\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MODULES ----

    let mut loco_ctrl = LocoCtrl::default();
    loco_ctrl
        .init("loco_ctrl.toml")
        .wrap_err("Failed to initialise LocoCtrl")?;
    info!("LocoCtrl init complete");

    let mut phone = ScriptedMobileIo::new(&opt.script)
        .wrap_err_with(|| format!("Failed to load the phone script {:?}", opt.script))?;
    let mut wheels = SimWheels::default();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .wrap_err("Failed to set the Ctrl-C handler")?;
    }

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut timer = CycleTimer::new(opt.period_s).wrap_err("Invalid cycle period")?;

    loop {
        timer.start();

        if !running.load(Ordering::SeqCst) || phone.is_finished() {
            info!("Stopping");
            wheels
                .send_velocity([0.0; 2])
                .wrap_err("Failed to stop the wheels")?;
            break;
        }

        let (output, _) = loco_ctrl
            .proc(&loco_ctrl::InputData { raw: phone.read() })
            .wrap_err("LocoCtrl processing failed")?;

        wheels
            .send_velocity(output.wheel_velocity_rads)
            .wrap_err("Failed to send the wheel demand")?;

        if output.abort {
            break;
        }

        timer.end();
    }

    // ---- SHUTDOWN ----

    info!("End of execution after {} cycles", timer.num_cycles);

    Ok(())
}
