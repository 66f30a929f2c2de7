//! Leader-follower arm teleoperation.
//!
//! A follower arm mirrors a leader arm moved by hand, while the mobile IO drives a standalone
//! gripper. The mobile IO also acts as the operator's presence check: if it goes silent the
//! follower stops and must be realigned before following resumes.

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
use teleop_if::eqpt::{Arm, InputDevice};
use teleop_lib::{
    cycle::CycleTimer,
    gripper_ctrl::{self, GripperCtrl, GripperInputParser},
    leader_follower::LeaderFollowerCtrl,
    sim::{ScriptedMobileIo, SimArm, SimGripper, SimLeader},
};
use util::{
    logger::{logger_init, LevelFilter},
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "maps_teleop", about = "Leader-follower arm teleoperation with a gripper")]
struct Opt {
    /// Mobile IO script to replay as operator input
    #[structopt(parse(from_os_str))]
    mobile_io_script: PathBuf,

    /// Leader arm script to replay as the leader's joint positions
    #[structopt(parse(from_os_str))]
    leader_script: PathBuf,

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

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("maps_teleop", "sessions").wrap_err("Failed to create the session")?;

    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Leader-Follower Teleoperation\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE EQUIPMENT AND MODULES ----

    let follower =
        SimArm::from_param_file("sim_follower.toml").wrap_err("Failed to initialise the follower")?;
    let num_joints = follower.num_joints();

    let leader = SimLeader::new(&opt.leader_script, num_joints)
        .wrap_err_with(|| format!("Failed to load the leader script {:?}", opt.leader_script))?;

    let mut mobile_io = ScriptedMobileIo::new(&opt.mobile_io_script).wrap_err_with(|| {
        format!("Failed to load the mobile IO script {:?}", opt.mobile_io_script)
    })?;

    let mut lf_ctrl = LeaderFollowerCtrl::from_param_file("leader_follower.toml", leader, follower)
        .wrap_err("Failed to initialise LeaderFollowerCtrl")?;
    info!("LeaderFollowerCtrl init complete ({} joints)", num_joints);

    let gripper_params: gripper_ctrl::Params =
        params::load("gripper_ctrl.toml").wrap_err("Could not load gripper params")?;
    let mut gripper_parser = GripperInputParser::new(gripper_params);
    let mut gripper_ctrl = GripperCtrl::new(SimGripper::default());
    info!("GripperCtrl init complete\n");

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

        if !exit_requested && (!running.load(Ordering::SeqCst) || mobile_io.is_finished()) {
            info!("Exiting");
            lf_ctrl.request_exit();
            gripper_ctrl.request_exit();
            exit_requested = true;
        }

        let t_s = session::get_elapsed_seconds();
        let raw = mobile_io.read();

        let gripper_inputs = gripper_parser.parse(raw.as_ref());

        let lf_running = match lf_ctrl.update(t_s, raw.is_some()) {
            Ok(r) => r,
            Err(e) => {
                error!("Leader-follower control failed: {}", e);
                lf_ctrl.abort();
                return Err(e).wrap_err("Leader-follower control failed");
            }
        };

        let gripper_running = gripper_ctrl.update(t_s, gripper_inputs);
        gripper_ctrl
            .send()
            .wrap_err("Failed to send the gripper command")?;

        if !(lf_running && gripper_running) {
            break;
        }

        timer.end();
    }

    // ---- SHUTDOWN ----

    info!(
        "End of execution after {} cycles, final state {:?}",
        timer.num_cycles,
        lf_ctrl.state()
    );

    Ok(())
}
