//! Teach and repeat control thread

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender, TryRecvError},
    Arc,
};
use std::thread::{self, JoinHandle};

// Internal
use super::{TeachRepeatCtrl, TeachRepeatError};
use crate::cycle::CycleTimer;
use teleop_if::{
    eqpt::Arm,
    tc::{TeachRepeatCmd, TeachRepeatStatus},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the control loop until quit is commanded, the command channel closes, or `running` is
/// cleared.
///
/// Every cycle pending commands are handled first, each producing a status on `status_tx`, then
/// the controller is stepped.
pub fn run_worker<A: Arm>(
    mut ctrl: TeachRepeatCtrl<A>,
    cmd_rx: Receiver<TeachRepeatCmd>,
    status_tx: Sender<TeachRepeatStatus>,
    running: Arc<AtomicBool>,
) -> Result<TeachRepeatCtrl<A>, TeachRepeatError> {
    let mut timer = CycleTimer::new(ctrl.params().cycle_period_s)?;

    loop {
        timer.start();

        if !running.load(Ordering::SeqCst) {
            info!("Stop requested, quitting");
            ctrl.handle_cmd(TeachRepeatCmd::Quit)?;
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    let status = ctrl.handle_cmd(cmd)?;

                    // The interface may already have gone, that's not a control error
                    if status_tx.send(status).is_err() {
                        warn!("Status receiver has hung up");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Command channel closed, quitting");
                    ctrl.handle_cmd(TeachRepeatCmd::Quit)?;
                    break;
                }
            }
        }

        if !ctrl.update()? {
            break;
        }

        timer.end();
    }

    info!("Teach and repeat control thread stopped after {} cycles", timer.num_cycles);

    Ok(ctrl)
}

/// Spawn [`run_worker`] on its own thread.
pub fn spawn_worker<A>(
    ctrl: TeachRepeatCtrl<A>,
    cmd_rx: Receiver<TeachRepeatCmd>,
    status_tx: Sender<TeachRepeatStatus>,
    running: Arc<AtomicBool>,
) -> JoinHandle<Result<TeachRepeatCtrl<A>, TeachRepeatError>>
where
    A: Arm + Send + 'static,
{
    thread::spawn(move || run_worker(ctrl, cmd_rx, status_tx, running))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{mock::MockArm, teach_repeat::Params};
    use std::sync::mpsc;
    use teleop_if::tc::RunMode;

    fn params() -> Params {
        Params {
            cycle_period_s: 0.001,
            ..Default::default()
        }
    }

    #[test]
    fn test_commands_over_channel() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (status_tx, status_rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let mut arm = MockArm::new(3);
        arm.at_goal = true;

        let handle = spawn_worker(
            TeachRepeatCtrl::new(params(), arm),
            cmd_rx,
            status_tx,
            running,
        );

        cmd_tx.send(TeachRepeatCmd::AddWaypoint).unwrap();
        cmd_tx.send(TeachRepeatCmd::AddWaypoint).unwrap();
        cmd_tx.send(TeachRepeatCmd::StartPlayback).unwrap();

        let statuses: Vec<TeachRepeatStatus> = status_rx.iter().take(3).collect();
        assert_eq!(statuses[1].num_waypoints, 2);
        assert_eq!(statuses[2].mode, RunMode::Playback);

        cmd_tx.send(TeachRepeatCmd::Quit).unwrap();
        let ctrl = handle.join().unwrap().unwrap();

        assert!(!ctrl.arm().goals.is_empty());
        assert_eq!(ctrl.arm().num_cancels, 1);
    }

    #[test]
    fn test_stops_on_flag_and_hangup() {
        let (_cmd_tx, cmd_rx) = mpsc::channel();
        let (status_tx, _status_rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(false));

        let ctrl = run_worker(
            TeachRepeatCtrl::new(params(), MockArm::new(3)),
            cmd_rx,
            status_tx,
            running,
        )
        .unwrap();
        assert_eq!(ctrl.arm().num_cancels, 1);

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (status_tx, _status_rx) = mpsc::channel();
        drop(cmd_tx);

        assert!(run_worker(
            TeachRepeatCtrl::new(params(), MockArm::new(3)),
            cmd_rx,
            status_tx,
            Arc::new(AtomicBool::new(true)),
        )
        .is_ok());
    }

    #[test]
    fn test_invalid_cycle_period() {
        let (_cmd_tx, cmd_rx) = mpsc::channel();
        let (status_tx, _status_rx) = mpsc::channel();
        let p = Params {
            cycle_period_s: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            run_worker(
                TeachRepeatCtrl::new(p, MockArm::new(3)),
                cmd_rx,
                status_tx,
                Arc::new(AtomicBool::new(true)),
            ),
            Err(TeachRepeatError::Cycle(_))
        ));
    }
}
