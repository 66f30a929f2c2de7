//! Control tick benchmark: one read, sample and arm control update against the simulated arm.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use teleop_if::eqpt::{InputDevice, MobileIoState};
use teleop_lib::{
    arm_ctrl::{ArmCtrl, Params, WorkspaceLimits},
    input::{InputParams, InputSampler},
    sim::{SimArm, SimArmParams},
    teleop::Teleop,
};

/// Device which always returns the same readout.
struct ConstDevice(MobileIoState);

impl InputDevice for ConstDevice {
    fn read(&mut self) -> Option<MobileIoState> {
        Some(self.0)
    }
}

fn build(readout: MobileIoState) -> Teleop<ConstDevice, SimArm> {
    let arm = SimArm::new(SimArmParams {
        num_joints: 6,
        base_height_m: 0.1,
        shoulder_length_m: 0.3,
        elbow_length_m: 0.25,
        max_joint_rate_rads: 2.0,
        step_s: 0.01,
        at_goal_tolerance_rad: 1e-3,
        initial_position_rad: Some(vec![0.0, 0.6, -1.2, 0.6, 0.0, 0.0]),
        has_gripper: true,
    })
    .unwrap();

    let arm_ctrl = ArmCtrl::new(
        Params {
            home_position_rad: vec![0.0, 0.6, -1.2, 0.6, 0.0, 0.0],
            home_duration_s: None,
            disconnect_timeout_s: 1.0,
            workspace: WorkspaceLimits {
                max_abs_x_m: 0.5,
                max_abs_y_m: 0.5,
                min_z_m: 0.0,
                max_z_m: 0.6,
            },
        },
        arm,
    )
    .unwrap();

    let mut teleop = Teleop::new(
        ConstDevice(readout),
        InputSampler::new(InputParams::default()).unwrap(),
        arm_ctrl,
    )
    .unwrap();

    // Get through startup and homing so every measured tick is a teleop tick
    let mut t = 0.0;
    while teleop.state() != teleop_lib::arm_ctrl::ControlState::Teleop {
        teleop.tick(t).unwrap();
        t += 0.01;
    }

    teleop
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_tick");

    let active = MobileIoState::default().with_button(5, true);
    let cases = [
        ("idle", MobileIoState::default()),
        ("joint", active.with_button(2, true)),
        ("cartesian", active.with_axis(8, 0.2).with_axis(5, 0.1)),
    ];

    for (name, readout) in cases {
        let mut teleop = build(readout);
        let mut t = 10.0;

        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, _| {
            b.iter(|| {
                t += 0.01;
                black_box(teleop.tick(black_box(t)).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
