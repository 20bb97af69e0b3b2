use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::App;
use crate::machine::Machine;

mod app;
mod error;
mod framebuffer;
mod machine;
mod memory;
mod opcode;
#[cfg(feature = "audio")]
mod sound;
mod stack;

/// Defines this program's command-line arguments
#[derive(Parser, Debug)]
struct Args {
    /// Path to a CHIP-8 program image
    #[arg(index = 1)]
    input_file: String,

    /// Number of window pixels per framebuffer cell
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Instruction rate in steps per second
    #[arg(long, default_value_t = 700)]
    cpu_hz: u64,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    log::info!("Loading program from: {}", args.input_file);
    let data = match std::fs::read(args.input_file) {
        Ok(v) => v,
        Err(e) => {
            log::error!("Expected a path to a CHIP-8 program");
            log::error!("{:?}", e);
            std::process::exit(1);
        }
    };

    let mut machine = Machine::new();
    if let Err(e) = machine.load(&data) {
        log::error!("{}", e);
        std::process::exit(1);
    }

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(machine, args.scale, args.cpu_hz);
    event_loop.run_app(&mut app).unwrap();
}
