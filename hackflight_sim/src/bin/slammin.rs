//! Runs the sonar echo loop over a serial port.
//!
//! Usage: `slammin PORT BAUD`

use hackflight_core::EchoLoop;
use hackflight_env::{ByteTransport, Interrupt, SerialSettings, SerialTransport};
use hackflight_sim::cli::{init_tracing, parse_echo_args, Invocation};
use hackflight_sim::{SimulatedFcConfig, SimulatedFlightController};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = match parse_echo_args(std::env::args_os()) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Usage(text)) => {
            println!("{text}");
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };
    
    init_tracing(args.verbose);
    let interrupt = Interrupt::install()?;
    
    let transport: Box<dyn ByteTransport> = if args.simulate {
        info!("Using simulated flight controller");
        Box::new(SimulatedFlightController::new(SimulatedFcConfig::default(), args.seed)?)
    } else {
        Box::new(SerialTransport::open(&SerialSettings::new(&args.port, args.baud))?)
    };
    
    let stdout = std::io::stdout();
    let mut echo = EchoLoop::new(transport, stdout.lock()).with_attitude(args.attitude);
    echo.run(&interrupt)?;
    
    Ok(())
}
