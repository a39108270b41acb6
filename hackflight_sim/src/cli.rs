//! Command-line arguments and logging setup shared by the binaries.

use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Print sonar readings from a flight controller over MSP
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "slammin")]
#[command(about = "Request and print sonar telemetry over a serial link", long_about = None)]
pub struct EchoArgs {
    /// Serial device, e.g. /dev/ttyUSB0
    pub port: String,
    
    /// Baud rate, e.g. 57600
    pub baud: u32,
    
    /// Also request and print attitude
    #[arg(long)]
    pub attitude: bool,
    
    /// Talk to a simulated flight controller instead of PORT
    #[arg(long)]
    pub simulate: bool,
    
    /// Seed for the simulated flight controller
    #[arg(long)]
    pub seed: Option<u64>,
    
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Animate a random obstacle field around a vehicle
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "slamvis")]
#[command(about = "Simple 3D SLAM visualization demo", long_about = None)]
pub struct VisArgs {
    /// Axis half-extent and obstacle spread (cm)
    #[arg(long, default_value = "300", value_parser = positive_f64)]
    pub map_size: f64,
    
    /// Obstacle cube edge (cm)
    #[arg(long, default_value = "10", value_parser = positive_f64)]
    pub obstacle_size: f64,
    
    /// Vehicle pyramid size (cm)
    #[arg(long, default_value = "25", value_parser = positive_f64)]
    pub vehicle_size: f64,
    
    /// Seed for reproducible obstacle placement
    #[arg(short, long)]
    pub seed: Option<u64>,
    
    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,
    
    /// Record to an .rrd file instead of spawning the viewer
    #[arg(long)]
    pub save: Option<String>,
    
    /// Write the final scene to a JSON file
    #[arg(long)]
    pub export: Option<String>,
    
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Result of reading the echo loop's command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(EchoArgs),
    /// Positional arguments missing: print this and exit with status 1
    Usage(String),
}

/// Parses the echo loop's command line.
///
/// Missing PORT/BAUD yields the usage text; any other problem (bad baud,
/// `--help`) is left to clap.
pub fn parse_echo_args<I, T>(argv: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let program = argv
        .first()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slammin".to_string());
    
    match EchoArgs::try_parse_from(&argv) {
        Ok(args) => Ok(Invocation::Run(args)),
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => Ok(Invocation::Usage(usage(&program))),
        Err(e) => Err(e),
    }
}

/// Usage text for the echo loop.
pub fn usage(program: &str) -> String {
    format!("Usage: {program} PORT BAUD\nExample: {program} /dev/ttyUSB0 57600")
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not a positive size"))
    }
}

/// Installs the global tracing subscriber, writing to stderr.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_missing_arguments_give_usage() {
        for argv in [vec!["slammin"], vec!["slammin", "/dev/ttyUSB0"]] {
            match parse_echo_args(argv).unwrap() {
                Invocation::Usage(text) => {
                    assert!(text.starts_with("Usage: slammin PORT BAUD"));
                    assert!(text.contains("/dev/ttyUSB0 57600"));
                }
                other => panic!("expected usage, got {:?}", other),
            }
        }
    }
    
    #[test]
    fn test_full_arguments_parse() {
        let invocation = parse_echo_args(["slammin", "/dev/ttyACM0", "115200", "--attitude"]).unwrap();
        let Invocation::Run(args) = invocation else {
            panic!("expected run");
        };
        assert_eq!(args.port, "/dev/ttyACM0");
        assert_eq!(args.baud, 115200);
        assert!(args.attitude);
        assert!(!args.simulate);
    }
    
    #[test]
    fn test_bad_baud_is_a_clap_error() {
        let err = parse_echo_args(["slammin", "/dev/ttyUSB0", "fast"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
    
    #[test]
    fn test_vis_defaults() {
        let args = VisArgs::try_parse_from(["slamvis"]).unwrap();
        assert_eq!(args.map_size, 300.0);
        assert_eq!(args.obstacle_size, 10.0);
        assert_eq!(args.vehicle_size, 25.0);
        assert_eq!(args.frames, None);
    }
    
    #[test]
    fn test_vis_rejects_non_positive_sizes() {
        assert!(VisArgs::try_parse_from(["slamvis", "--map-size", "0"]).is_err());
        assert!(VisArgs::try_parse_from(["slamvis", "--obstacle-size", "-3"]).is_err());
    }
}
