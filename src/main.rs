use chrono::{Local, Utc};
use clap::Parser;
use log::{error, info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::{thread, time};

use gas_index::algorithm::{
    DEFAULT_SAMPLING_INTERVAL, GATING_MAX_DURATION_MINUTES, INDEX_GAIN, INDEX_OFFSET_DEFAULT,
    SRAW_STD_INITIAL, TAU_MEAN_HOURS, TAU_VARIANCE_HOURS,
};
use gas_index::persistence::StateSnapshot;
use gas_index::replay::SampleReader;
use gas_index::{GasIndexAlgorithm, GasIndexError, TuningParameters};

const EXIT_CODE_SET_CTR_C_HNDLR_FAILED: u8 = 0x02;
const EXIT_CODE_INVALID_CONFIGURATION: u8 = 0x03;
const EXIT_CODE_INPUT_FAILED: u8 = 0x04;
const EXIT_CODE_STATE_FILE_FAILED: u8 = 0x05;

/// Replays SGP4x VOC raw samples through the gas index algorithm and prints `raw,index` lines.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    // -- raw sample file, stdin if absent or "-"
    input: Option<PathBuf>,
    #[arg(long, env = "GAS_INDEX_SAMPLING_INTERVAL", default_value_t = DEFAULT_SAMPLING_INTERVAL)]
    sampling_interval: f32,
    #[arg(long, env = "GAS_INDEX_OFFSET", default_value_t = INDEX_OFFSET_DEFAULT)]
    index_offset: f32,
    #[arg(long, env = "GAS_INDEX_LEARNING_TIME_OFFSET_HOURS", default_value_t = TAU_MEAN_HOURS)]
    learning_time_offset_hours: f32,
    #[arg(long, env = "GAS_INDEX_LEARNING_TIME_GAIN_HOURS", default_value_t = TAU_VARIANCE_HOURS)]
    learning_time_gain_hours: f32,
    #[arg(long, env = "GAS_INDEX_GATING_MAX_DURATION_MINUTES", default_value_t = GATING_MAX_DURATION_MINUTES)]
    gating_max_duration_minutes: f32,
    #[arg(long, env = "GAS_INDEX_STD_INITIAL", default_value_t = SRAW_STD_INITIAL)]
    std_initial: f32,
    #[arg(long, env = "GAS_INDEX_GAIN_FACTOR", default_value_t = INDEX_GAIN)]
    gain_factor: f32,
    // -- freeze baseline learning for the whole run
    #[arg(long, env = "GAS_INDEX_NO_CALIBRATING")]
    no_calibrating: bool,
    // -- resume from and save the learned baseline to this file
    #[arg(long, env = "GAS_INDEX_STATE_FILE")]
    state_file: Option<PathBuf>,
    // -- pace samples at the sampling interval
    #[arg(long, env = "GAS_INDEX_REALTIME")]
    realtime: bool,
}

fn open_input(input: &Option<PathBuf>) -> Result<Box<dyn BufRead>, io::Error> {
    match input {
        Some(path) if path.as_path() != Path::new("-") => {
            Ok(Box::new(BufReader::new(File::open(path)?)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn resume(algorithm: &mut GasIndexAlgorithm, state_file: &Path) -> Result<(), GasIndexError> {
    if !state_file.exists() {
        info!("No saved state at {}, starting with initial learning", state_file.display());
        return Ok(());
    }
    let snapshot = StateSnapshot::load(state_file)?;
    if snapshot.restore_into(algorithm, Utc::now())? {
        info!("Resumed from state saved at {}", snapshot.saved_at);
    }
    Ok(())
}

fn main() -> ExitCode {

    // -- read .env file
    dotenv::dotenv().ok();
    // -- setup logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let now = Local::now();
    info!("Starting up: {now}");

    let args = Args::parse();

    // -- set handler for Ctrl-C, the loop stops at the next sample and saves the state file.
    // -- A blocked read (interactive stdin) never reaches the next sample, so a second
    // -- Ctrl-C exits at once and the state file is NOT saved.
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = Arc::clone(&stop);
    if let Err(err) = ctrlc::set_handler(move || {
        if stop_handler.swap(true, Ordering::SeqCst) {
            warn!("Second Ctrl+C, exiting without saving state");
            std::process::exit(0);
        }
        info!("Received Ctrl+C, terminating...");
    }) {
        error!("ERROR - Failed to set Ctrl-C handler: {err}");
        return ExitCode::from(EXIT_CODE_SET_CTR_C_HNDLR_FAILED);
    }

    let tuning = TuningParameters::new(
        args.index_offset,
        args.learning_time_offset_hours,
        args.learning_time_gain_hours,
        args.gating_max_duration_minutes,
        args.std_initial,
        args.gain_factor,
    );
    let mut algorithm = match GasIndexAlgorithm::with_tuning(args.sampling_interval, tuning) {
        Ok(algorithm) => algorithm,
        Err(err) => {
            error!("ERROR - Invalid configuration: {err}");
            return ExitCode::from(EXIT_CODE_INVALID_CONFIGURATION);
        }
    };
    algorithm.set_calibrating(!args.no_calibrating);
    info!(
        "Sampling interval {}s, calibrating {}",
        algorithm.sampling_interval(),
        algorithm.is_calibrating()
    );

    if let Some(state_file) = &args.state_file {
        if let Err(err) = resume(&mut algorithm, state_file) {
            warn!("Failed to resume from {}: {err}", state_file.display());
        }
    }

    let reader = match open_input(&args.input) {
        Ok(reader) => reader,
        Err(err) => {
            error!("ERROR - Failed to open input: {err}");
            return ExitCode::from(EXIT_CODE_INPUT_FAILED);
        }
    };

    let mut exit_code = ExitCode::SUCCESS;
    let mut stdout = io::stdout().lock();
    let sample_delay = time::Duration::from_secs_f32(algorithm.sampling_interval());
    for sample in SampleReader::new(reader) {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let voc_raw = match sample {
            Ok(voc_raw) => voc_raw,
            Err(err @ GasIndexError::ParseSample { .. }) => {
                warn!("Skipping sample: {err}");
                continue;
            }
            Err(err) => {
                error!("ERROR - Failed to read input: {err}");
                exit_code = ExitCode::from(EXIT_CODE_INPUT_FAILED);
                break;
            }
        };
        let voc_index = algorithm.process(voc_raw);
        // -- a closed pipe ends the replay
        if writeln!(stdout, "{voc_raw},{voc_index}").is_err() {
            break;
        }
        if args.realtime {
            thread::sleep(sample_delay);
        }
    }

    if let Some(state_file) = &args.state_file {
        match StateSnapshot::capture(&algorithm, Utc::now()) {
            Some(snapshot) => {
                if let Err(err) = snapshot.save(state_file) {
                    error!("ERROR - Failed to save state to {}: {err}", state_file.display());
                    return ExitCode::from(EXIT_CODE_STATE_FILE_FAILED);
                }
                let (mean, std) = algorithm.states();
                info!("Saved baseline mean {mean}, std {std} to {}", state_file.display());
            }
            None => warn!("No baseline learned yet, state not saved"),
        }
    }

    exit_code
}
