//! Lock-in demonstration binary.
//!
//! Reproduces the bench workflow: fetch both channels from one trigger,
//! shift channel 2 by the requested phase, mix the aligned pair and report
//! the lock-in output in millivolts. Optionally exports the acquired
//! channel-1 waveform to CSV.

use clap::Parser;

use scope_daq::config::Settings;
use scope_daq::error::ScopeResult;

/// Fetch TBS1000 waveforms and apply phase-shift math.
#[derive(Parser, Debug)]
#[command(name = "scope_daq", version, about)]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    config: Option<String>,

    /// Phase shift applied to channel 2, in degrees.
    #[arg(long, default_value_t = 180.0)]
    phase: f64,

    /// Reset and configure the scope before acquiring.
    #[arg(long)]
    setup: bool,

    /// Directory to write per-channel CSV files into.
    #[arg(long)]
    output_dir: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref())?;
    run(&cli, &settings)?;
    Ok(())
}

#[cfg(feature = "instrument_visa")]
fn run(cli: &Cli, settings: &Settings) -> ScopeResult<()> {
    use scope_daq::transport::VisaTransport;
    use scope_daq::waveform::{mix, TimeUnit};
    use scope_daq::{Channel, Tbs1000};

    let transport = VisaTransport::open(
        &settings.instrument.resource_string,
        settings.instrument.timeout_ms,
    )?;
    let mut scope = Tbs1000::new(transport);

    match scope.identify()? {
        Some(idn) => log::info!("Connected: {idn}"),
        None => {
            log::info!("Tektronix TBS scope is not connected!");
            return Ok(());
        }
    }

    if cli.setup {
        scope.configure(&settings.setup)?;
    }

    let Some([ch1, ch2]) = scope.acquire_both(TimeUnit::Milliseconds)? else {
        log::info!("Scope disconnected before acquisition");
        return Ok(());
    };

    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir)?;
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        for (channel, acquisition) in [(1, &ch1), (2, &ch2)] {
            let path = dir.join(format!("ch{channel}_{stamp}.csv"));
            scope_daq::storage::write_waveform_csv(&path, &acquisition.waveform)?;
        }
    }

    let aligned = scope.phase_shift(
        &ch1.waveform.time,
        &ch1.waveform.amplitude,
        &ch2.waveform.amplitude,
        ch1.total_time,
        cli.phase,
        Channel::Ch2,
    )?;
    let mixed = mix(&aligned.first, &aligned.second)?;
    let average_mv = 1000.0 * mixed.iter().sum::<f64>() / mixed.len().max(1) as f64;

    println!(
        "Lock-in output: {average_mv:.2} mV at {} deg ({} aligned samples)",
        cli.phase,
        mixed.len()
    );
    Ok(())
}

#[cfg(not(feature = "instrument_visa"))]
fn run(_cli: &Cli, _settings: &Settings) -> ScopeResult<()> {
    Err(scope_daq::ScopeError::FeatureNotEnabled(
        "instrument_visa".to_string(),
    ))
}
