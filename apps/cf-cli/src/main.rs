use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cf_app::{
    AppError, AppResult, CompareRequest, LoopMetrics, RunProgressEvent, RunRequest, RunStage,
    ScenarioSource, project_service, run_service,
};
use cf_core::mps_to_mph;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "CruiseFlow CLI - vehicle cruise control simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Scenario selection shared by the run-style commands.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct ScenarioArgs {
    /// Built-in preset name (see `presets`)
    #[arg(long)]
    preset: Option<String>,
    /// Path to a scenario YAML file
    scenario_path: Option<PathBuf>,
}

impl ScenarioArgs {
    fn source(&self) -> ScenarioSource<'_> {
        match (&self.preset, &self.scenario_path) {
            (Some(name), _) => ScenarioSource::Preset(name),
            (None, Some(path)) => ScenarioSource::File(path),
            (None, None) => unreachable!("clap requires --preset or a scenario path"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and parameters
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// List built-in scenarios
    Presets,
    /// Run a scenario and print loop metrics
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Also write the trace to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Compare tuning sets on one scenario
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Export a scenario's trace as CSV
    Export {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Presets => cmd_presets(),
        Commands::Run {
            scenario,
            csv,
            quiet,
        } => cmd_run(&scenario, csv.as_deref(), quiet),
        Commands::Compare { scenario } => cmd_compare(&scenario),
        Commands::Export { scenario, output } => cmd_export(&scenario, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    cf_app::compile_scenario(&scenario)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    Ok(())
}

fn cmd_presets() -> AppResult<()> {
    println!("Built-in scenarios:");
    for preset in project_service::list_presets() {
        println!(
            "  {:<20} {:>6.0} kg  {:>5.0} s  {} disturbance(s)  {}",
            preset.name,
            preset.mass_kg,
            preset.t_end_s,
            preset.disturbance_count,
            preset.description
        );
    }
    Ok(())
}

fn cmd_run(scenario: &ScenarioArgs, csv: Option<&Path>, quiet: bool) -> AppResult<()> {
    let request = RunRequest::new(scenario.source());

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let mut on_event = |event: RunProgressEvent| {
        let fraction = event
            .simulation
            .as_ref()
            .map(|s| s.fraction_complete)
            .unwrap_or(-1.0);
        let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
            || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event);
            if fraction >= 0.0 {
                last_fraction = fraction;
            }
            last_emit = Instant::now();
        }
    };
    let progress: Option<&mut dyn FnMut(RunProgressEvent)> =
        if quiet { None } else { Some(&mut on_event) };

    let result = run_service::run_scenario_with_progress(&request, None, progress);
    if !quiet {
        clear_progress_line();
    }

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            report_partial(&err, csv)?;
            return Err(err);
        }
    };

    println!(
        "✓ Scenario '{}' completed: {} steps",
        response.scenario.name, response.timing.steps
    );
    if let Some(last) = response.trace.last() {
        println!(
            "  Final speed: {:.2} m/s ({:.1} mph), target {:.2} m/s ({:.1} mph)",
            last.velocity,
            mps_to_mph(last.velocity),
            last.reference,
            mps_to_mph(last.reference)
        );
    }
    print_metrics(&response.metrics);
    print_timing_summary(&response.timing);

    if let Some(path) = csv {
        cf_app::write_csv(path, &response.trace.records)?;
        println!(
            "✓ Exported {} records to {}",
            response.trace.len(),
            path.display()
        );
    }
    Ok(())
}

/// Keep whatever a failed run produced.
fn report_partial(err: &AppError, csv: Option<&Path>) -> AppResult<()> {
    let partial = err.partial_records();
    if partial.is_empty() {
        return Ok(());
    }
    eprintln!("✗ Run stopped after {} records", partial.len());
    if let Some(path) = csv {
        cf_app::write_csv(path, partial)?;
        eprintln!("  Partial trace written to {}", path.display());
    }
    Ok(())
}

fn cmd_compare(scenario: &ScenarioArgs) -> AppResult<()> {
    let request = CompareRequest {
        source: scenario.source(),
        tunings: None,
        metrics: Default::default(),
    };
    let response = cf_app::compare_tunings(&request)?;

    println!("Tuning comparison for '{}':", response.scenario_name);
    println!(
        "  {:<14} {:>7} {:>7} {:>7} {:>10} {:>10} {:>10} {:>8}",
        "tuning", "kp", "ki", "kd", "final m/s", "rise90 s", "settle s", "sat %"
    );
    for report in &response.reports {
        let t = &report.tuning;
        match (&report.metrics, &report.error) {
            (Some(m), _) => println!(
                "  {:<14} {:>7} {:>7} {:>7} {:>10} {:>10} {:>10} {:>8}",
                t.name,
                t.kp,
                t.ki,
                t.kd,
                fmt_opt(report.final_speed, 2),
                fmt_opt(m.rise_time_90_s, 2),
                fmt_opt(m.settling_time_s, 2),
                fmt_opt(m.saturation_pct_upper, 1),
            ),
            (None, error) => println!(
                "  {:<14} {:>7} {:>7} {:>7}  failed after {} records: {}",
                t.name,
                t.kp,
                t.ki,
                t.kd,
                report.partial_records,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    println!("  Total: {:.3}s", response.total_time_s);
    Ok(())
}

fn cmd_export(scenario: &ScenarioArgs, output: Option<&Path>) -> AppResult<()> {
    let response = run_service::run_scenario(&RunRequest::new(scenario.source()))?;

    if let Some(path) = output {
        cf_app::write_csv(path, &response.trace.records)?;
        println!(
            "✓ Exported {} records to {}",
            response.trace.len(),
            path.display()
        );
    } else {
        print!("{}", cf_app::trace_to_csv(&response.trace.records));
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn print_metrics(m: &LoopMetrics) {
    println!("\nLoop metrics:");
    println!("  Rise time 10%:   {} s", fmt_opt(m.rise_time_10_s, 2));
    println!("  Rise time 90%:   {} s", fmt_opt(m.rise_time_90_s, 2));
    println!("  Settling time:   {} s", fmt_opt(m.settling_time_s, 2));
    println!("  Overshoot:       {} %", fmt_opt(m.overshoot_pct, 2));
    println!("  Steady error:    {} m/s", fmt_opt(m.steady_state_error, 3));
    if let Some(mean) = m.final_mean_speed {
        println!(
            "  Final mean:      {:.2} m/s ({:.1} mph)",
            mean,
            mps_to_mph(mean)
        );
    }
    println!("  Max command:     {}", fmt_opt(m.max_command, 3));
    println!("  At upper limit:  {} %", fmt_opt(m.saturation_pct_upper, 1));
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.simulation) {
        (RunStage::Simulating, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.2}/{:.2}s  step={}/{}  elapsed={:.1}s",
                bar,
                s.fraction_complete * 100.0,
                s.sim_time_s,
                s.t_end_s,
                s.step,
                s.total_steps,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &cf_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let pct = |t: f64| 100.0 * t / total;

    println!("\nTiming summary:");
    println!("  Load:     {:.3}s ({:.1}%)", timing.load_time_s, pct(timing.load_time_s));
    println!(
        "  Compile:  {:.3}s ({:.1}%)",
        timing.compile_time_s,
        pct(timing.compile_time_s)
    );
    println!(
        "  Simulate: {:.3}s ({:.1}%)",
        timing.simulate_time_s,
        pct(timing.simulate_time_s)
    );
    println!(
        "  Metrics:  {:.3}s ({:.1}%)",
        timing.metrics_time_s,
        pct(timing.metrics_time_s)
    );
    println!("  Total:    {:.3}s", timing.total_time_s);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_requires_exactly_one_scenario() {
        assert!(Cli::try_parse_from(["cf-cli", "run"]).is_err());
        assert!(Cli::try_parse_from(["cf-cli", "run", "--preset", "hill", "hill.yaml"]).is_err());
    }

    #[test]
    fn preset_and_file_map_to_sources() {
        let cli = Cli::try_parse_from(["cf-cli", "compare", "--preset", "hill"]).unwrap();
        let Commands::Compare { scenario } = cli.command else {
            panic!("expected compare");
        };
        assert!(matches!(scenario.source(), ScenarioSource::Preset("hill")));

        let cli = Cli::try_parse_from(["cf-cli", "export", "trip.yaml", "-o", "out.csv"]).unwrap();
        let Commands::Export { scenario, output } = cli.command else {
            panic!("expected export");
        };
        assert!(matches!(scenario.source(), ScenarioSource::File(p) if p == Path::new("trip.yaml")));
        assert_eq!(output, Some(PathBuf::from("out.csv")));
    }
}
