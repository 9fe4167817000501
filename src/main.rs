use clap::Parser;
use glo_stim::config::mtrain::MtrainParams;
use glo_stim::core::ConfigProvider;
use glo_stim::domain::model::{MonitorSpec, SessionPlan};
use glo_stim::utils::{logger, validation::Validate};
use glo_stim::{
    BundleRunner, CliConfig, FileSequenceSource, LocalStorage, SessionConfig, SessionEngine,
    StimError, StimulusPipeline,
};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting glo-stim");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli) {
        tracing::error!(
            "❌ Session build failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = e.severity().exit_code();

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: &CliConfig) -> Result<(), StimError> {
    tracing::info!("📁 Loading session configuration from: {}", cli.config);
    let mut config = SessionConfig::from_file(&cli.config)?;

    let params = MtrainParams::load_or_default(cli.params_path.as_deref())?;
    config.apply_mtrain(&params);

    if let Some(output_path) = &cli.output_path {
        config.output.output_path = output_path.clone();
    }

    config.validate()?;
    tracing::info!("✅ Session configuration loaded and validated");

    let session_id = cli
        .session_id
        .clone()
        .unwrap_or_else(|| format!("session_{}", chrono::Local::now().format("%Y%m%d_%H%M%S")));

    let source = FileSequenceSource::new(LocalStorage::new(config.data_folder().to_string()));
    let runner = BundleRunner::new(
        LocalStorage::new(config.output_path().to_string()),
        config.output_path().to_string(),
    )
    .with_compression(config.compression().cloned());

    let pipeline = StimulusPipeline::new(source, runner, config, session_id.clone());
    let engine = SessionEngine::new(pipeline);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the session will not be handed off");
        let plan = engine.plan()?;
        display_plan_summary(&plan);
        return Ok(());
    }

    let location = engine.run()?;

    println!("✅ Session {} built successfully!", session_id);
    println!("📁 Output saved to: {}", location);

    Ok(())
}

fn display_plan_summary(plan: &SessionPlan) {
    println!("📋 Session Summary:");
    println!("  Name: {}", plan.name);
    println!("  Session ID: {}", plan.session_id);

    match &plan.window.monitor {
        MonitorSpec::Custom {
            name,
            distance_cm,
            width_cm,
        } => println!(
            "  Monitor: {} ({} cm wide, {} cm away)",
            name, width_cm, distance_cm
        ),
        MonitorSpec::Calibrated { name } => println!("  Monitor: {} (calibrated)", name),
    }
    println!(
        "  Screen: {} fullscreen={} warp={:?}",
        plan.window.screen, plan.window.fullscreen, plan.window.warp
    );
    println!(
        "  Sync pulse: {} (port {}, lines {:?})",
        plan.sync.syncpulse, plan.sync.syncpulseport, plan.sync.syncpulselines
    );
    println!();

    println!("📝 Stimuli:");
    for (index, stimulus) in plan.stimuli.iter().enumerate() {
        println!(
            "  {}. {} ({:?}) - {} sweeps x {} run(s)",
            index + 1,
            stimulus.name,
            stimulus.kind,
            stimulus.condition_count(),
            stimulus.runs
        );
        for window in &stimulus.display_sequence {
            println!(
                "     {:.3}s -> {:.3}s ({:.3} min)",
                window.start,
                window.end,
                window.duration() / 60.0
            );
        }
    }
    println!();
    println!(
        "⏱️ Total duration: {:.3} min",
        plan.total_duration / 60.0
    );
}
