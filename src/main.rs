use env_logger::Env;
use glyph_command_run::args::{Args, Mode};
#[cfg(feature = "screen-capture")]
use glyph_command_run::automation::XcapFrameSource;
use glyph_command_run::automation::{
    AutomationCommand, AutomationEvent, AutomationRunner, CommandKeyInjector, CommandSink,
    FrameSource, ImageFileSource, KeyInjector, LogKeyInjector, PngPreviewSink, RecognitionCycle,
    create_automation_channels,
};
use glyph_command_run::recognition::{CommandTable, RecognitionConfig, Recognizer};
use std::process::ExitCode;
use tokio::time::{Duration, sleep};

fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };
    init_logging(args.debug_mode);

    let Some(cycle) = build_cycle(&args) else {
        return ExitCode::FAILURE;
    };

    match args.mode {
        Mode::Once => run_once(cycle),
        Mode::Watch => run_watch(cycle, &args),
    }
}

fn init_logging(debug_mode: bool) {
    let default_level = if debug_mode { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn frame_source(args: &Args) -> Option<Box<dyn FrameSource>> {
    if let Some(path) = args.source.as_ref() {
        println!("🖼️ Reading frames from {}", path.display());
        return Some(Box::new(ImageFileSource::new(path)));
    }

    #[cfg(feature = "screen-capture")]
    {
        println!("🖥️ Capturing monitor {}", args.monitor);
        Some(Box::new(XcapFrameSource::new(args.monitor)))
    }
    #[cfg(not(feature = "screen-capture"))]
    {
        eprintln!(
            "❌ No --source=FILE given and live capture of monitor {} needs the 'screen-capture' feature",
            args.monitor
        );
        None
    }
}

fn build_cycle(args: &Args) -> Option<RecognitionCycle> {
    let source = frame_source(args)?;

    let mut config = RecognitionConfig {
        use_edges: args.use_edges,
        ..RecognitionConfig::default()
    };
    config = match config.with_threshold(args.threshold) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return None;
        }
    };

    let (recognizer, skipped) =
        match Recognizer::from_directory(&args.templates_dir, config, CommandTable::default()) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("❌ {}", e);
                return None;
            }
        };
    for skip in &skipped {
        println!("⚠️ Skipped {}: {}", skip.path.display(), skip.reason);
    }
    println!(
        "📚 Loaded {} templates from {}: {}",
        recognizer.templates().len(),
        args.templates_dir.display(),
        recognizer.templates().names().join(", ")
    );

    let injector: Box<dyn KeyInjector> = match args.key_command.as_deref() {
        Some(command_line) => match CommandKeyInjector::from_command_line(command_line) {
            Ok(injector) => Box::new(injector),
            Err(e) => {
                eprintln!("❌ {}", e);
                return None;
            }
        },
        None => Box::new(LogKeyInjector),
    };
    if args.send_keys && args.key_command.is_none() {
        println!("⌨️ No --key-command given, keys are only logged");
    }

    let mut cycle = RecognitionCycle::new(
        recognizer,
        source,
        args.region,
        CommandSink::new(injector, args.send_keys),
    );
    if let Some(preview) = args.preview.as_ref() {
        cycle = cycle.with_preview(Box::new(PngPreviewSink::new(preview)));
    }
    Some(cycle)
}

fn run_once(mut cycle: RecognitionCycle) -> ExitCode {
    let outcome = cycle.run_once();
    println!("🔍 {}", outcome);
    ExitCode::SUCCESS
}

fn run_watch(cycle: RecognitionCycle, args: &Args) -> ExitCode {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let timeout_secs = args.timeout_secs;
    rt.block_on(async move {
        let (control, endpoints) = create_automation_channels();
        let (cmd_tx, mut event_rx) = (control.commands, control.events);
        let mut runner = AutomationRunner::new(cycle, args.interval_ms, endpoints);
        let runner_handle = tokio::spawn(async move { runner.run().await });

        if cmd_tx.send(AutomationCommand::Start).await.is_err() {
            eprintln!("❌ Recognition loop exited before start");
            return ExitCode::FAILURE;
        }

        if let Some(secs) = timeout_secs {
            println!("⏰ Exiting after {} seconds", secs);
            let shutdown_tx = cmd_tx.clone();
            tokio::spawn(async move {
                sleep(Duration::from_secs(secs)).await;
                let _ = shutdown_tx.send(AutomationCommand::Shutdown).await;
            });
        }

        while let Some(event) = event_rx.recv().await {
            match event {
                AutomationEvent::StateChanged(state) => println!("🎮 State: {:?}", state),
                AutomationEvent::CycleCompleted(outcome) => println!("🔍 {}", outcome),
                AutomationEvent::IntervalUpdated(ms) => println!("⏱️ Interval: {}ms", ms),
                AutomationEvent::Error(message) => eprintln!("❌ {}", message),
            }
        }

        if let Err(e) = runner_handle.await {
            eprintln!("❌ Recognition loop failed: {}", e);
            return ExitCode::FAILURE;
        }
        ExitCode::SUCCESS
    })
}
