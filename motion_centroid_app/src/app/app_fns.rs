use std::error::Error;

use motion_centroid::*;
use serde_json::json;

use crate::app::sinks::DirSink;
use crate::app::sources::ImageDirSource;
use crate::app::stop::AppStop;
use crate::app::*;

// * read cfg
// * open frame source and sink
// * run the frame pair loop, printing each centroid
// * report the run summary

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    cfg.pipeline
        .validate()
        .map_err(|e| eyre::Report::new(AppError::Pipeline(e.into())))?;

    let mut sink: Box<dyn FrameSink> = match &cfg.output_cfg.images_dir {
        Some(dir) => Box::new(DirSink::new(dir)?),
        None => Box::new(NullSink),
    };

    let mut stop = AppStop::new(&cfg.stop_cfg);
    let format = cfg.output_cfg.format;
    let on_pair = |idx: u64, report: &FramePairReport| print_pair(format, idx, report);

    let summary = match &cfg.source_cfg {
        SourceCfg::Images(dir) => {
            let source = ImageDirSource::new(dir)?;
            run(source, sink.as_mut(), &mut stop, cfg.pipeline, on_pair)
        }

        #[cfg(feature = "gstreamer_backend")]
        source_cfg @ (SourceCfg::Video(_) | SourceCfg::Camera(_)) => {
            let source = crate::app::sources::CaptureSource::open(source_cfg)?;
            run(source, sink.as_mut(), &mut stop, cfg.pipeline, on_pair)
        }

        #[cfg(not(feature = "gstreamer_backend"))]
        SourceCfg::Video(_) | SourceCfg::Camera(_) => {
            return Err(eyre::Report::msg(
                "video and camera input require the gstreamer_backend feature",
            ))
        }
    }
    .map_err(AppError::from)?;

    debug!("{summary:?}");

    Ok(())
}

fn print_pair(format: OutputFormat, idx: u64, report: &FramePairReport) {
    let line = format_pair(format, idx, report);

    #[allow(clippy::print_stdout)]
    let () = println!("{line}");
}

fn format_pair(format: OutputFormat, idx: u64, report: &FramePairReport) -> String {
    match format {
        OutputFormat::Text => match report.motion.centroid() {
            Some(c) => format!(
                "pair {idx}: centre ({:.1}, {:.1}), {} regions, score {:.4}",
                c.x,
                c.y,
                report.regions.len(),
                report.score
            ),
            None => format!("pair {idx}: no motion, score {:.4}", report.score),
        },
        OutputFormat::Json => json!({
            "pair": idx,
            "score": report.score,
            "threshold": report.change_mask.threshold(),
            "regions": report.regions,
            "centroid": report.motion.centroid(),
        })
        .to_string(),
    }
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_target_level(LevelFilter::Error);

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}
