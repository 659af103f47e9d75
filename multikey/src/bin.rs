use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::filter::LevelFilter;

mod cli;
mod demo;

fn metrics_handle() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            multikey::stats::init();
            Some(handle)
        }
        Err(err) => {
            log::error!("could not install the metrics recorder: {err}");
            None
        }
    }
}

fn main() {
    let args = cli::read_args();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(args.log_level))
        .init();

    let metrics = if args.print_metrics {
        metrics_handle()
    } else {
        None
    };

    if !args.skip_walkthrough {
        if let Err(err) = demo::walkthrough() {
            log::error!("walkthrough failed: {err}");
        }
    }

    let config = args.workload_config();
    log::debug!("running workload {config:?}");
    let report = demo::workload::run(&config);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("could not serialize the report: {err}"),
        }
    } else {
        println!("{report}");
    }

    if let Some(handle) = metrics {
        println!("{}", handle.render());
    }

    if !report.consistent || !report.count_matches() || report.tally.inconsistent_views > 0 {
        log::error!("indexes disagree after the workload");
        std::process::exit(1);
    }
}
