use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use treectl::cli::commands::execute_command;
use treectl::cli::output;
use treectl::cli::Cli;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -v -v -v");
            LevelFilter::TRACE
        }
    };

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("ureq=warn".parse().unwrap_or_else(|_| level.into()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match level {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treectl::util::testing;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        testing::init_test_setup();
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn given_node_insert_args_when_parsing_then_direction_and_parent_set() {
        let cli = Cli::try_parse_from([
            "treectl", "node", "--tree", "3", "insert", "7", "--parent", "5", "--direction", "right",
        ])
        .expect("parse");
        match cli.command {
            Some(treectl::cli::Commands::Node { tree, command }) => {
                assert_eq!(tree, Some(3));
                match command {
                    treectl::cli::args::NodeCommands::Insert { value, parent, direction } => {
                        assert_eq!(value, "7");
                        assert_eq!(parent.as_deref(), Some("5"));
                        assert_eq!(direction, treectl::domain::Direction::Right);
                    }
                    other => panic!("unexpected command: {:?}", other),
                }
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
