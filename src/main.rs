use clap::Parser;
use sealed_envelope::cli::{init_logging, load_settings, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself; logging
    // just falls back to its default level.
    let log_level = load_settings(&cli)
        .map(|s| s.log_level)
        .unwrap_or_else(|_| "warn".to_string());
    init_logging(&log_level);

    let result = match cli.command {
        Commands::Seal {
            ref input,
            ref output,
            ref expires_in,
        } => sealed_envelope::cli::commands::seal::execute(
            &cli,
            input,
            output.as_deref(),
            expires_in.as_deref(),
        ),
        Commands::Open {
            ref input,
            ref output,
        } => sealed_envelope::cli::commands::open::execute(&cli, input, output.as_deref()),
        Commands::Inspect { ref input } => {
            sealed_envelope::cli::commands::inspect::execute(&cli, input)
        }
        Commands::Keygen { ref path } => {
            sealed_envelope::cli::commands::keygen::execute(&cli, path.as_deref())
        }
        Commands::Completions { ref shell } => {
            sealed_envelope::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        sealed_envelope::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
