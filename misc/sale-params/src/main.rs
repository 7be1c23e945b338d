use anyhow::Result;
use clap::Parser;
use sale_params::*;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Start { config } => {
            println!("{}", cmd::start(&config)?);
            Ok(())
        },
        Commands::Allow { participants } => {
            println!("{}", cmd::allow(&participants)?);
            Ok(())
        },
        Commands::CloseEta { start } => cmd::print_close_eta(&start),
    }
}
