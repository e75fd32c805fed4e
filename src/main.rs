mod cli;
mod error;
mod fmt;
mod parse;
mod reports;
mod schema;
mod settings;
mod sheet;

use clap::Parser;

use cli::{Cli, Commands, ReportCommands, TargetsCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Load { file } => cli::load::run(&file),
        Commands::Status => cli::status::run(),
        Commands::Check { file } => cli::check::run(file),
        Commands::Dump {
            file,
            month,
            company,
            branch,
            staff,
            from_date,
            to_date,
        } => cli::dump::run(file, month, company, branch, staff, from_date, to_date),
        Commands::Report { command } => match command {
            ReportCommands::Summary {
                file,
                month,
                company,
            } => cli::report::summary(file, month, company),
            ReportCommands::Flows {
                file,
                month,
                company,
            } => cli::report::flows(file, month, company),
            ReportCommands::Branches {
                file,
                month,
                branch,
                from_date,
                to_date,
            } => cli::report::branches(file, month, branch, from_date, to_date),
            ReportCommands::Rank {
                file,
                company,
                view,
                month,
                from_date,
                to_date,
            } => cli::report::rank(file, company, view, month, from_date, to_date),
            ReportCommands::Gainers {
                file,
                month,
                company,
            } => cli::report::gainers(file, month, company),
            ReportCommands::Targets {
                file,
                month,
                company,
            } => cli::report::targets(file, month, company),
            ReportCommands::Participation {
                file,
                month,
                company,
                staff,
            } => cli::report::participation(file, month, company, staff),
            ReportCommands::FreshOld {
                file,
                month,
                company,
            } => cli::report::fresh_old(file, month, company),
            ReportCommands::Staff { staff, file, month } => cli::report::staff(staff, file, month),
            ReportCommands::Resigned {
                file,
                month,
                company,
            } => cli::report::resigned(file, month, company),
            ReportCommands::Performers {
                file,
                month,
                min_net,
            } => cli::report::performers(file, month, min_net),
        },
        Commands::Targets { command } => match command {
            TargetsCommands::List => cli::targets::list(),
            TargetsCommands::Set { company, amount } => cli::targets::set(&company, amount),
            TargetsCommands::Unset { company } => cli::targets::unset(&company),
        },
        Commands::Demo { output } => cli::demo::run(output),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
