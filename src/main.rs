use clap::Parser;
use sla_analyzer::utils::format_percent;
use sla_analyzer::{
    CliArgs, Command, LoggingConfig, ServerConfig, init_logging, run_server, write_report,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = ServerConfig::from_args(&cli)?;

    // Fail fast before binding or touching the filesystem
    config.validate()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Report { input, out } => {
            let output = write_report(&config, &input, &out)?;
            let summary = &output.analysis.summary;
            println!("{}", output.analysis.success_message());
            println!("Within 24h:  {}", summary.within_count);
            println!("Past 24h:    {}", summary.breached_count);
            println!("Avg Time:    {:.2}h", summary.average_elapsed_hours);
            println!("Compliance:  {}", format_percent(summary.compliance_rate));
            println!("Report:      {}", output.document_path.display());
            println!("Chart:       {}", output.chart_path.display());
            Ok(())
        }
    }
}
