use crate::report::DEFAULT_REPORT_FILE_NAME;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const MIN_UPLOAD_BYTES: usize = 1024;
const DEFAULT_TITLE: &str = "CloudTech SLA Analyzer";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_bind_address: SocketAddr,
    pub max_upload_bytes: usize,
    pub report_file_name: String,
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind_address: default_bind_address(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            report_file_name: DEFAULT_REPORT_FILE_NAME.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl ServerConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let file_config = if let Some(path) = args.config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            http_bind: file_http_bind,
            max_upload_bytes: file_max_upload_bytes,
            report_file_name: file_report_file_name,
            title: file_title,
        } = file_config;

        let http_bind_address = match args.http_bind.or(file_http_bind) {
            Some(addr) => addr,
            None => DEFAULT_HTTP_BIND
                .parse()
                .unwrap_or_else(|_| default_bind_address()),
        };

        let max_upload_bytes = args
            .max_upload_bytes
            .or(file_max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let report_file_name = args
            .report_file_name
            .clone()
            .or(file_report_file_name)
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| DEFAULT_REPORT_FILE_NAME.to_string());

        let title = args
            .title
            .clone()
            .or(file_title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Ok(Self {
            http_bind_address,
            max_upload_bytes,
            report_file_name,
            title,
        })
    }

    /// Fail-fast checks run before the server binds.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.max_upload_bytes >= MIN_UPLOAD_BYTES,
            "max upload size {} is below the minimum of {} bytes",
            self.max_upload_bytes,
            MIN_UPLOAD_BYTES
        );
        anyhow::ensure!(
            self.report_file_name.to_ascii_lowercase().ends_with(".xlsx"),
            "report file name {:?} must end with .xlsx",
            self.report_file_name
        );
        anyhow::ensure!(
            self.report_file_name.chars().all(|c| c.is_ascii_graphic() || c == ' '),
            "report file name {:?} must be printable ASCII",
            self.report_file_name
        );
        anyhow::ensure!(
            !self.report_file_name.contains(['/', '\\', '"']),
            "report file name {:?} must be a bare file name",
            self.report_file_name
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "sla-analyzer", about = "Ticket SLA compliance reports", version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SLA_ANALYZER_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address",
        global = true
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "SLA_ANALYZER_MAX_UPLOAD_BYTES",
        value_name = "BYTES",
        help = "Largest accepted upload",
        value_parser = clap::value_parser!(usize),
        global = true
    )]
    pub max_upload_bytes: Option<usize>,

    #[arg(
        long,
        env = "SLA_ANALYZER_REPORT_FILE_NAME",
        value_name = "NAME",
        help = "File name offered for the report download",
        global = true
    )]
    pub report_file_name: Option<String>,

    #[arg(
        long,
        env = "SLA_ANALYZER_TITLE",
        value_name = "TEXT",
        help = "Page title",
        global = true
    )]
    pub title: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve the upload form and API (default)
    Serve,
    /// Analyze one workbook and write the report and chart to disk
    Report {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    http_bind: Option<SocketAddr>,
    max_upload_bytes: Option<usize>,
    report_file_name: Option<String>,
    title: Option<String>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ServerConfig::from_args(&CliArgs::default()).unwrap();
        assert_eq!(config.http_bind_address, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.report_file_name, "CloudTech_SLA_Report.xlsx");
        config.validate().unwrap();
    }

    #[test]
    fn cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sla.yaml");
        fs::write(
            &path,
            "http_bind: 0.0.0.0:9000\nmax_upload_bytes: 4096\ntitle: Ops SLA\n",
        )
        .unwrap();

        let args = CliArgs {
            config: Some(path),
            max_upload_bytes: Some(8192),
            ..Default::default()
        };
        let config = ServerConfig::from_args(&args).unwrap();
        assert_eq!(config.http_bind_address, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.max_upload_bytes, 8192);
        assert_eq!(config.title, "Ops SLA");
    }

    #[test]
    fn json_config_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sla.json");
        fs::write(&path, r#"{"report_file_name": "weekly.xlsx"}"#).unwrap();
        let args = CliArgs {
            config: Some(path),
            ..Default::default()
        };
        let config = ServerConfig::from_args(&args).unwrap();
        assert_eq!(config.report_file_name, "weekly.xlsx");
    }

    #[test]
    fn rejects_unknown_config_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sla.yaml");
        fs::write(&path, "sla_hours: 48\n").unwrap();
        let args = CliArgs {
            config: Some(path),
            ..Default::default()
        };
        assert!(ServerConfig::from_args(&args).is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = ServerConfig {
            max_upload_bytes: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            report_file_name: "report.csv".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            report_file_name: "../escape.xlsx".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_names_unfit_for_a_header() {
        for name in ["Rapport_été.xlsx", "weekly\n.xlsx", "tab\there.xlsx"] {
            let config = ServerConfig {
                report_file_name: name.into(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{name:?}");
        }

        let config = ServerConfig {
            report_file_name: "Weekly SLA Report.xlsx".into(),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn parses_report_subcommand() {
        let args = CliArgs::try_parse_from(["sla-analyzer", "report", "tickets.xlsx", "--out", "out"])
            .unwrap();
        assert_eq!(
            args.command,
            Some(Command::Report {
                input: PathBuf::from("tickets.xlsx"),
                out: PathBuf::from("out"),
            })
        );
    }
}
