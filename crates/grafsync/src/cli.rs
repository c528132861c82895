use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use grafsync::{ArtifactLayout, SettingsOverrides, SyncSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Export Grafana dashboards, data sources and alerts into a git-tracked tree.
#[derive(Debug, Parser)]
#[command(name = "grafsync", version, about)]
pub struct Cli {
    /// Base data directory holding `ini/` and every exported artifact
    #[arg(long, env = "GRAFSYNC_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Sections file [default: <data-dir>/ini/grafana.ini]
    #[arg(long)]
    pub sections_file: Option<PathBuf>,

    /// Base settings file [default: <data-dir>/ini/base.ini]
    #[arg(long)]
    pub base_file: Option<PathBuf>,

    /// Directory inside the git work tree to publish [default: <data-dir>]
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Where data sources and alerts go: per-section or shared
    #[arg(long)]
    pub layout: Option<ArtifactLayout>,

    /// Dashboards fetched in parallel per section
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Export only, skip commit and push
    #[arg(long)]
    pub no_push: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub report_json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logs
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn settings(&self) -> SyncSettings {
        let mut settings = SyncSettings::new(&self.data_dir);
        if let Some(path) = &self.sections_file {
            settings.sections_file = path.clone();
        }
        if let Some(path) = &self.base_file {
            settings.base_file = path.clone();
        }
        if let Some(path) = &self.repo {
            settings.repo_dir = path.clone();
        }
        settings.publish = !self.no_push;
        settings
    }

    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            layout: self.layout,
            concurrency: self.concurrency.map(usize::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_follow_data_dir() {
        let cli = Cli::parse_from(["grafsync", "--data-dir", "/srv/backup/data"]);
        let settings = cli.settings();
        assert_eq!(settings.sections_file, Path::new("/srv/backup/data/ini/grafana.ini"));
        assert_eq!(settings.repo_dir, Path::new("/srv/backup/data"));
        assert!(settings.publish);
        assert!(cli.overrides().layout.is_none());
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::parse_from([
            "grafsync",
            "--data-dir",
            "/data",
            "--repo",
            "/repo",
            "--layout",
            "shared",
            "--concurrency",
            "8",
            "--no-push",
            "-vv",
            "--log-format",
            "json",
        ]);
        let settings = cli.settings();
        assert_eq!(settings.repo_dir, Path::new("/repo"));
        assert!(!settings.publish);
        assert_eq!(cli.overrides().layout, Some(ArtifactLayout::Shared));
        assert_eq!(cli.overrides().concurrency, Some(8));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        assert!(Cli::try_parse_from(["grafsync", "--concurrency", "0"]).is_err());
    }
}
