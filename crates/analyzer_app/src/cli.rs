use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use analyzer_engine::{ClientSettings, DEFAULT_API_BASE_URL};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "resume-analyzer",
    version,
    about = "Upload a resume to the analysis API and render the returned report"
)]
pub struct Cli {
    /// Resume to analyze (PDF)
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Job description to compare the resume against
    #[arg(short, long, conflicts_with = "job_description_file")]
    pub job_description: Option<String>,

    /// Read the job description from a file ("-" reads stdin)
    #[arg(long)]
    pub job_description_file: Option<PathBuf>,

    /// Base URL of the analysis API
    #[arg(long, env = "RESUME_ANALYZER_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    /// Connection establishment timeout
    #[arg(long, default_value = "10s")]
    pub connect_timeout: humantime::Duration,

    /// Overall request deadline (unlimited when omitted)
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Print the report as raw markdown instead of styled text
    #[arg(long)]
    pub plain: bool,

    /// Only check that the API is reachable, then exit
    #[arg(long)]
    pub check: bool,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// ANSI-styled via termimad.
    Styled,
    /// Laid out by termimad, no escape sequences.
    Unstyled,
    /// The markdown exactly as received.
    Raw,
}

impl Cli {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            connect_timeout: self.connect_timeout.into(),
            request_timeout: self.timeout.map(Into::into),
            ..ClientSettings::with_base_url(self.api_url.clone())
        }
    }

    pub fn report_style(&self) -> ReportStyle {
        if self.plain {
            ReportStyle::Raw
        } else if std::io::stdout().is_terminal() {
            ReportStyle::Styled
        } else {
            ReportStyle::Unstyled
        }
    }

    /// The job description from whichever source was given, verbatim.
    pub fn job_description_text(&self) -> Result<Option<String>> {
        if let Some(text) = &self.job_description {
            return Ok(Some(text.clone()));
        }
        let Some(path) = &self.job_description_file else {
            return Ok(None);
        };
        if path.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read job description from stdin")?;
            return Ok(Some(text));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read job description {}", path.display()))?;
        Ok(Some(text))
    }
}
