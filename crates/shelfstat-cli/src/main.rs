//! `shelfstat`: library loan analytics from the command line.
//!
//! # Usage
//!
//! ```text
//! shelfstat --data-dir ./data departments
//! shelfstat report --department 기계공학과 --year 2024 --recency new
//! shelfstat --format json heatmap
//! ```

mod render;
mod settings;

use std::{io, path::PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use render::{JsonSink, TextSink};
use settings::Settings;
use shelfstat_core::{
  aggregate::Dimension,
  dataset::DatasetCache,
  recency::{RecencyBucket, RecencyReference},
  sink::Sink,
  subject::{CodeTableKind, LabelFormat},
  table::{Cell, Table},
  view::{Dashboard, TopN},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "shelfstat", version, about = "Library loan analytics")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "shelfstat.toml")]
  config: PathBuf,

  /// Directory holding loan_<year>.csv and book_meta.csv.
  #[arg(long, value_name = "DIR")]
  data_dir: Option<PathBuf>,

  /// Rows per ranking (3-10).
  #[arg(long)]
  top_n: Option<usize>,

  /// Call-number code table: digit or letter.
  #[arg(long)]
  code_table: Option<CodeTableKind>,

  /// Render subjects as codes or names.
  #[arg(long)]
  label: Option<LabelFormat>,

  /// Measure new/backlist against this fixed year.
  #[arg(long, conflicts_with = "loan_year_reference")]
  reference_year: Option<i32>,

  /// Measure new/backlist against each loan's own year.
  #[arg(long)]
  loan_year_reference: bool,

  #[arg(long, value_enum, default_value_t = Format::Text)]
  format: Format,

  #[command(subcommand)]
  command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
  Text,
  Json,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List departments passing the validity filter.
  Departments,

  /// Loan trend and rankings for one department.
  Report {
    #[arg(short, long)]
    department: String,

    /// Only this year; all years (newest first) when omitted.
    #[arg(long)]
    year: Option<i32>,

    /// Restrict the subject ranking to new or backlist titles.
    #[arg(long, requires = "year")]
    recency: Option<RecencyBucket>,

    /// Also rank titles inside this subject (code or name).
    #[arg(long, requires = "year")]
    subject: Option<String>,
  },

  /// Top authors or publishers of each year for one department.
  Contributors {
    #[arg(short, long)]
    department: String,

    /// `author` or `publisher`.
    #[arg(long, default_value = "author")]
    by: Dimension,
  },

  /// Loan counts per department and subject.
  Heatmap,

  /// Department/subject pairs with almost no loans.
  Sparse {
    #[arg(long)]
    threshold: Option<usize>,
  },

  /// Loan and return totals by patron category.
  Checkout {
    #[arg(long)]
    institution: Option<String>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = apply_overrides(Settings::load(&cli.config)?, &cli)?;

  let cache = DatasetCache::new(settings.source(), settings.classifier());
  let dataset = cache
    .get()
    .with_context(|| format!("failed to load data from {:?}", settings.data_dir))?;
  for skipped in dataset.skipped_years() {
    tracing::warn!(year = skipped.year, reason = %skipped.reason, "year missing from dataset");
  }
  let dashboard = Dashboard::new(dataset, settings.view_settings());

  let stdout = io::stdout().lock();
  match cli.format {
    Format::Text => run(&dashboard, cli.command, &mut TextSink::new(stdout)),
    Format::Json => run(&dashboard, cli.command, &mut JsonSink::new(stdout)),
  }
}

/// CLI flags override the config file, which overrides defaults.
fn apply_overrides(mut settings: Settings, cli: &Cli) -> Result<Settings> {
  if let Some(dir) = &cli.data_dir {
    settings.data_dir = dir.clone();
  }
  if let Some(n) = cli.top_n {
    settings.top_n = TopN::new(n)?;
  }
  if let Some(kind) = cli.code_table {
    settings.code_table = kind;
  }
  if let Some(label) = cli.label {
    settings.label = label;
  }
  if let Some(year) = cli.reference_year {
    settings.reference = RecencyReference::Fixed { year };
  }
  if cli.loan_year_reference {
    settings.reference = RecencyReference::LoanYear;
  }
  if let Command::Sparse {
    threshold: Some(threshold),
  } = cli.command
  {
    settings.sparse_threshold = threshold;
  }
  Ok(settings)
}

fn run<K: Sink>(dashboard: &Dashboard, command: Command, sink: &mut K) -> Result<()> {
  match command {
    Command::Departments => {
      let mut table = Table::new("departments", &["department"]);
      table.rows = dashboard
        .departments()
        .into_iter()
        .map(|d| vec![Cell::from(d)])
        .collect();
      emit(sink, &table)?;
    }

    Command::Report {
      department,
      year,
      recency,
      subject,
    } => {
      if dashboard.years(&department).is_empty() {
        bail!("no loans recorded for department {department:?}");
      }
      let Some(year) = year else {
        let failures = dashboard.emit_report(&department, sink)?;
        for failure in &failures {
          tracing::error!(year = failure.year, error = %failure.error, "year omitted from report");
        }
        return Ok(());
      };

      emit(sink, &dashboard.top_titles(&department, year))?;
      emit(sink, &dashboard.subject_ranking(&department, year, recency))?;
      if let Some(subject) = subject {
        let code_table = dashboard.settings().labeller.code_table;
        let Some(bucket) = code_table.parse_label(&subject) else {
          bail!("unknown subject {subject:?}");
        };
        emit(
          sink,
          &dashboard.top_titles_in_subject(&department, year, recency, bucket),
        )?;
      }
    }

    Command::Contributors { department, by } => {
      if !matches!(by, Dimension::Author | Dimension::Publisher) {
        bail!("--by must be author or publisher, got {by}");
      }
      emit(sink, &dashboard.top_per_year(&department, by))?;
    }

    Command::Heatmap => emit(sink, &dashboard.subject_heatmap())?,

    Command::Sparse { .. } => emit(sink, &dashboard.sparse())?,

    Command::Checkout { institution } => {
      if dashboard.dataset().checkouts().is_empty() {
        tracing::warn!("no loan/return statistics loaded");
      }
      emit(sink, &dashboard.checkout_summary(institution.as_deref()))?;
    }
  }

  Ok(())
}

fn emit<K: Sink>(sink: &mut K, table: &Table) -> Result<()> {
  sink
    .emit(table)
    .with_context(|| format!("failed to write table {:?}", table.title))
}
