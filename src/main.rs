#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gradescale
//!
//! Command-line front-end for checking how scores grade against the
//! configured (or default) grading scale.
//!
//! Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `GRADESCALE_TABLE` and
//! `GRADESCALE_FETCH_TIMEOUT_SECS` from the environment or a `.env` file.

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use gradescale::{
    Classification, GradeResolver, GradingScale, ScaleProvider, StaticScaleProvider, config,
};
use tabled::{Table, settings::Style};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a single score
    Classify(f64, f64),
    /// Grade aggregate totals
    Overall(f64, f64),
    /// Print the active scale
    Scale,
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// Skip the store and use the built-in scale
    offline: bool,
    /// Print results as JSON
    json:    bool,
    /// Subcommand to run
    cmd:     Cmd,
}

/// Parse the command line arguments and return an `Opts`
fn options() -> Opts {
    parser().run()
}

/// Builds the command line parser
fn parser() -> OptionParser<Opts> {
    /// parses the marks obtained
    fn marks(name: &'static str) -> impl Parser<f64> {
        positional(name).help("Marks obtained")
    }

    /// parses the maximum marks
    fn max(name: &'static str) -> impl Parser<f64> {
        positional(name).help("Maximum marks possible")
    }

    let offline = long("offline")
        .help("Use the built-in grading scale instead of fetching it")
        .switch();

    let json = long("json").help("Print results as JSON").switch();

    let marks_obtained = marks("MARKS");
    let max_marks = max("MAX_MARKS");
    let classify = construct!(Cmd::Classify(marks_obtained, max_marks))
        .to_options()
        .command("classify")
        .help("Grade a single score");

    let total = marks("TOTAL");
    let total_max = max("TOTAL_MAX");
    let overall = construct!(Cmd::Overall(total, total_max))
        .to_options()
        .command("overall")
        .help("Grade aggregate totals across subjects");

    let scale = pure(Cmd::Scale)
        .to_options()
        .command("scale")
        .help("Print the active grading scale and any issues with it");

    let cmd = construct!([classify, overall, scale]);

    construct!(Opts { offline, json, cmd })
        .to_options()
        .descr("Resolve scores to letter grades")
}

/// Prints a classification, noting when the last-band fallback applied.
fn report(c: &Classification, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(c)?);
        return Ok(());
    }
    println!("{c}");
    if c.matched == gradescale::BandMatch::FallbackToLast {
        eprintln!("note: no band contained this percentage; the last band was used");
    }
    Ok(())
}

/// Runs the selected subcommand against `resolver`.
async fn run<P: ScaleProvider>(resolver: GradeResolver<P>, opts: Opts) -> Result<()> {
    match opts.cmd {
        Cmd::Classify(marks, max_marks) => {
            let c = resolver
                .classify(marks, max_marks)
                .await
                .with_context(|| format!("Could not grade {marks}/{max_marks}"))?;
            report(&c, opts.json)?;
        }
        Cmd::Overall(total, total_max) => {
            let c = resolver
                .overall_grade(total, total_max)
                .await
                .with_context(|| format!("Could not grade totals {total}/{total_max}"))?;
            report(&c, opts.json)?;
        }
        Cmd::Scale => {
            let scale = resolver.load_scale().await;
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&scale)?);
                return Ok(());
            }
            println!("{}", Table::new(scale.bands()).with(Style::modern()));
            for issue in scale.issues() {
                eprintln!("warning: {issue}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let opts = options();

    if opts.offline {
        run(GradeResolver::new(StaticScaleProvider::new(GradingScale::default_scale())), opts)
            .await
    } else {
        let cfg = config::ensure_initialized().context("Failed to load configuration")?;
        tracing::debug!("Reading grading scale from `{}`", cfg.scale_table());
        if !cfg.supabase_configured() {
            tracing::warn!(
                "SUPABASE_URL/SUPABASE_ANON_KEY are not set; grading with the default scale. Pass \
                 --offline to silence this."
            );
        }
        run(GradeResolver::from_config(), opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_flags() {
        let opts = parser()
            .run_inner(&["--offline", "classify", "80", "100"])
            .expect("classify parses");
        assert!(opts.offline);
        assert!(!opts.json);
        assert!(matches!(opts.cmd, Cmd::Classify(m, max) if m == 80.0 && max == 100.0));

        let opts = parser()
            .run_inner(&["--json", "overall", "455", "700"])
            .expect("overall parses");
        assert!(opts.json);
        assert!(matches!(opts.cmd, Cmd::Overall(t, max) if t == 455.0 && max == 700.0));

        let opts = parser().run_inner(&["scale"]).expect("scale parses");
        assert!(matches!(opts.cmd, Cmd::Scale));
    }

    #[test]
    fn classify_requires_both_scores() {
        assert!(parser().run_inner(&["classify", "80"]).is_err());
        assert!(parser().run_inner(&["classify", "eighty", "100"]).is_err());
    }
}
