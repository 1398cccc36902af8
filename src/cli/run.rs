// src/cli/run.rs — Commands: run the catalog, upgrade one book, show config

use serde::Serialize;

use super::progress::{render_metrics, terminal_progress};
use crate::core::book::Book;
use crate::core::collection::{Collection, ItemFailure};
use crate::core::coordinator::{Coordinator, DominationReport};
use crate::core::engine::UpgradeEngine;
use crate::core::types::{PipelineConfig, PublishOutcome, UpgradeOutcome};
use crate::infra::config::{Catalog, Config};

/// Options shared by every command, resolved from flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub threshold: Option<f32>,
    pub max_iterations: Option<i64>,
    pub quiet: bool,
    pub json: bool,
}

/// Apply CLI overrides on top of the config file and validate.
pub fn effective_pipeline(config: &Config, opts: &RunOptions) -> anyhow::Result<PipelineConfig> {
    let mut config = config.clone();
    if let Some(t) = opts.threshold {
        config.pipeline.threshold = t;
    }
    if let Some(n) = opts.max_iterations {
        config.pipeline.max_iterations = n;
    }
    Ok(config.pipeline()?)
}

fn build_engine(config: &Config, opts: &RunOptions) -> anyhow::Result<UpgradeEngine> {
    let engine = UpgradeEngine::new(effective_pipeline(config, opts)?)?;
    Ok(if opts.quiet {
        engine
    } else {
        engine.with_events(terminal_progress())
    })
}

/// Books used when the config has no `[[books]]` catalog.
pub fn demo_catalog() -> anyhow::Result<Vec<Book>> {
    Ok(vec![
        Book::new("The Lighthouse Keeper", "Marta Rossi")?,
        Book::children("Little Cloud Learns to Rain", "Gino Bianchi", 5)?,
        Book::topical("Beneath the Waves", "Lia Verdi", "ocean life")?,
    ])
}

/// The configured catalog, or the demo books when none is configured.
pub fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    if config.books.is_empty() {
        tracing::debug!("No catalog configured, using demo books");
        return Ok(Catalog {
            books: demo_catalog()?,
            rejected: Vec::new(),
        });
    }
    Ok(config.catalog())
}

#[derive(Serialize)]
struct CatalogReport<'a> {
    rejected: &'a [ItemFailure],
    #[serde(flatten)]
    run: &'a DominationReport,
}

/// Upgrade, measure, publish and re-measure the whole catalog.
pub fn run_catalog(config: &Config, opts: &RunOptions) -> anyhow::Result<()> {
    let engine = build_engine(config, opts)?;
    let catalog = load_catalog(config)?;

    let books: Collection = catalog.books.into_iter().collect();
    let mut coordinator = Coordinator::new(engine, books);
    let report = coordinator.dominate();

    if opts.json {
        let body = CatalogReport {
            rejected: &catalog.rejected,
            run: &report,
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for entry in &catalog.rejected {
            println!(
                "catalog entry {} ({}): REJECTED {}",
                entry.index, entry.title, entry.error
            );
        }
        print_report(&report);
    }
    Ok(())
}

#[derive(Serialize)]
struct SingleReport<'a> {
    upgrade: &'a UpgradeOutcome,
    publish: PublishOutcome,
    book: &'a Book,
}

/// Upgrade one book and try to publish it.
pub fn run_single(
    config: &Config,
    opts: &RunOptions,
    title: &str,
    author: &str,
    target_age: Option<u8>,
    topic: Option<&str>,
) -> anyhow::Result<()> {
    let mut engine = build_engine(config, opts)?;
    let mut book = match (target_age, topic) {
        (Some(age), _) => Book::children(title, author, age)?,
        (None, Some(topic)) => Book::topical(title, author, topic)?,
        (None, None) => Book::new(title, author)?,
    };

    let outcome = engine.upgrade(&mut book)?;
    let publish = engine.publish(&mut book);

    if opts.json {
        let body = SingleReport {
            upgrade: &outcome,
            publish,
            book: &book,
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_outcome(&outcome);
        println!("  publish: {}", publish);
    }
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn show_config(config: &Config, opts: &RunOptions) -> anyhow::Result<()> {
    let pipeline = effective_pipeline(config, opts)?;
    let mut effective = config.clone();
    effective.pipeline.threshold = pipeline.threshold;
    effective.pipeline.max_iterations = pipeline.max_iterations as i64;
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}

fn print_outcome(o: &UpgradeOutcome) {
    let progression: Vec<String> = o
        .quality_progression
        .iter()
        .map(|q| format!("{:.2}", q))
        .collect();
    println!(
        "{}: v{} {} quality={:.2}/10 after {} iteration(s)",
        o.title, o.version, o.status, o.final_quality, o.iterations
    );
    if !progression.is_empty() {
        println!("  progression: {}", progression.join(" -> "));
    }
    println!("  improvements: {}", o.categories.total());
    for step in &o.next_steps {
        println!("  next: {}", step);
    }
}

fn print_report(report: &DominationReport) {
    println!("== Upgrade ==");
    for outcome in &report.upgrade.outcomes {
        print_outcome(outcome);
    }
    for title in &report.upgrade.skipped {
        println!("{}: skipped (published)", title);
    }
    for failure in &report.upgrade.failures {
        println!("{}: FAILED {}", failure.title, failure.error);
    }
    println!("metrics: {}", render_metrics(&report.after_upgrade));

    println!("== Publish ==");
    if report.published.is_empty() {
        println!("nothing eligible");
    }
    for record in &report.published {
        println!("{}: {}", record.title, record.outcome);
    }
    println!("metrics: {}", render_metrics(&report.after_publish));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effective_pipeline_overrides() {
        let opts = RunOptions {
            threshold: Some(8.0),
            max_iterations: Some(3),
            ..Default::default()
        };
        let p = effective_pipeline(&Config::default(), &opts).unwrap();
        assert_eq!(p.threshold, 8.0);
        assert_eq!(p.max_iterations, 3);
    }

    #[test]
    fn test_effective_pipeline_rejects_negative() {
        let opts = RunOptions {
            max_iterations: Some(-1),
            ..Default::default()
        };
        assert!(effective_pipeline(&Config::default(), &opts).is_err());
    }

    #[test]
    fn test_demo_catalog_kinds() {
        let books = demo_catalog().unwrap();
        let labels: Vec<&str> = books.iter().map(|b| b.kind().label()).collect();
        assert_eq!(labels, vec!["standard", "children", "topical"]);
    }

    #[test]
    fn test_load_catalog_falls_back_to_demo() {
        let catalog = load_catalog(&Config::default()).unwrap();
        assert_eq!(catalog.books.len(), 3);
        assert!(catalog.rejected.is_empty());
    }

    #[test]
    fn test_run_catalog_survives_bad_entry() {
        let config: Config = toml::from_str(
            "[[books]]\ntitle = \"Orphan\"\n\n[[books]]\ntitle = \"Moon\"\nauthor = \"A\"\n",
        )
        .unwrap();
        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.books.len(), 1);
        assert_eq!(catalog.rejected.len(), 1);

        let opts = RunOptions {
            quiet: true,
            json: true,
            ..Default::default()
        };
        assert!(run_catalog(&config, &opts).is_ok());
    }

    #[test]
    fn test_run_catalog_quiet() {
        let opts = RunOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(run_catalog(&Config::default(), &opts).is_ok());
    }
}
