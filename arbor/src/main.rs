use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use arbor_core::audit::{AuditConfig, audit_page, audit_site, generate_sitemap};
use arbor_core::axe::CommandEvaluator;
use arbor_core::finding::AuditType;
use arbor_core::site::{Grouping, Site, SiteOptions};
use arbor_scanner::crawler::{CrawlConfig, ProgressCallback};
use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use indicatif::{ProgressBar, ProgressStyle};

mod commands;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    if !quiet {
        print_banner();
    }

    let outcome = match chosen_command.subcommand() {
        Some(("audit", primary_command)) => handle_audit(primary_command, quiet).await,
        Some(("sitemap", primary_command)) => handle_sitemap(primary_command, quiet).await,
        None => {
            command_argument_builder()
                .print_help()
                .expect("failed to print help");
            Ok(())
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

// Handler functions

async fn handle_audit(args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    // Invalid audit types are fatal before any crawling or auditing starts.
    let audit_type = AuditType::parse(args.get_one::<String>("audit-type").map(String::as_str))?;

    let grouping = if args.get_flag("no-templates") {
        Grouping::Pages
    } else {
        Grouping::Templates
    };

    let options = SiteOptions {
        audit_type,
        grouping,
        output_dir: output_dir(args),
    };

    let domain_or_url = args.get_one::<String>("DOMAIN_OR_URL").expect("required arg");
    let site = Site::from_domain_or_url(domain_or_url, options).await?;

    let evaluator_cmd = args.get_one::<String>("evaluator").expect("defaulted arg");
    let evaluator = CommandEvaluator::new(evaluator_cmd)?;

    if args.get_flag("crawl") {
        let threads = *args.get_one::<usize>("threads").expect("defaulted arg");
        let (spinner, progress_callback) = crawl_progress(quiet);

        let config = AuditConfig {
            crawl: crawl_config(args),
            evaluation_concurrency: threads,
            progress_callback,
        };

        let audit = audit_site(&site, &evaluator, &config).await?;

        if let Some(spinner) = spinner {
            spinner.finish_with_message(format!("Crawl complete! {} pages found", audit.pages.len()));
        }

        audit.write_violations_csv()?;
        println!("{}", audit.summary());
    } else {
        let audit = audit_page(&site, &evaluator).await?;
        audit.write_violations_csv()?;
        println!("{}", audit.summary());
    }

    Ok(())
}

async fn handle_sitemap(args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let options = SiteOptions {
        output_dir: output_dir(args),
        ..SiteOptions::default()
    };

    let domain_or_url = args.get_one::<String>("DOMAIN_OR_URL").expect("required arg");
    let site = Site::from_domain_or_url(domain_or_url, options).await?;

    let started = std::time::Instant::now();
    let (spinner, progress_callback) = crawl_progress(quiet);

    let (path, urls) = generate_sitemap(&site, &crawl_config(args), progress_callback).await?;

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Crawl complete! {} pages found", urls.len()));
    }

    println!("Generated sitemap: {}", path.display().to_string().bright_white());
    println!("Runtime: {:.1}s", started.elapsed().as_secs_f64());

    Ok(())
}

// Helpers

fn crawl_config(args: &ArgMatches) -> CrawlConfig {
    CrawlConfig {
        workers: *args.get_one::<usize>("threads").expect("defaulted arg"),
        crawl_timeout: Duration::from_secs(*args.get_one::<u64>("timeout").expect("defaulted arg")),
        ..CrawlConfig::default()
    }
}

fn output_dir(args: &ArgMatches) -> PathBuf {
    let raw = args.get_one::<String>("output-dir").expect("defaulted arg");
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Spinner plus per-URL progress callback for the crawl phase. Disabled in
/// quiet mode.
fn crawl_progress(quiet: bool) -> (Option<ProgressBar>, Option<ProgressCallback>) {
    if quiet {
        return (None, None);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("Starting crawl...");

    let processed_count = Arc::new(AtomicUsize::new(0));
    let spinner_clone = spinner.clone();
    let callback: ProgressCallback = Arc::new(move |_worker_id: usize, _url: String| {
        let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
        spinner_clone.set_message(format!("Crawling... {} URLs processed", count));
        spinner_clone.tick();
    });

    (Some(spinner), Some(callback))
}

fn print_banner() {
    let banner = r#"
            _
   __ _ _ _| |__  ___ _ _
  / _` | '_| '_ \/ _ \ '_|
  \__,_|_| |_.__/\___/_|
"#;
    println!("{}", banner.bright_green());
    println!("{}", "  arbor - web accessibility auditor".bright_white().bold());
    println!();
}
