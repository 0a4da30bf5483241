use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap_cargo::style::CLAP_STYLING;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("arbor")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("arbor")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Audit a page (or, with --crawl, a full site) for accessibility \
                    violations and print a summary.",
                )
                .arg(
                    arg!([DOMAIN_OR_URL])
                        .required(true)
                        .help("Domain or URL to audit"),
                )
                .arg(
                    arg!(-c --"crawl" "Crawl all in-scope links from the target and audit every page")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"audit-type" <TYPE>)
                        .required(false)
                        .help("Restrict the report to 'design' or 'code' findings"),
                )
                .arg(
                    arg!(--"no-templates")
                        .required(false)
                        .help("Group violations by page rather than by URL-path template")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' used for crawling and evaluation.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Global crawl deadline; a partial sitemap is emitted when it elapses.")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("300"),
                )
                .arg(
                    arg!(-o --"output-dir" <DIR>)
                        .required(false)
                        .help("Directory for sitemaps and violation CSVs")
                        .default_value("./audits"),
                )
                .arg(
                    arg!(--"evaluator" <CMD>)
                        .required(false)
                        .help(
                            "External axe-compatible command; invoked with the page URL appended \
                            and expected to print axe JSON on stdout",
                        )
                        .default_value("axe --stdout"),
                ),
        )
        .subcommand(
            command!("sitemap")
                .about("Crawl the given domain or URL and persist its sitemap.")
                .arg(
                    arg!([DOMAIN_OR_URL])
                        .required(true)
                        .help("Domain or URL to crawl"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async crawl workers.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Global crawl deadline; a partial sitemap is emitted when it elapses.")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("300"),
                )
                .arg(
                    arg!(-o --"output-dir" <DIR>)
                        .required(false)
                        .help("Directory for sitemaps and violation CSVs")
                        .default_value("./audits"),
                ),
        )
}
