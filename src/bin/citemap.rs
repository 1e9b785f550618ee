//! CLI binary for citemap.
//!
//! Usage: citemap analyze "https://scholar.google.com/citations?user=XXXX"

#[cfg(feature = "cli")]
mod cli {
    use citemap::config::{parse_bind, parse_source, Config};
    use citemap::{demo_result, AnalysisOptions, AnalysisResult};
    use clap::{Parser, Subcommand};
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    #[command(name = "citemap", about = "Map where a scholar's citations come from", version)]
    struct Cli {
        /// Data source (openalex, semantic_scholar, google_scholar); overrides CITEMAP_DEFAULT_SOURCE
        #[arg(long, global = true)]
        source: Option<String>,

        /// Output format
        #[arg(long, global = true, default_value = "table")]
        output: OutputFormat,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Copy, clap::ValueEnum)]
    enum OutputFormat {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Start the HTTP API
        Serve {
            /// Bind address (overrides CITEMAP_BIND)
            #[arg(long)]
            bind: Option<String>,
        },
        /// Analyze a scholar from a profile URL, author id, or name
        Analyze {
            identifier: String,
            /// Publications to inspect, most cited first
            #[arg(long, default_value = "3")]
            max_papers: u32,
            /// Citing papers per publication
            #[arg(long, default_value = "5")]
            max_citations: u32,
            /// Authors taken from each citing paper
            #[arg(long, default_value = "1")]
            authors_per_paper: u32,
            /// Only fetch the author and publications
            #[arg(long)]
            quick: bool,
        },
        /// Print the built-in sample result
        Demo,
    }

    fn truncate(s: &str, max: usize) -> String {
        if s.chars().count() > max {
            let head: String = s.chars().take(max.saturating_sub(3)).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        }
    }

    fn print_result_tables(result: &AnalysisResult) {
        use comfy_table::{ContentArrangement, Table};

        let a = &result.author;
        println!(
            "{} ({}): {} citations, h-index {}",
            a.name, a.affiliation, a.citations, a.h_index
        );
        if let Some(source) = result.source {
            println!("Source: {}", source.display_name());
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Year", "Title", "Cites"]);
        for p in &result.publications {
            table.add_row(vec![p.year.clone(), truncate(&p.title, 70), p.citations.to_string()]);
        }
        println!("{table}");

        if !result.citing_authors.is_empty() {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Author", "Affiliation", "Citing paper", "Year"]);
            for c in &result.citing_authors {
                table.add_row(vec![
                    c.name.clone(),
                    c.affiliation.clone(),
                    truncate(&c.paper_title, 50),
                    c.year.clone(),
                ]);
            }
            println!("{table}");
        }

        if !result.locations.is_empty() {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Institution", "Lat", "Lng", "Count", "Authors"]);
            for loc in &result.locations {
                table.add_row(vec![
                    loc.institution.clone(),
                    format!("{:.4}", loc.lat),
                    format!("{:.4}", loc.lng),
                    loc.count.to_string(),
                    loc.authors.join(", "),
                ]);
            }
            println!("{table}");
        }
    }

    fn print_result(result: &AnalysisResult, output: OutputFormat) -> citemap::Result<()> {
        match output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
            OutputFormat::Table => print_result_tables(result),
        }
        Ok(())
    }

    pub async fn run() -> citemap::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("citemap=info,tower_http=info")),
            )
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();
        let mut config = Config::from_env()?;
        if let Some(source) = cli.source.as_deref() {
            config.default_source = parse_source(source)?;
        }

        match cli.command {
            Commands::Serve { bind } => {
                if let Some(bind) = bind.as_deref() {
                    config.bind = parse_bind(bind)?;
                }
                citemap::server::serve(&config).await?;
            }

            Commands::Analyze {
                identifier,
                max_papers,
                max_citations,
                authors_per_paper,
                quick,
            } => {
                let analyzer = config.build_analyzer()?;
                let requested = cli.source.is_some().then_some(config.default_source);
                let result = if quick {
                    analyzer.quick_analyze(&identifier, requested).await?
                } else {
                    let options = AnalysisOptions {
                        max_papers,
                        max_citations,
                        authors_per_paper,
                    };
                    analyzer.analyze(&identifier, requested, options).await?
                };
                print_result(&result, cli.output)?;
            }

            Commands::Demo => print_result(&demo_result(), cli.output)?,
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
