use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use nw_hierarchy::{Hierarchy, HierarchyBuilder, HierarchyFeed};
use nw_tools::HierarchyTools;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nw-hierarchy")]
#[command(about = "Inspect a Netilion Water equipment hierarchy feed", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hierarchy feed JSON (node_info + instrumentation_info)
    #[arg(short, long, global = true, default_value = "hierarchy.json")]
    feed: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print node counts per category
    Summary(RenderArgs),

    /// Print the full hierarchy tree
    Tree(RenderArgs),

    /// Search node names for a term
    Search(SearchArgs),

    /// Print detailed statistics as JSON
    Stats,

    /// Look up one node by id
    Node(NodeArgs),

    /// List the available query tools
    Tools,

    /// Invoke one query tool by name
    Call(CallArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Render markdown instead of plain text
    #[arg(long)]
    markdown: bool,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Term to look for in node names
    term: String,

    /// Match case-sensitively
    #[arg(long)]
    case_sensitive: bool,
}

#[derive(clap::Args)]
struct NodeArgs {
    /// Node id (-1 for the synthetic root)
    id: i64,
}

#[derive(clap::Args)]
struct CallArgs {
    /// Tool name, see `tools`
    name: String,

    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}")]
    args: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let hierarchy = load_hierarchy(&cli.feed)?;

    match cli.command {
        Commands::Summary(args) => {
            if args.markdown {
                print!("{}", hierarchy.print_md_summary());
            } else {
                print!("{}", hierarchy.print_summary());
            }
        }
        Commands::Tree(args) => {
            if args.markdown {
                print!("{}", hierarchy.pprint_md(true));
            } else {
                print!("{}", hierarchy.pprint(true));
            }
        }
        Commands::Search(args) => {
            let mut tools = HierarchyTools::new(hierarchy);
            let reply = tools.invoke(
                "search_hierarchy",
                &serde_json::json!({
                    "search_term": args.term,
                    "case_sensitive": args.case_sensitive,
                }),
            )?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::Stats => {
            let stats = hierarchy.detailed_statistics();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Node(args) => match hierarchy.get_node_by_id(args.id) {
            Some(node) => println!("{node}"),
            None => anyhow::bail!("no node with id {}", args.id),
        },
        Commands::Tools => {
            for spec in HierarchyTools::specs() {
                if spec.args.is_empty() {
                    println!("{:<36} {}", spec.name, spec.description);
                } else {
                    println!(
                        "{:<36} {} (args: {})",
                        spec.name,
                        spec.description,
                        spec.args.join(", ")
                    );
                }
            }
        }
        Commands::Call(args) => {
            let tool_args: Value = serde_json::from_str(&args.args)
                .context("--args must be a JSON object")?;
            let mut tools = HierarchyTools::new(hierarchy);
            let reply = tools.invoke(&args.name, &tool_args)?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}

fn load_hierarchy(path: &PathBuf) -> Result<Hierarchy> {
    let feed = HierarchyFeed::from_json_file(path)
        .with_context(|| format!("failed to load hierarchy feed from {}", path.display()))?;
    let hierarchy = HierarchyBuilder::new().build(&feed)?;
    Ok(hierarchy)
}
