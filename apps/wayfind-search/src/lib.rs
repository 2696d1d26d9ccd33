use std::{env, path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wayfind_config::Config;
use wayfind_domain::{OutputFormat, Query, SearchMode, SessionDefaults};
use wayfind_service::{RouteRequest, RoutingEngine};

#[derive(Debug, Parser)]
#[command(
	version = wayfind_cli::VERSION,
	rename_all = "kebab",
	styles = wayfind_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Search text. Wrap it in double quotes for an exact literal search.
	#[arg(value_name = "QUERY", required = true, num_args = 1..)]
	pub query: Vec<String>,
	/// Skip classification and start from this mode.
	#[arg(long, short = 'm', value_name = "MODE", value_parser = parse_mode)]
	pub mode: Option<SearchMode>,
	#[arg(long, short = 'f', value_name = "FORMAT", value_parser = parse_output_format)]
	pub format: Option<OutputFormat>,
	#[arg(long, short = 'w', value_name = "ID")]
	pub workspace: Option<String>,
	#[arg(long, short = 'p', value_name = "ID")]
	pub project: Option<String>,
	/// Folder used for scope lookup. Defaults to the project root above the current directory.
	#[arg(long, value_name = "DIR")]
	pub folder: Option<PathBuf>,
	#[arg(long, short = 'n', value_name = "N", default_value_t = 0)]
	pub limit: u32,
	#[arg(long, value_name = "N", default_value_t = 0)]
	pub offset: u32,
	#[arg(long, value_name = "MS")]
	pub timeout_ms: Option<u64>,
	/// Print the structured payload instead of the text listing.
	#[arg(long)]
	pub json: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = wayfind_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let engine = RoutingEngine::from_config(&config)?;
	let req = build_request(&args, &config)?;
	let outcome = engine.route(req).await?;

	if args.json {
		let json = serde_json::to_string_pretty(&wayfind_service::payload(&outcome))?;

		println!("{json}");
	} else {
		print!("{}", wayfind_service::render_text(&outcome));
	}

	Ok(())
}

fn build_request(args: &Args, config: &Config) -> color_eyre::Result<RouteRequest> {
	let mut query = Query::new(args.query.join(" "), args.limit, 0);

	query.offset = args.offset;
	query.output_format = args.format;

	let folder = match &args.folder {
		Some(folder) => Some(folder.clone()),
		None => {
			let cwd = env::current_dir()?;

			wayfind_storage::find_project_root(&cwd).or(Some(cwd))
		},
	};

	tracing::debug!(folder = ?folder, "Resolved folder for scope lookup.");

	let mut req = RouteRequest::new(query);

	req.mode = args.mode;
	req.explicit_workspace = args.workspace.clone();
	req.explicit_project = args.project.clone();
	req.folder_path = folder;
	req.timeout = args.timeout_ms.map(Duration::from_millis);
	req.session = config
		.session
		.as_ref()
		.map(|session| SessionDefaults {
			workspace_id: session.workspace_id.clone(),
			project_id: session.project_id.clone(),
		})
		.unwrap_or_default();

	Ok(req)
}

fn parse_mode(raw: &str) -> Result<SearchMode, String> {
	raw.parse()
}

fn parse_output_format(raw: &str) -> Result<OutputFormat, String> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"full" => Ok(OutputFormat::Full),
		"minimal" => Ok(OutputFormat::Minimal),
		"paths" => Ok(OutputFormat::Paths),
		"count" => Ok(OutputFormat::Count),
		other => Err(format!(
			"Unknown output format `{other}`; expected full, minimal, paths, or count."
		)),
	}
}
