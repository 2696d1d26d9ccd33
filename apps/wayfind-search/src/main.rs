use clap::Parser;

use wayfind_search::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	wayfind_search::run(args).await
}
