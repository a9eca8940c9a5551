use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mpi_api::Args::parse();

	mpi_api::run(args).await
}
