use anyhow::Result;
use reverse_lookup::{
    core::{config::LookupConfig, init},
    lookup::ReverseLookupResolver,
    ReverseLookupService,
};
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "reverse-lookup",
    about = "Recover the XBRL element names behind known financial figures"
)]
struct Opt {
    /// Reverse dictionary CSV to read known figures from
    #[structopt(short = "f", long = "file", parse(from_os_str))]
    file: Option<PathBuf>,

    /// CSV file to write the account item mapping to (replaced if present)
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Encoding label of the reverse dictionary, e.g. shift_jis
    #[structopt(long = "encoding")]
    encoding: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init::initialize_logger();

    let opt = Opt::from_args();
    let config = LookupConfig::from_env()?.with_overrides(opt.file, opt.output, opt.encoding);
    log::info!(
        "Reverse lookup {} -> {}",
        config.dictionary_path.display(),
        config.output_path.display()
    );

    let store = init::initialize_report_store(&config).await?;
    let dictionary = init::initialize_dictionary(&config);
    let repository = init::initialize_repository(&config)?;

    let service = ReverseLookupService::new(
        Arc::new(dictionary),
        Arc::new(ReverseLookupResolver::new(store)),
        Arc::new(repository),
    );
    service.handle().await
}
