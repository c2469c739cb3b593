use multiplication_table::app;
use multiplication_table::cli::Args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse_args();
    app::run(&args)
}
