use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Days ahead of today to expand.
    #[arg(long, default_value_t = 7)]
    window_days: u32,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    expander::run(args.window_days).await;
}
