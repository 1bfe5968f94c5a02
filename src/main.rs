use replika::ReplikaError;
use replika::cli::{Args, Runner};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args().from_env();
    let runner = Runner::new(args);

    match runner.run().await {
        Ok(()) => {}
        // Each failed job was already reported and summarized during the run.
        Err(ReplikaError::Replication(_)) => process::exit(1),
        Err(e) => {
            runner.output().error(&e.to_string());
            process::exit(1);
        }
    }
}
