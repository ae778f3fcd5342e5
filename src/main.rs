use std::env;

#[tokio::main]
async fn main() {
    fire_sim::logging::init_logging();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = fire_sim::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("simulate") => match fire_sim::api::run_cli(&raw_args[1..]) {
            Ok(output) => println!("{output}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("Usage: fire-sim serve [port]");
            eprintln!("       fire-sim simulate [--initial-balance N] [--monthly-contribution N] ...");
            std::process::exit(1);
        }
    }
}
