use base64::{engine::general_purpose, Engine};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full path to TOML analysis config
    #[clap(short, long, value_parser)]
    toml: Option<String>,

    /// Base64 encoded TOML config
    #[clap(short, long, value_parser)]
    data: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    println!("[wipetrace] Starting factory reset analysis!");

    let analysis_results = if let Some(toml) = args.toml {
        if toml.is_empty() {
            println!("[wipetrace] Empty TOML path provided!");
            return;
        }
        forensics::core::parse_toml_file(&toml).await
    } else if let Some(data) = args.data {
        let toml_data = match general_purpose::STANDARD.decode(&data) {
            Ok(results) => results,
            Err(err) => {
                println!("[wipetrace] Failed to base64 decode TOML config {data}, error: {err:?}");
                return;
            }
        };
        forensics::core::parse_toml_data(&toml_data).await
    } else {
        println!("[wipetrace] No TOML file or data provided!");
        return;
    };

    match analysis_results {
        Ok(path) => {
            info!("[wipetrace] Analysis success");
            println!("[wipetrace] Report written to {path}");
        }
        Err(err) => {
            println!("[wipetrace] Failed to analyze source: {err}");
            return;
        }
    }
    println!("[wipetrace] Finished factory reset analysis!");
}
