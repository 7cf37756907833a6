use std::{env, path::Path};

#[tokio::main]
async fn main() {
    println!("Starting wipetrace analysis...");

    let args: Vec<String> = env::args().collect();

    if args.len() == 2 {
        let path = &args[1];
        if Path::new(path).is_file() {
            match forensics::core::parse_toml_file(path).await {
                Ok(report) => println!("Report written to {report}"),
                Err(err) => println!("Analysis failed: {err}"),
            }
        } else {
            println!("Not a file")
        }
    } else {
        println!("Require TOML input file")
    }
}
