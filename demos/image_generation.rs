//! Generate an image, save it under the configured output directory and
//! hand it to the platform's default viewer:
//!
//! ```bash
//! cargo run --example image_generation -- "a sunlit mountain lake"
//! ```

use bedrock_tasks::{Client, Error, output};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "A sunlit mountain lake with pine trees, photorealistic".to_string());

    let mut failed = false;
    match run(&prompt).await {
        Ok(()) => {}
        Err(Error::Decode(err)) => eprintln!("warning: image data could not be decoded: {err}"),
        Err(err) => {
            eprintln!("error: {err}");
            failed = true;
        }
    }

    println!("Image generation complete.");
    if failed {
        std::process::exit(1);
    }
}

async fn run(prompt: &str) -> Result<(), Error> {
    let client = Client::from_env().await?;
    match client.tasks().generate_image(prompt).await? {
        Some(image) => {
            let path = output::save_image(&client.config().output_dir, &image)?;
            println!("saved {}", path.display());
            output::open_in_viewer(&path);
        }
        None => println!("no image data found in response"),
    }
    Ok(())
}
