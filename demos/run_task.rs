//! Run any task kind from the command line:
//!
//! ```bash
//! cargo run --example run_task -- sentiment text="I loved every minute of it"
//! cargo run --example run_task -- translation text="Good morning" target_language=French
//! ```
//!
//! Configuration comes from `settings.json` / `BEDROCK_*` environment
//! variables; credentials from the default AWS chain.

use std::str::FromStr;

use bedrock_tasks::{Client, Error, InputValue, Inputs, TaskKind};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut args = std::env::args().skip(1);
    let Some(task_name) = args.next() else {
        eprintln!("usage: run_task <task-kind> [key=value ...]");
        let names: Vec<&str> = TaskKind::ALL.iter().map(|t| t.as_str()).collect();
        eprintln!("task kinds: {}", names.join(", "));
        std::process::exit(2);
    };

    let task = match TaskKind::from_str(&task_name) {
        Ok(task) => task,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let mut inputs = Inputs::new();
    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => inputs.insert(key, InputValue::Text(value.to_string())),
            None => {
                eprintln!("error: inputs must be key=value, got `{arg}`");
                std::process::exit(2);
            }
        }
    }

    let mut failed = false;
    match run(task, inputs).await {
        Ok(()) => {}
        // Decode failures and absent results degrade to a diagnostic.
        Err(Error::Decode(err)) => eprintln!("warning: result could not be decoded: {err}"),
        Err(err) => {
            eprintln!("error: {err}");
            failed = true;
        }
    }

    println!("Task {task} complete.");
    if failed {
        std::process::exit(1);
    }
}

async fn run(task: TaskKind, inputs: Inputs) -> Result<(), Error> {
    let client = Client::from_env().await?;
    let result = client.tasks().run(task, inputs).await?;
    if result.is_not_found() {
        println!("no result found in response");
    } else {
        println!("{result}");
    }
    Ok(())
}
