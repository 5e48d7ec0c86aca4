//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - qubit decoherence calibration and history",
        style("QQMS").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qqms-hal              Execution abstraction layer");
    println!("  qqms-sweep            Delay-sweep orchestration and pipeline");
    println!("  qqms-history          Time-series measurement history");
    println!("  qqms-adapter-sim      Local noisy simulator");
    println!("  qqms-adapter-runtime  Remote execution service client");
    println!("  qqms-cli              Command-line interface");
    println!();
    println!(
        "Stores:     memory, json, sqlite{}",
        if cfg!(feature = "dynamodb") {
            ", dynamodb"
        } else {
            ""
        }
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
