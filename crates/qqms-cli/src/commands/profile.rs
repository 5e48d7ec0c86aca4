//! Profile command implementation.

use anyhow::Result;

use qqms_adapter_sim::generic_profile;

/// Print the generic reference profile as JSON.
///
/// The output can be edited and passed back with `--profile`.
pub fn execute(qubits: u32, seed: u64) -> Result<()> {
    if qubits == 0 {
        anyhow::bail!("--qubits must be at least 1");
    }
    let profile = generic_profile(qubits, seed);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
