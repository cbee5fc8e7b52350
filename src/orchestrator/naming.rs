use std::path::{Path, PathBuf};

/// Output directory of one grid cell: `output_root/run_{run}/{policy}{round}`.
///
/// Only the policy kind name is used, so two configs with the same kind write
/// to the same directory for a given run and round.
pub fn run_output_path(output_root: &Path, run: u32, policy_name: &str, round: usize) -> PathBuf {
    output_root
        .join(format!("run_{}", run))
        .join(format!("{}{}", policy_name, round))
}
