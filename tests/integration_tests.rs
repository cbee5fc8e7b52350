//! Integration tests for dialogue-train
//!
//! These drive the binary end to end with a shell-script trainer.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Records each training job as "<policy config> <percentage>" in trainer.log
const RECORDING_TRAINER: &str =
    r#"cat > /dev/null; echo "$(basename "$TRAIN_POLICY_CONFIG") $TRAIN_EXCLUSION_PERCENTAGE" >> trainer.log"#;

/// Helper to create a dialogue-train Command with a clean environment
fn dialogue_train() -> Command {
    let mut cmd = cargo_bin_cmd!("dialogue-train");
    cmd.env_remove("TRAINER_CMD")
        .env_remove("INTERACTIVE_CMD")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a project with a domain, four stories and two single-policy configs
fn create_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("domain.yml"),
        "intents:\n  - greet\n  - goodbye\nactions:\n  - utter_greet\n",
    )
    .unwrap();

    fs::create_dir_all(dir.path().join("data/core")).unwrap();
    fs::write(
        dir.path().join("data/core/stories.md"),
        r#"## happy path
* greet
  - utter_greet

## say goodbye
* goodbye
  - utter_goodbye

<!-- ## commented out
* greet -->

## greet twice
* greet
  - utter_greet
* greet
  - utter_greet

## greet then leave
* greet
  - utter_greet
* goodbye
"#,
    )
    .unwrap();

    fs::write(
        dir.path().join("keras.yml"),
        "policies:\n  - name: KerasPolicy\n    epochs: 5\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("memo.yml"),
        "policies:\n  - name: MemoizationPolicy\n",
    )
    .unwrap();
    dir
}

fn trainer_log(dir: &TempDir) -> Vec<String> {
    fs::read_to_string(dir.path().join("trainer.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        dialogue_train()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compare"))
            .stdout(predicate::str::contains("interactive"));
    }

    #[test]
    fn test_version() {
        dialogue_train().arg("--version").assert().success();
    }

    #[test]
    fn test_compare_help_shows_default_percentages() {
        dialogue_train()
            .args(["compare", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--percentages"))
            .stdout(predicate::str::contains("--runs"));
    }

    #[test]
    fn test_missing_settings_file_fails() {
        let dir = create_project();
        dialogue_train()
            .current_dir(dir.path())
            .args(["--settings", "nope.toml", "default"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Settings file not found"));
    }
}

// =============================================================================
// Compare Mode Tests
// =============================================================================

mod compare {
    use super::*;

    #[test]
    fn test_compare_trains_full_grid_and_writes_story_counts() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--runs", "2", "--percentages", "0", "50"])
            .args(["-c", "keras.yml", "memo.yml"])
            .args(["--trainer-cmd", RECORDING_TRAINER])
            .assert()
            .success();

        let out = dir.path().join("models/dialogue");
        for run in ["run_1", "run_2"] {
            for cell in ["KerasPolicy1", "MemoizationPolicy1", "KerasPolicy2", "MemoizationPolicy2"] {
                assert!(out.join(run).join(cell).is_dir(), "missing {run}/{cell}");
            }
        }

        let counts = fs::read_to_string(out.join("num_stories.json")).unwrap();
        let counts: Vec<u64> = serde_json::from_str(&counts).unwrap();
        assert_eq!(counts, vec![4, 2]);

        assert_eq!(
            trainer_log(&dir),
            vec![
                "keras.yml 0",
                "memo.yml 0",
                "keras.yml 50",
                "memo.yml 50",
                "keras.yml 0",
                "memo.yml 0",
                "keras.yml 50",
                "memo.yml 50",
            ]
        );
    }

    #[test]
    fn test_compare_respects_custom_out_dir() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--runs", "1", "--percentages", "25"])
            .args(["-c", "keras.yml", "--out", "results"])
            .args(["--trainer-cmd", RECORDING_TRAINER])
            .assert()
            .success();

        assert!(dir.path().join("results/run_1/KerasPolicy1").is_dir());
        let counts = fs::read_to_string(dir.path().join("results/num_stories.json")).unwrap();
        assert_eq!(counts, "[3]");
    }

    #[test]
    fn test_compare_rejects_multi_policy_config() {
        let dir = create_project();
        fs::write(
            dir.path().join("ensemble.yml"),
            "policies:\n  - name: KerasPolicy\n  - name: MemoizationPolicy\n",
        )
        .unwrap();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--runs", "1", "--percentages", "0"])
            .args(["-c", "ensemble.yml"])
            .args(["--trainer-cmd", RECORDING_TRAINER])
            .assert()
            .failure()
            .stderr(predicate::str::contains("exactly one policy"));

        assert!(trainer_log(&dir).is_empty());
        assert!(!dir.path().join("models/dialogue/num_stories.json").exists());
    }

    #[test]
    fn test_compare_rejects_out_of_range_percentage() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--percentages", "100"])
            .args(["-c", "keras.yml", "--trainer-cmd", RECORDING_TRAINER])
            .assert()
            .failure()
            .stderr(predicate::str::contains("outside [0, 100)"));
    }

    #[test]
    fn test_compare_rejects_zero_runs() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--runs", "0", "-c", "keras.yml"])
            .args(["--trainer-cmd", RECORDING_TRAINER])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Run count must be at least 1"));
    }

    #[test]
    fn test_trainer_failure_aborts_without_summary() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--runs", "1", "--percentages", "0", "50"])
            .args(["-c", "keras.yml"])
            .args(["--trainer-cmd", "cat > /dev/null; echo out of memory >&2; exit 3"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("out of memory"));

        assert!(!dir.path().join("models/dialogue/num_stories.json").exists());
    }

    #[test]
    fn test_trainer_command_from_settings_file() {
        let dir = create_project();
        fs::write(
            dir.path().join("train.toml"),
            format!("[trainer]\ncommand = '{}'\n", RECORDING_TRAINER),
        )
        .unwrap();

        dialogue_train()
            .current_dir(dir.path())
            .args(["compare", "--runs", "1", "--percentages", "0", "-c", "memo.yml"])
            .assert()
            .success();

        assert_eq!(trainer_log(&dir), vec!["memo.yml 0"]);
    }
}

// =============================================================================
// Default Mode Tests
// =============================================================================

mod default_mode {
    use super::*;

    #[test]
    fn test_no_subcommand_trains_first_config_once() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["-c", "memo.yml", "keras.yml"])
            .args(["--trainer-cmd", RECORDING_TRAINER])
            .assert()
            .success()
            .stdout(predicate::str::contains("Model trained"));

        assert_eq!(trainer_log(&dir), vec!["memo.yml "]);
        assert!(dir.path().join("models/dialogue").is_dir());
    }

    #[test]
    fn test_default_passes_extra_args_on_stdin() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["default", "-c", "keras.yml", "--augmentation", "7"])
            .args(["--trainer-cmd", "cat > request.json"])
            .assert()
            .success();

        let request = fs::read_to_string(dir.path().join("request.json")).unwrap();
        let request: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert_eq!(request["data_load_args"]["augmentation_factor"], 7);
        assert_eq!(request["data_load_args"]["debug_plots"], false);
        assert!(request["exclusion_percentage"].is_null());
    }

    #[test]
    fn test_default_without_trainer_command_fails() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["default", "-c", "keras.yml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No trainer command configured"));
    }
}

// =============================================================================
// Interactive Mode Tests
// =============================================================================

mod interactive {
    use super::*;

    #[test]
    fn test_core_with_finetune_is_rejected() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["interactive", "--core", "--finetune"])
            .args(["--interactive-cmd", "touch launched"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "core and finetune are mutually exclusive",
            ));

        assert!(!dir.path().join("launched").exists());
    }

    #[test]
    fn test_request_is_passed_to_session() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["interactive", "--finetune", "--skip-visualization"])
            .args(["--interactive-cmd", r#"printf '%s' "$INTERACTIVE_REQUEST" > session.json"#])
            .assert()
            .success();

        let request = fs::read_to_string(dir.path().join("session.json")).unwrap();
        let request: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert_eq!(request["finetune"], true);
        assert_eq!(request["core"], false);
        assert_eq!(request["skip_visualization"], true);
        assert_eq!(request["extra_args"]["augmentation_factor"], 50);
        assert!(request["server_args"]["domain"]
            .as_str()
            .unwrap()
            .ends_with("domain.yml"));
    }

    #[test]
    fn test_session_sees_every_command_line_setting() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["interactive", "--augmentation", "12", "--debug-plots"])
            .args(["--loglevel", "warn", "-c", "keras.yml"])
            .args(["--interactive-cmd", r#"printf '%s' "$INTERACTIVE_REQUEST" > session.json"#])
            .assert()
            .success();

        let request = fs::read_to_string(dir.path().join("session.json")).unwrap();
        let request: serde_json::Value = serde_json::from_str(&request).unwrap();
        let server_args = &request["server_args"];
        assert_eq!(server_args["augmentation"], 12);
        assert_eq!(server_args["debug_plots"], true);
        assert_eq!(server_args["loglevel"], "warn");
        assert_eq!(server_args["verbose"], false);
        assert!(server_args["url"].is_null());
        assert!(server_args.get("url").is_some());
        assert_eq!(server_args["dump_stories"], false);
        assert!(server_args["config"][0]
            .as_str()
            .unwrap()
            .ends_with("keras.yml"));
        assert_eq!(request["extra_args"]["augmentation_factor"], 12);
        assert_eq!(request["extra_args"]["debug_plots"], true);
    }

    #[test]
    fn test_failing_session_exits_non_zero() {
        let dir = create_project();

        dialogue_train()
            .current_dir(dir.path())
            .args(["interactive", "--interactive-cmd", "exit 4"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("exited with code 4"));
    }
}
