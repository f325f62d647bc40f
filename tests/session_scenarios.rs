//! End-to-end session scenarios against the mock automation client.
//!
//! Each test bootstraps a session and drives the mutation loop with scripted
//! operator input, then checks exactly which remote operations were issued.

use modelctl::core::config::{MenuSlots, SessionConfig};
use modelctl::mutation::{LoopSummary, MutationLoop};
use modelctl::remote::mock::{FailOn, MockClient, MockOperation};
use modelctl::remote::RemoteError;
use modelctl::session::{BootstrapError, BootstrapStep, Bootstrapper, Session};
use modelctl::ui::output::Verbosity;
use modelctl::ui::prompts::ScriptedPrompter;

// =============================================================================
// Fixtures
// =============================================================================

fn config() -> SessionConfig {
    SessionConfig {
        host_path: "C:/PTC/Creo 7.0/Parametric/bin/parametric.bat".to_string(),
        file_name: "bracket.prt".to_string(),
        working_dir: "D:/models".to_string(),
        host_version: 7,
        ..Default::default()
    }
}

async fn bootstrap(
    client: &MockClient,
    answers: &[&str],
    interactive: bool,
) -> Result<Session, BootstrapError> {
    let mut prompter = ScriptedPrompter::new(answers.iter().copied());
    Bootstrapper::new(config(), &mut prompter)
        .interactive(interactive)
        .verbosity(Verbosity::Quiet)
        .run(Box::new(client.clone()))
        .await
}

async fn drive(session: &mut Session, input: &[&str]) -> LoopSummary {
    let mut prompter = ScriptedPrompter::new(input.iter().copied());
    MutationLoop::new(session, &mut prompter, MenuSlots::default())
        .verbosity(Verbosity::Quiet)
        .run()
        .await
        .expect("loop failed")
}

/// Bootstrap non-interactively, forget the bootstrap traffic, then drive.
async fn ready_and_drive(client: &MockClient, input: &[&str]) -> LoopSummary {
    let mut session = bootstrap(client, &[], false).await.expect("bootstrap failed");
    client.clear_operations();
    drive(&mut session, input).await
}

/// Drive a ready session with `input` followed by `q`, and check the loop
/// stopped on `q` rather than running out of input.
async fn drive_to_quit(client: &MockClient, input: &[&str]) -> LoopSummary {
    let mut session = bootstrap(client, &[], false).await.expect("bootstrap failed");
    client.clear_operations();

    let script = input.iter().copied().chain(["q", "never read"]);
    let mut prompter = ScriptedPrompter::new(script);
    let summary = MutationLoop::new(&mut session, &mut prompter, MenuSlots::default())
        .verbosity(Verbosity::Quiet)
        .run()
        .await
        .expect("loop failed");
    assert_eq!(prompter.remaining(), 1, "loop did not stop on the quit token");
    summary
}

fn server_error(message: &str) -> RemoteError {
    RemoteError::Server(message.to_string())
}

fn is_set_dimension(op: &MockOperation) -> bool {
    matches!(op, MockOperation::SetDimension { .. })
}

// =============================================================================
// Bootstrap
// =============================================================================

mod bootstrap_flow {
    use super::*;

    #[tokio::test]
    async fn cold_start_runs_every_step_in_order() {
        let client = MockClient::new().with_host(false, true);
        let session = bootstrap(&client, &[], false).await.unwrap();

        let kinds: Vec<_> = client
            .operations()
            .into_iter()
            .map(|op| match op {
                MockOperation::Connect => "connect",
                MockOperation::DeclareCompatibilityMode { .. } => "compat",
                MockOperation::IsHostRunning => "is_running",
                MockOperation::StartHost { .. } => "start",
                MockOperation::SetWorkingDirectory { .. } => "cd",
                MockOperation::FileIsLoaded { .. } => "exists",
                MockOperation::OpenFile { .. } => "open",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            ["connect", "compat", "is_running", "start", "cd", "exists", "open"]
        );
        assert_eq!(session.compat_mode(), Some(7));
        assert!(client.is_loaded("bracket.prt"));
    }

    #[tokio::test]
    async fn launcher_path_is_split_for_start() {
        let client = MockClient::new().with_host(false, true);
        bootstrap(&client, &[], false).await.unwrap();

        let start = client
            .operations()
            .into_iter()
            .find_map(|op| match op {
                MockOperation::StartHost { options } => Some(options),
                _ => None,
            })
            .unwrap();
        assert_eq!(start.start_dir, "C:/PTC/Creo 7.0/Parametric/bin");
        assert_eq!(start.start_command, "parametric.bat");
    }

    #[tokio::test]
    async fn unreachable_server_is_fatal() {
        let client = MockClient::new().fail_on(FailOn::Connect(RemoteError::Network(
            "connection refused".to_string(),
        )));
        let err = bootstrap(&client, &[], false).await.unwrap_err();

        assert!(matches!(err, BootstrapError::Connection { .. }));
        assert!(err
            .to_string()
            .contains("verify host and server are running"));
    }

    #[tokio::test]
    async fn missing_file_is_fatal() {
        let client = MockClient::new().with_openable_files(&["other.prt"]);
        let err = bootstrap(&client, &[], false).await.unwrap_err();
        assert!(matches!(err, BootstrapError::FileOpen { ref file, .. } if file == "bracket.prt"));
    }

    #[tokio::test]
    async fn interactive_answers_override_config() {
        let client = MockClient::new().with_valid_dirs(&["E:/other"]);
        // host path? no / older than 7? yes / new working path? yes, E:/other
        let session = bootstrap(&client, &["n", "y", "y", "E:/other"], true)
            .await
            .unwrap();

        assert_eq!(session.compat_mode(), None);
        assert_eq!(session.working_dir(), Some("E:/other"));
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::DeclareCompatibilityMode { .. })),
            0
        );
    }

    #[tokio::test]
    async fn compatibility_failure_is_labelled() {
        let client = MockClient::new().fail_on(FailOn::DeclareCompatibilityMode(server_error(
            "no such version",
        )));
        let err = bootstrap(&client, &[], false).await.unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Step {
                step: BootstrapStep::CompatibilityMode,
                ..
            }
        ));
        assert_eq!(client.count(|op| matches!(op, MockOperation::IsHostRunning)), 0);
    }

    #[tokio::test]
    async fn host_check_failure_is_labelled() {
        let client = MockClient::new().fail_on(FailOn::IsHostRunning(RemoteError::Network(
            "connection reset".to_string(),
        )));
        let err = bootstrap(&client, &[], false).await.unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Step {
                step: BootstrapStep::HostCheck,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn working_dir_transport_failure_is_labelled() {
        let client = MockClient::new().fail_on(FailOn::SetWorkingDirectory(RemoteError::Network(
            "connection reset".to_string(),
        )));
        let err = bootstrap(&client, &[], false).await.unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Step {
                step: BootstrapStep::WorkingDirectory,
                ..
            }
        ));
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::FileIsLoaded { .. })),
            0
        );
    }

    #[tokio::test]
    async fn file_check_failure_is_labelled() {
        let client = MockClient::new().fail_on(FailOn::FileIsLoaded(server_error("bad file name")));
        let err = bootstrap(&client, &[], false).await.unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::Step {
                step: BootstrapStep::FileCheck,
                ..
            }
        ));
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::OpenFile { .. })),
            0
        );
    }

    #[tokio::test]
    async fn retry_after_server_comes_back() {
        let client = MockClient::new().fail_on(FailOn::Connect(RemoteError::Network(
            "connection refused".to_string(),
        )));
        assert!(bootstrap(&client, &[], false).await.is_err());

        client.clear_fail_on();
        let session = bootstrap(&client, &[], false).await.unwrap();
        assert_eq!(session.file_name(), "bracket.prt");
        assert!(client.is_loaded("bracket.prt"));
    }

    #[tokio::test]
    async fn rejected_working_dir_is_not_fatal() {
        let client = MockClient::new().with_valid_dirs(&["E:/only"]);
        let session = bootstrap(&client, &[], false).await.unwrap();

        assert_eq!(session.working_dir(), None);
        assert!(client.is_loaded("bracket.prt"));
    }
}

// =============================================================================
// Mutation loop
// =============================================================================

mod mutation_flow {
    use super::*;

    #[tokio::test]
    async fn negative_value_aborts_whole_batch() {
        let client = MockClient::new();
        let summary = ready_and_drive(&client, &["2", "0", "10", "1", "-5", "d", "q"]).await;

        assert_eq!(summary, LoopSummary { applied: 0, failed: 1 });
        assert_eq!(client.count(is_set_dimension), 0);
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::Regenerate { .. })),
            0
        );
    }

    #[tokio::test]
    async fn valid_batch_sends_each_key_then_regenerates_once() {
        let client = MockClient::new();
        ready_and_drive(&client, &["2", "0", "10", "1", "2.5", "2", "7", "d", "q"]).await;

        assert_eq!(
            client.operations(),
            vec![
                MockOperation::SetDimension {
                    file: "bracket.prt".to_string(),
                    name: "w".to_string(),
                    value: 10.0,
                },
                MockOperation::SetDimension {
                    file: "bracket.prt".to_string(),
                    name: "h".to_string(),
                    value: 2.5,
                },
                MockOperation::SetDimension {
                    file: "bracket.prt".to_string(),
                    name: "l".to_string(),
                    value: 7.0,
                },
                MockOperation::Regenerate {
                    file: "bracket.prt".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn text_dimensions_use_dimension_commit() {
        let client = MockClient::new();
        ready_and_drive(&client, &["3", "1", "4", "d", "q"]).await;
        assert_eq!(client.dimension("t_h"), Some(4.0));
    }

    #[tokio::test]
    async fn text_parameters_are_sent_verbatim() {
        let client = MockClient::new();
        ready_and_drive(&client, &["4", "0", "  Rev B -12 ", "d", "q"]).await;
        assert_eq!(client.parameter("ak_text").as_deref(), Some("  Rev B -12 "));
    }

    #[tokio::test]
    async fn empty_text_is_accepted() {
        let client = MockClient::new();
        let summary = ready_and_drive(&client, &["4", "0", "", "d", "q"]).await;
        assert_eq!(summary.applied, 1);
        assert_eq!(client.parameter("ak_text").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn remote_failure_mid_batch_names_the_key() {
        let client = MockClient::new().fail_on(FailOn::SetDimension {
            name: "h".to_string(),
            error: RemoteError::Server("dimension not found".to_string()),
        });
        let summary = ready_and_drive(&client, &["2", "0", "10", "1", "3", "d", "q"]).await;

        assert_eq!(summary, LoopSummary { applied: 0, failed: 1 });
        // Keys before the failing one stay applied; nothing regenerates.
        assert_eq!(client.dimension("w"), Some(10.0));
        assert_eq!(client.dimension("h"), None);
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::Regenerate { .. })),
            0
        );
    }

    #[tokio::test]
    async fn out_of_range_material_is_never_sent() {
        let client =
            MockClient::new().with_materials(vec!["Steel".to_string(), "Aluminum".to_string()]);
        let summary = ready_and_drive(&client, &["5", "2", "q"]).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::SetCurrentMaterial { .. })),
            0
        );
        assert_eq!(client.current_material(), None);
    }

    #[tokio::test]
    async fn material_selection_applies_by_index() {
        let client =
            MockClient::new().with_materials(vec!["Steel".to_string(), "Aluminum".to_string()]);
        let summary = ready_and_drive(&client, &["5", "1", "q"]).await;

        assert_eq!(summary.applied, 1);
        assert_eq!(client.current_material().as_deref(), Some("Aluminum"));
    }

    #[tokio::test]
    async fn empty_materials_list_is_reported() {
        let client = MockClient::new();
        let summary = ready_and_drive(&client, &["5", "q"]).await;

        assert_eq!(summary, LoopSummary { applied: 0, failed: 1 });
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::SetCurrentMaterial { .. })),
            0
        );
    }

    #[tokio::test]
    async fn rejected_working_path_leaves_file_alone() {
        let client = MockClient::new().with_valid_dirs(&["D:/models"]);
        let summary = ready_and_drive(&client, &["1", "Z:/nowhere", "q"]).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(client.working_dir().as_deref(), Some("D:/models"));
        assert!(client.is_loaded("bracket.prt"));
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::OpenFile { .. })),
            0
        );
    }

    #[tokio::test]
    async fn compatibility_mode_declared_once_per_session() {
        let client = MockClient::new();
        let mut session = bootstrap(&client, &[], false).await.unwrap();
        drive(&mut session, &["1", "D:/models", "2", "0", "1", "d", "q"]).await;

        assert_eq!(
            client.count(|op| matches!(op, MockOperation::DeclareCompatibilityMode { .. })),
            1
        );
    }

    #[tokio::test]
    async fn end_of_input_discards_pending_changes() {
        let client = MockClient::new();
        let summary = ready_and_drive(&client, &["2", "0", "10", "1"]).await;

        assert_eq!(summary, LoopSummary::default());
        assert!(client.operations().is_empty());
    }

    #[tokio::test]
    async fn parameter_failure_recovers_with_empty_change_set() {
        let client = MockClient::new().fail_once(FailOn::SetParameter(server_error("read only")));
        let summary = drive_to_quit(
            &client,
            &["4", "0", "first", "d", "4", "d", "4", "0", "second", "d"],
        )
        .await;

        assert_eq!(summary, LoopSummary { applied: 1, failed: 1 });
        // The empty "4", "d" batch in the middle sent nothing.
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::SetParameter { .. })),
            2
        );
        assert_eq!(client.parameter("ak_text").as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn text_failure_does_not_leak_into_dimension_batch() {
        let client = MockClient::new().fail_once(FailOn::SetParameter(server_error("read only")));
        let summary = drive_to_quit(&client, &["4", "0", "Rev B", "d", "2", "0", "10", "d"]).await;

        assert_eq!(summary, LoopSummary { applied: 1, failed: 1 });
        assert_eq!(client.dimension("w"), Some(10.0));
    }

    #[tokio::test]
    async fn regenerate_failure_recovers() {
        let client =
            MockClient::new().fail_once(FailOn::Regenerate(server_error("regeneration failed")));
        let summary = drive_to_quit(
            &client,
            &["2", "0", "10", "d", "2", "d", "2", "1", "4", "d"],
        )
        .await;

        assert_eq!(summary, LoopSummary { applied: 1, failed: 1 });
        // w was sent before the regenerate failed; only h follows it.
        assert_eq!(client.count(is_set_dimension), 2);
        assert_eq!(client.dimension("w"), Some(10.0));
        assert_eq!(client.dimension("h"), Some(4.0));
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::Regenerate { .. })),
            2
        );
    }

    #[tokio::test]
    async fn material_list_failure_recovers() {
        let client = MockClient::new()
            .with_materials(vec!["Steel".to_string(), "Aluminum".to_string()])
            .fail_once(FailOn::ListMaterials(RemoteError::Network("timed out".to_string())));
        let summary = drive_to_quit(&client, &["5", "5", "1", "2", "1", "3", "d"]).await;

        assert_eq!(summary, LoopSummary { applied: 2, failed: 1 });
        assert_eq!(client.current_material().as_deref(), Some("Aluminum"));
        assert_eq!(client.dimension("h"), Some(3.0));
    }

    #[tokio::test]
    async fn set_material_failure_recovers() {
        let client = MockClient::new()
            .with_materials(vec!["Steel".to_string(), "Aluminum".to_string()])
            .fail_once(FailOn::SetCurrentMaterial(server_error("material locked")));
        let summary = drive_to_quit(&client, &["5", "0", "5", "1", "2", "2", "5", "d"]).await;

        assert_eq!(summary, LoopSummary { applied: 2, failed: 1 });
        assert_eq!(client.current_material().as_deref(), Some("Aluminum"));
        assert_eq!(client.dimension("l"), Some(5.0));
        assert_eq!(
            client.count(|op| matches!(op, MockOperation::SetCurrentMaterial { .. })),
            2
        );
    }

    #[tokio::test]
    async fn dimension_failure_then_retry_same_key() {
        let client = MockClient::new().fail_once(FailOn::SetDimension {
            name: "w".to_string(),
            error: server_error("dimension locked"),
        });
        let summary = drive_to_quit(
            &client,
            &["2", "0", "10", "d", "2", "d", "2", "0", "11", "d"],
        )
        .await;

        assert_eq!(summary, LoopSummary { applied: 1, failed: 1 });
        assert_eq!(client.count(is_set_dimension), 2);
        assert_eq!(client.dimension("w"), Some(11.0));
    }
}
