use super::*;
use std::time::Duration;

use genflow_core::error::EntryKind;
use serde::Deserialize;

fn registry_with_echo() -> FlowRegistry {
    let mut flows = FlowRegistry::new();
    flows
        .define("echo", |_ctx: FlowContext, input: String| async move {
            Ok(format!("echo: {input}"))
        })
        .unwrap();
    flows
}

#[tokio::test]
async fn handler_ignoring_context_completes_after_cancel() {
    let mut flows = FlowRegistry::new();
    flows
        .define("flow", |_ctx: FlowContext, input: String| async move {
            Ok(input)
        })
        .unwrap();

    let ctx = FlowContext::new();
    ctx.cancel("cancelled before the run");
    let out: String = flows.run("flow", &ctx, "pumpkins").await.unwrap();
    assert_eq!(out, "pumpkins");

    let invocation = flows.start("flow", &ctx, "pumpkins").unwrap();
    assert_eq!(
        invocation.outcome().await,
        FlowOutcome::Completed(Value::String("pumpkins".into()))
    );
}

#[tokio::test]
async fn handler_observing_context_ends_cancelled_with_reason() {
    let mut flows = FlowRegistry::new();
    flows
        .define("careful", |ctx: FlowContext, _input: ()| async move {
            ctx.check()?;
            Ok::<_, GenflowError>("done")
        })
        .unwrap();

    let ctx = FlowContext::new();
    ctx.cancel("user pressed ctrl-c");
    let invocation = flows.start("careful", &ctx, ()).unwrap();
    assert_eq!(
        invocation.outcome().await,
        FlowOutcome::Cancelled("user pressed ctrl-c".into())
    );

    let err = flows
        .run::<_, String>("careful", &ctx, ())
        .await
        .unwrap_err();
    assert_eq!(err, GenflowError::Cancelled("user pressed ctrl-c".into()));
}

#[tokio::test]
async fn cancellation_during_run_is_observed_at_suspension_point() {
    let mut flows = FlowRegistry::new();
    flows
        .define("waits", |ctx: FlowContext, _input: ()| async move {
            ctx.run_until_cancelled(tokio::time::sleep(Duration::from_secs(30)))
                .await?;
            Ok::<_, GenflowError>(())
        })
        .unwrap();

    let ctx = FlowContext::new();
    let invocation = flows.start("waits", &ctx, ()).unwrap();
    let mut states = invocation.subscribe();
    states
        .wait_for(|s| *s == FlowState::Running)
        .await
        .unwrap();

    ctx.cancel("shutdown");
    let outcome = invocation.outcome().await;
    assert_eq!(outcome.state(), FlowState::Cancelled);
}

#[tokio::test]
async fn states_move_from_pending_to_terminal() {
    let mut flows = FlowRegistry::new();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let release_rx = std::sync::Mutex::new(Some(release_rx));
    flows
        .define("gated", move |_ctx: FlowContext, _input: ()| {
            let rx = release_rx.lock().unwrap().take();
            async move {
                if let Some(rx) = rx {
                    let _ = rx.await;
                }
                Ok(1)
            }
        })
        .unwrap();

    let invocation = flows.start("gated", &FlowContext::new(), ()).unwrap();
    let mut states = invocation.subscribe();
    states
        .wait_for(|s| *s == FlowState::Running)
        .await
        .unwrap();
    assert!(!invocation.state().is_terminal());

    release_tx.send(()).unwrap();
    states.wait_for(|s| s.is_terminal()).await.unwrap();
    assert_eq!(invocation.state(), FlowState::Completed);
    assert_eq!(invocation.output::<i32>().await.unwrap(), 1);
}

#[tokio::test]
async fn failing_handler_ends_failed() {
    let mut flows = FlowRegistry::new();
    flows
        .define("boom", |_ctx: FlowContext, _input: ()| async move {
            Err::<(), _>(GenflowError::backend("gemini", "quota exceeded"))
        })
        .unwrap();

    let invocation = flows.start("boom", &FlowContext::new(), ()).unwrap();
    let outcome = invocation.outcome().await;
    assert_eq!(
        outcome,
        FlowOutcome::Failed(GenflowError::backend("gemini", "quota exceeded"))
    );
    assert_eq!(outcome.state(), FlowState::Failed);
}

#[tokio::test]
async fn panicking_handler_ends_failed() {
    let mut flows = FlowRegistry::new();
    flows
        .define("panics", |_ctx: FlowContext, _input: ()| async move {
            if true {
                panic!("handler bug");
            }
            Ok(())
        })
        .unwrap();

    let invocation = flows.start("panics", &FlowContext::new(), ()).unwrap();
    let states = invocation.subscribe();
    let err = invocation.result().await.unwrap_err();
    assert!(matches!(err, GenflowError::InternalError(_)));
    assert_eq!(*states.borrow(), FlowState::Failed);
}

#[tokio::test]
async fn mismatched_input_is_invalid() {
    #[derive(Deserialize)]
    struct Topic {
        #[allow(dead_code)]
        topic: String,
    }

    let mut flows = FlowRegistry::new();
    flows
        .define("typed", |_ctx: FlowContext, _input: Topic| async move { Ok(()) })
        .unwrap();

    let err = flows
        .run_json("typed", &FlowContext::new(), serde_json::json!(42))
        .await
        .unwrap_err();
    assert!(matches!(err, GenflowError::InvalidInput(_)));
}

#[tokio::test]
async fn run_json_round_trips_values() {
    let flows = registry_with_echo();
    let out = flows
        .run_json("echo", &FlowContext::new(), serde_json::json!("pumpkins"))
        .await
        .unwrap();
    assert_eq!(out, serde_json::json!("echo: pumpkins"));
}

#[tokio::test]
async fn unknown_flow_is_not_found() {
    let flows = registry_with_echo();
    let err = flows
        .run::<_, String>("missing", &FlowContext::new(), "x")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GenflowError::NotFound {
            kind: EntryKind::Flow,
            name: "missing".into()
        }
    );
    assert!(flows.start("missing", &FlowContext::new(), "x").is_err());
}

#[test]
fn duplicate_definition_is_rejected() {
    let mut flows = registry_with_echo();
    let err = flows
        .define("echo", |_ctx: FlowContext, input: String| async move { Ok(input) })
        .unwrap_err();
    assert_eq!(err, GenflowError::DuplicateFlow("echo".into()));
    assert_eq!(flows.names(), vec!["echo"]);
}

#[tokio::test]
async fn invocations_are_independent_and_concurrent() {
    let flows = Arc::new(registry_with_echo());
    let ctx = FlowContext::new();

    let invocations: Vec<_> = (0..16)
        .map(|i| flows.start("echo", &ctx, format!("run {i}")).unwrap())
        .collect();

    let mut ids: Vec<Uuid> = invocations.iter().map(FlowInvocation::id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);

    for (i, invocation) in invocations.into_iter().enumerate() {
        assert_eq!(invocation.flow_name(), "echo");
        let out: String = invocation.output().await.unwrap();
        assert_eq!(out, format!("echo: run {i}"));
    }
}
