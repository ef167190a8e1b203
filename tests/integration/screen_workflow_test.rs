//! Full screen cycles: load, row actions, mutation dispatch, refresh

mod common;

use std::time::Duration;

use atrium_app::{ScreenError, ScreenErrorKind};
use atrium_catalog::{EntityPatch, EntityType, RecordedCall, TransitionAction};
use atrium_common::RepositoryError;
use atrium_view::EmptyState;

use crate::common::{entity, resource, twelve_resources, TestScreen};

fn targets(test: &TestScreen, id: &str) -> Vec<&'static str> {
    test.screen
        .row_actions(id)
        .unwrap()
        .into_iter()
        .map(|a| a.target_status)
        .collect()
}

mod transitions {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_affected_resource_offers_free_then_in_use() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        assert_eq!(targets(&test, "res-02"), vec!["FREE", "IN_USE"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_illegal_status_never_reaches_repository() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.reset();

        let err = test
            .screen
            .change_status("res-02", "PUBLISHED")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ScreenErrorKind::ValidationFailure);
        assert!(test.repo.recorded_calls().is_empty());
        assert_eq!(
            test.screen.snapshot().unwrap().error_kind,
            Some(ScreenErrorKind::ValidationFailure)
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_legal_change_dispatches_then_refreshes_once() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.reset();

        test.screen.change_status("res-02", "IN_USE").await.unwrap();

        let calls = test.repo.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            RecordedCall::ChangeStatus {
                entity_id: "res-02".to_string(),
                new_status: "IN_USE".to_string(),
            }
        );
        assert!(matches!(calls[1], RecordedCall::FetchCollection(_)));
        assert_eq!(test.status_of("res-02").as_deref(), Some("IN_USE"));
        assert_eq!(targets(&test, "res-02"), vec!["FREE"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_service_runs_through_its_lifecycle() {
        let service = entity(
            "svc-1",
            EntityType::Service,
            "PLANNED",
            &[
                ("name", "Harbor tour".into()),
                ("startsAt", "2024-07-01".into()),
            ],
        );
        let test = TestScreen::loaded(EntityType::Service, vec![service]).await;

        for next in ["PUBLISHED", "ONGOING", "FINISHED"] {
            test.screen.change_status("svc-1", next).await.unwrap();
        }
        assert_eq!(test.status_of("svc-1").as_deref(), Some("FINISHED"));
        assert!(targets(&test, "svc-1").is_empty());

        let err = test
            .screen
            .change_status("svc-1", "CANCELLED")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("terminal"));
    }

    #[test_log::test(tokio::test)]
    async fn test_row_actions_carry_descriptors() {
        let service = entity(
            "svc-1",
            EntityType::Service,
            "ONGOING",
            &[
                ("name", "Harbor tour".into()),
                ("startsAt", "2024-07-01".into()),
            ],
        );
        let test = TestScreen::loaded(EntityType::Service, vec![service]).await;
        let actions = test.screen.row_actions("svc-1").unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].target_status, "FINISHED");
        assert_eq!(actions[0].descriptor.action, TransitionAction::Finalize);
        assert_eq!(actions[1].target_status, "CANCELLED");
        assert_eq!(actions[1].descriptor.action, TransitionAction::Cancel);
        assert_ne!(
            actions[0].descriptor.icon_class,
            actions[1].descriptor.icon_class
        );
    }
}

mod failures {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_concurrent_change_surfaces_conflict_and_refreshes() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.force_status("res-02", "FREE");

        let err = test
            .screen
            .change_status("res-02", "IN_USE")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ScreenErrorKind::MutationConflict);
        assert_eq!(test.status_of("res-02").as_deref(), Some("FREE"));
        assert_eq!(targets(&test, "res-02"), vec!["AFFECTED"]);
        assert!(!test.screen.is_busy("res-02").unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_entity_deleted_elsewhere_is_a_conflict() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.fail_next_mutation(RepositoryError::NotFound);

        let err = test.screen.remove("res-03").await.unwrap_err();
        assert_eq!(err.kind(), ScreenErrorKind::MutationConflict);
    }

    #[test_log::test(tokio::test)]
    async fn test_generic_failure_keeps_snapshot_and_clears_busy() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.reset();
        test.repo
            .fail_next_mutation(RepositoryError::Transport("connection reset".to_string()));

        let err = test
            .screen
            .mutate("res-01", &EntityPatch::new().set("name", "Quay room"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ScreenErrorKind::MutationFailure);
        assert_eq!(test.repo.fetch_count(), 0);
        assert!(!test.screen.is_busy("res-01").unwrap());
        assert_eq!(
            test.screen.snapshot().unwrap().empty_state,
            EmptyState::Populated
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_refresh_after_success_reports_fetch_failure() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo
            .fail_next_fetch(RepositoryError::Transport("offline".to_string()));

        let err = test
            .screen
            .change_status("res-01", "AFFECTED")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ScreenErrorKind::FetchFailure);
        assert!(err.is_retryable());
        assert_eq!(test.screen.empty_state().unwrap(), EmptyState::Error);

        test.screen.refresh().await.unwrap();
        assert_eq!(test.status_of("res-01").as_deref(), Some("AFFECTED"));
    }
}

mod concurrency {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_same_id_is_serialized_behind_busy_flag() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.set_latency(Duration::from_millis(20));

        let (first, second) = tokio::join!(
            test.screen.change_status("res-02", "IN_USE"),
            test.screen.change_status("res-02", "FREE"),
        );

        first.unwrap();
        assert_eq!(second, Err(ScreenError::Busy("res-02".to_string())));
        assert_eq!(test.repo.mutation_count(), 1);
        assert_eq!(test.status_of("res-02").as_deref(), Some("IN_USE"));
    }

    #[test_log::test(tokio::test)]
    async fn test_different_ids_proceed_independently() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.set_latency(Duration::from_millis(10));

        let (a, b, c) = tokio::join!(
            test.screen.change_status("res-01", "AFFECTED"),
            test.screen.change_status("res-02", "IN_USE"),
            test.screen.remove("res-03"),
        );

        a.unwrap();
        b.unwrap();
        c.unwrap();
        assert_eq!(test.repo.mutation_count(), 3);
        assert_eq!(test.status_of("res-01").as_deref(), Some("AFFECTED"));
        assert_eq!(test.status_of("res-02").as_deref(), Some("IN_USE"));
        assert_eq!(test.status_of("res-03"), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_busy_flag_visible_while_in_flight() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.set_latency(Duration::from_millis(20));

        let observe = async {
            let snapshot = test.screen.snapshot().unwrap();
            snapshot
                .rows
                .iter()
                .filter(|r| r.busy)
                .map(|r| r.entity.id.clone())
                .collect::<Vec<_>>()
        };
        let (result, busy) =
            tokio::join!(test.screen.change_status("res-05", "AFFECTED"), observe);

        result.unwrap();
        assert_eq!(busy, vec!["res-05".to_string()]);
        assert!(!test.screen.is_busy("res-05").unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_unmount_during_flight_rejects_late_response() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.set_latency(Duration::from_millis(10));

        let (result, ()) = tokio::join!(test.screen.refresh(), async {
            test.screen.unmount();
        });

        assert_eq!(result, Err(ScreenError::Unmounted));
        assert_eq!(test.screen.set_global_query("room"), Err(ScreenError::Unmounted));
    }

    #[test_log::test(tokio::test)]
    async fn test_screens_over_different_scopes_are_isolated() {
        let test = TestScreen::loaded(EntityType::Resource, twelve_resources()).await;
        test.repo.seed(
            "globex",
            [resource("gx-1", "Loft room", "room", "FREE")],
        );

        let other = atrium_app::CollectionScreen::mount(
            atrium_catalog::ScopeId::new("globex", EntityType::Resource),
            std::sync::Arc::new(test.repo.clone()),
            &atrium_view::ViewConfig::default(),
        );
        other.load().await.unwrap();
        other.set_global_query("loft").unwrap();

        assert_eq!(other.total_count().unwrap(), 1);
        assert_eq!(test.screen.total_count().unwrap(), 12);
    }
}
